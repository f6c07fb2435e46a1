use std::fmt;

use serde::Serialize;

pub const SOIL_MOISTURE_MIN: f64 = 0.0;
pub const SOIL_MOISTURE_MAX: f64 = 100.0;
pub const BATTERY_LEVEL_MIN: f64 = 0.0;

/// A single rejected field, named by its JSON key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// One or more fields of a telemetry submission were missing or out of range.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.fields.iter().map(|e| e.message).collect();
        write!(f, "invalid telemetry: {}", messages.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// A submission that passed [`validate`]. It can only be built there.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidTelemetry {
    device_id: String,
    soil_moisture: f64,
    battery_level: f64,
}

impl ValidTelemetry {
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn soil_moisture(&self) -> f64 {
        self.soil_moisture
    }

    pub fn battery_level(&self) -> f64 {
        self.battery_level
    }
}

/// Check a submission field by field.
///
/// `None` means the field was absent from the request body. All failures are
/// collected so the caller can report every bad field at once.
pub fn validate(
    device_id: Option<&str>,
    soil_moisture: Option<f64>,
    battery_level: Option<f64>,
) -> Result<ValidTelemetry, ValidationError> {
    let mut fields = Vec::new();

    let device_id = device_id.filter(|id| !id.trim().is_empty());
    if device_id.is_none() {
        fields.push(FieldError {
            field: "deviceId",
            message: "deviceId é obrigatório",
        });
    }

    match soil_moisture {
        None => fields.push(FieldError {
            field: "soilMoisture",
            message: "soilMoisture é obrigatório",
        }),
        // NaN fails both comparisons and is reported as below the minimum.
        Some(v) if !(v >= SOIL_MOISTURE_MIN) => fields.push(FieldError {
            field: "soilMoisture",
            message: "soilMoisture deve ser maior ou igual a 0.0",
        }),
        Some(v) if v > SOIL_MOISTURE_MAX => fields.push(FieldError {
            field: "soilMoisture",
            message: "soilMoisture deve ser menor ou igual a 100.0",
        }),
        Some(_) => {}
    }

    match battery_level {
        None => fields.push(FieldError {
            field: "batteryLevel",
            message: "batteryLevel é obrigatório",
        }),
        Some(v) if !(v >= BATTERY_LEVEL_MIN) => fields.push(FieldError {
            field: "batteryLevel",
            message: "batteryLevel deve ser maior ou igual a 0.0",
        }),
        Some(_) => {}
    }

    match (device_id, soil_moisture, battery_level) {
        (Some(device_id), Some(soil_moisture), Some(battery_level)) if fields.is_empty() => {
            Ok(ValidTelemetry {
                device_id: device_id.to_owned(),
                soil_moisture,
                battery_level,
            })
        }
        _ => Err(ValidationError { fields }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(err: ValidationError) -> Vec<&'static str> {
        err.fields.into_iter().map(|f| f.message).collect()
    }

    #[test]
    fn accepts_valid_submission() {
        let valid = validate(Some("HELTEC-01"), Some(45.0), Some(3.7)).unwrap();
        assert_eq!(valid.device_id(), "HELTEC-01");
        assert_eq!(valid.soil_moisture(), 45.0);
        assert_eq!(valid.battery_level(), 3.7);
    }

    #[test]
    fn accepts_range_boundaries() {
        assert!(validate(Some("d"), Some(0.0), Some(0.0)).is_ok());
        assert!(validate(Some("d"), Some(100.0), Some(0.0)).is_ok());
    }

    #[test]
    fn blank_device_id_is_rejected() {
        let err = validate(Some("   "), Some(50.0), Some(3.7)).unwrap_err();
        assert_eq!(messages(err), vec!["deviceId é obrigatório"]);
    }

    #[test]
    fn soil_moisture_out_of_range() {
        let low = validate(Some("d"), Some(-0.1), Some(3.7)).unwrap_err();
        assert_eq!(messages(low), vec!["soilMoisture deve ser maior ou igual a 0.0"]);

        let high = validate(Some("d"), Some(100.1), Some(3.7)).unwrap_err();
        assert_eq!(messages(high), vec!["soilMoisture deve ser menor ou igual a 100.0"]);
    }

    #[test]
    fn nan_soil_moisture_is_rejected() {
        assert!(validate(Some("d"), Some(f64::NAN), Some(3.7)).is_err());
    }

    #[test]
    fn negative_battery_is_rejected() {
        let err = validate(Some("d"), Some(50.0), Some(-1.0)).unwrap_err();
        assert_eq!(messages(err), vec!["batteryLevel deve ser maior ou igual a 0.0"]);
    }

    #[test]
    fn every_missing_field_is_reported() {
        let err = validate(None, None, None).unwrap_err();
        assert_eq!(
            messages(err),
            vec![
                "deviceId é obrigatório",
                "soilMoisture é obrigatório",
                "batteryLevel é obrigatório",
            ]
        );
    }

    #[test]
    fn display_joins_messages() {
        let err = validate(Some(""), Some(50.0), Some(-2.0)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid telemetry: deviceId é obrigatório; batteryLevel deve ser maior ou igual a 0.0"
        );
    }
}
