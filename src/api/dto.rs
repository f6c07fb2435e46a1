use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::db::models::{Leitura, Reading};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadingDto {
    pub id: Uuid,
    pub device_id: String,
    /// Percentage, 0.0 to 100.0
    pub soil_moisture: f64,
    /// Volts
    pub battery_level: f64,
    /// Server receipt time (RFC3339).
    pub timestamp: DateTime<Utc>,
}

impl From<Reading> for ReadingDto {
    fn from(r: Reading) -> Self {
        Self {
            id: r.id,
            device_id: r.device_id,
            soil_moisture: r.soil_moisture,
            battery_level: r.battery_level,
            timestamp: r.timestamp,
        }
    }
}

/// Request body for `POST /api/telemetry`.
///
/// Every field is optional at the type level so that a missing field is
/// reported with its own validation message instead of a parse error.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryRequest {
    #[schema(example = "HELTEC-01")]
    pub device_id: Option<String>,
    #[schema(example = 42.5, minimum = 0.0, maximum = 100.0)]
    pub soil_moisture: Option<f64>,
    #[schema(example = 3.7, minimum = 0.0)]
    pub battery_level: Option<f64>,
}

/// Optional time window for `GET /api/telemetry/device/{device_id}`.
/// Both bounds are inclusive and must be given together.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TimeRangeParams {
    /// Start of time range (RFC3339)
    pub from: Option<DateTime<Utc>>,
    /// End of time range (RFC3339)
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClimaParams {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeituraDto {
    pub id: Uuid,
    pub sensor_id: Option<String>,
    /// Relative humidity percentage
    pub umidade: Option<f64>,
    /// Degrees Celsius
    pub temperatura: Option<f64>,
    pub status: Option<String>,
    pub data_hora: Option<DateTime<Utc>>,
}

impl From<Leitura> for LeituraDto {
    fn from(l: Leitura) -> Self {
        Self {
            id: l.id,
            sensor_id: l.sensor_id,
            umidade: l.umidade,
            temperatura: l.temperatura,
            status: l.status,
            data_hora: l.data_hora,
        }
    }
}
