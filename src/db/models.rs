use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One persisted soil sensor observation. Rows are never updated or deleted.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Reading {
    pub id: Uuid,
    pub device_id: String,
    /// Percentage, 0.0 to 100.0
    pub soil_moisture: f64,
    /// Volts
    pub battery_level: f64,
    pub timestamp: DateTime<Utc>,
}

/// A reading that has not been stored yet.
///
/// `timestamp: None` lets the store stamp the record with its receipt time.
#[derive(Debug, Clone)]
pub struct NewReading {
    pub device_id: String,
    pub soil_moisture: f64,
    pub battery_level: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Legacy reading record kept in the `leituras` table.
///
/// Every column but `id` is nullable; rows written by the field gateway do
/// not always carry all of them.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Leitura {
    pub id: Uuid,
    pub sensor_id: Option<String>,
    /// Relative humidity percentage
    pub umidade: Option<f64>,
    /// Degrees Celsius
    pub temperatura: Option<f64>,
    pub status: Option<String>,
    pub data_hora: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct NewLeitura {
    pub sensor_id: Option<String>,
    pub umidade: Option<f64>,
    pub temperatura: Option<f64>,
    pub status: Option<String>,
    pub data_hora: Option<DateTime<Utc>>,
}
