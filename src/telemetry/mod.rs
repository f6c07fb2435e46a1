pub mod service;
pub mod validation;

pub use service::{IngestionService, TelemetryError};
pub use validation::{FieldError, ValidTelemetry, ValidationError};
