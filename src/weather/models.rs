use serde::Deserialize;

// ---------------------------------------------------------------------------
// HG Brasil weather response
//
// The proxy forwards the upstream body untouched, so only the envelope fields
// it inspects are modelled here:
//
//   { "by": "default", "valid_key": true, "results": { ... }, "execution_time": 0.0 }
//
// `valid_key` is `false` when the key is unknown or expired. The rest of the
// document is passed through as raw JSON.
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct WeatherEnvelope {
    /// Absent on some error responses; only an explicit `false` is treated
    /// as a rejected key.
    pub valid_key: Option<bool>,
}

/// Coordinates used when the caller does not pass `latitude`/`longitude`.
pub const DEFAULT_LATITUDE: f64 = 2.9087;
pub const DEFAULT_LONGITUDE: f64 = -61.3039;
