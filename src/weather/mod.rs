pub mod models;

use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;

use self::models::WeatherEnvelope;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Chave da API HG Brasil não configurada")]
    MissingApiKey,

    #[error("Chave da API inválida")]
    InvalidApiKey,

    #[error("Resposta vazia da API HG Brasil")]
    EmptyResponse,

    #[error("Erro ao buscar dados do clima: {0}")]
    Upstream(String),
}

/// Thin proxy over the HG Brasil weather API. The key stays on the server so
/// the dashboard never sees it.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl WeatherClient {
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(config.hg_base_url.clone(), config.hg_api_key.clone())
    }

    pub fn with_base_url(base_url: String, api_key: Option<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                http: Client::new(),
                base_url: base_url.trim_end_matches('/').to_owned(),
                api_key,
            }),
        }
    }

    /// Fetch current weather for a coordinate and return the upstream JSON
    /// document unchanged.
    pub async fn current(&self, latitude: f64, longitude: f64) -> Result<Value, WeatherError> {
        let key = self
            .inner
            .api_key
            .as_deref()
            .ok_or(WeatherError::MissingApiKey)?;

        // Logged without the key.
        debug!(latitude, longitude, "Requesting HG Brasil weather");
        let lat = latitude.to_string();
        let lon = longitude.to_string();

        let bytes = self
            .inner
            .http
            .get(format!("{}/weather", self.inner.base_url))
            .query(&[
                ("key", key),
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("locale", "pt"),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::Upstream(e.without_url().to_string()))?
            .error_for_status()
            .map_err(|e| WeatherError::Upstream(e.without_url().to_string()))?
            .bytes()
            .await
            .map_err(|e| WeatherError::Upstream(e.without_url().to_string()))?;

        let body = interpret(&bytes)?;
        info!(latitude, longitude, "Weather fetched");
        Ok(body)
    }
}

/// Map a raw upstream body to the proxied document or the matching error.
fn interpret(bytes: &[u8]) -> Result<Value, WeatherError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(WeatherError::EmptyResponse);
    }

    let body: Value = serde_json::from_slice(bytes)
        .map_err(|e| WeatherError::Upstream(format!("invalid JSON: {e}")))?;
    if body.is_null() {
        return Err(WeatherError::EmptyResponse);
    }

    let envelope = WeatherEnvelope::deserialize(&body)
        .map_err(|e| WeatherError::Upstream(format!("unexpected response shape: {e}")))?;
    if envelope.valid_key == Some(false) {
        return Err(WeatherError::InvalidApiKey);
    }

    Ok(body)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
