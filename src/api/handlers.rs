use std::cmp::Reverse;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::Value;
use utoipa::OpenApi;

use super::{
    dto::{ClimaParams, LeituraDto, ReadingDto, TelemetryRequest, TimeRangeParams},
    errors::AppError,
    AppState,
};
use crate::{
    telemetry::validation::validate,
    weather::models::{DEFAULT_LATITUDE, DEFAULT_LONGITUDE},
};

// ---------------------------------------------------------------------------
// Telemetry
// ---------------------------------------------------------------------------

/// Ingest one reading from a field device (or the simulator).
/// The timestamp is always assigned by the server.
#[utoipa::path(
    post,
    path = "/api/telemetry",
    request_body = TelemetryRequest,
    responses(
        (status = 201, description = "Reading stored", body = ReadingDto),
        (status = 400, description = "Validation failed"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "telemetry"
)]
pub async fn post_telemetry(
    State(state): State<AppState>,
    payload: Result<Json<TelemetryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ReadingDto>), AppError> {
    let Json(req) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let telemetry = validate(req.device_id.as_deref(), req.soil_moisture, req.battery_level)?;
    let reading = state.telemetry.record(telemetry).await?;

    Ok((StatusCode::CREATED, Json(reading.into())))
}

/// Every stored reading, newest first.
#[utoipa::path(
    get,
    path = "/api/telemetry",
    responses(
        (status = 200, description = "All readings ordered by timestamp DESC", body = Vec<ReadingDto>),
        (status = 500, description = "Internal server error"),
    ),
    tag = "telemetry"
)]
pub async fn get_telemetry(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReadingDto>>, AppError> {
    let mut rows = state.telemetry.list_all().await?;
    rows.sort_by_key(|r| Reverse(r.timestamp));
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// Readings of one device, newest first. Optionally restricted to an
/// inclusive window with `?from=<RFC3339>&to=<RFC3339>`.
#[utoipa::path(
    get,
    path = "/api/telemetry/device/{device_id}",
    params(
        ("device_id" = String, Path, description = "Device identifier, e.g. HELTEC-01"),
        TimeRangeParams,
    ),
    responses(
        (status = 200, description = "Device readings ordered by timestamp DESC", body = Vec<ReadingDto>),
        (status = 400, description = "Malformed timestamp or only one bound of the range"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "telemetry"
)]
pub async fn get_device_telemetry(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    params: Result<Query<TimeRangeParams>, QueryRejection>,
) -> Result<Json<Vec<ReadingDto>>, AppError> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let range = match (params.from, params.to) {
        (Some(from), Some(to)) => Some((from, to)),
        (None, None) => None,
        _ => {
            return Err(AppError::BadRequest(
                "`from` and `to` must be given together".to_owned(),
            ))
        }
    };

    let rows = state.telemetry.list_by_device(&device_id, range).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

// ---------------------------------------------------------------------------
// Leituras
// ---------------------------------------------------------------------------

/// All leituras, newest first.
#[utoipa::path(
    get,
    path = "/api/leituras",
    responses(
        (status = 200, description = "Leituras ordered by dataHora DESC", body = Vec<LeituraDto>),
        (status = 500, description = "Internal server error"),
    ),
    tag = "leituras"
)]
pub async fn get_leituras(
    State(state): State<AppState>,
) -> Result<Json<Vec<LeituraDto>>, AppError> {
    let rows = state.leituras.list().await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// Record a manual irrigation request, based on the most recent leitura.
#[utoipa::path(
    post,
    path = "/api/leituras/irrigacao-manual",
    responses(
        (status = 201, description = "Manual irrigation record created", body = LeituraDto),
        (status = 500, description = "Internal server error"),
    ),
    tag = "leituras"
)]
pub async fn post_irrigacao_manual(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<LeituraDto>), AppError> {
    let leitura = state.leituras.manual_irrigation().await?;
    Ok((StatusCode::CREATED, Json(leitura.into())))
}

// ---------------------------------------------------------------------------
// Weather proxy
// ---------------------------------------------------------------------------

/// Current weather from HG Brasil, passed through unchanged.
#[utoipa::path(
    get,
    path = "/api/clima",
    params(ClimaParams),
    responses(
        (status = 200, description = "Upstream weather document"),
        (status = 400, description = "Malformed coordinates"),
        (status = 401, description = "Upstream rejected the API key"),
        (status = 500, description = "API key not configured or upstream failure"),
    ),
    tag = "clima"
)]
pub async fn get_clima(
    State(state): State<AppState>,
    params: Result<Query<ClimaParams>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let body = state
        .weather
        .current(
            params.latitude.unwrap_or(DEFAULT_LATITUDE),
            params.longitude.unwrap_or(DEFAULT_LONGITUDE),
        )
        .await?;
    Ok(Json(body))
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "system"
)]
pub async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(
        post_telemetry,
        get_telemetry,
        get_device_telemetry,
        get_leituras,
        post_irrigacao_manual,
        get_clima,
        health
    ),
    components(schemas(ReadingDto, TelemetryRequest, LeituraDto)),
    tags(
        (name = "telemetry", description = "Soil sensor ingestion and queries"),
        (name = "leituras",  description = "Legacy readings and manual irrigation"),
        (name = "clima",     description = "Weather proxy"),
        (name = "system",    description = "System endpoints"),
    ),
    info(
        title = "Irrigation Telemetry API",
        version = "0.1.0",
        description = "REST API for soil moisture telemetry and irrigation support"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
