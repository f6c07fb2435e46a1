pub mod dto;
pub mod errors;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::{leituras::LeituraService, telemetry::IngestionService, weather::WeatherClient};
use handlers::ApiDoc;

/// Shared handler state. Cheap to clone: every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub telemetry: Arc<IngestionService>,
    pub leituras: Arc<LeituraService>,
    pub weather: WeatherClient,
}

pub fn router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route(
            "/api/telemetry",
            get(handlers::get_telemetry).post(handlers::post_telemetry),
        )
        .route(
            "/api/telemetry/device/{device_id}",
            get(handlers::get_device_telemetry),
        )
        .route("/api/leituras", get(handlers::get_leituras))
        .route(
            "/api/leituras/irrigacao-manual",
            post(handlers::post_irrigacao_manual),
        )
        .route("/api/clima", get(handlers::get_clima))
        .with_state(state)
        .split_for_parts();

    // The dashboard is served from another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
        .layer(cors)
}
