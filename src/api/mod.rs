pub mod admin;
pub mod breeds;
pub mod finder;
pub mod middleware;
pub mod pet;

use crate::config::AppConfig;
use crate::intake::Intake;
use crate::registry::Registry;
use axum::{
    extract::rejection::JsonRejection,
    routing::{get, post},
    Extension, Json, Router,
};
use std::sync::Arc;

use crate::error::AppError;

async fn health_check() -> &'static str {
    "OK"
}

/// Unwraps a JSON body, turning extractor failures into a 400 with our error shape.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// Public and admin routes with their shared state attached. The caller adds
/// transport layers (tracing, CORS, metrics).
pub fn router(registry: Arc<Registry>, intake: Arc<Intake>, config: Arc<AppConfig>) -> Router {
    let admin_routes = Router::new()
        .route("/admin/pets", get(admin::list_pets))
        .route("/admin/pets/:code/deactivate", post(admin::deactivate_pet))
        .route("/admin/pets/:code/reports", get(admin::pet_reports))
        .route("/admin/owners/:id/pets", get(admin::owner_pets))
        .route_layer(axum::middleware::from_fn(middleware::admin_gate));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/register", post(pet::register))
        .route("/pet/:code", get(pet::get_pet))
        .route("/api/found-location", post(finder::found_location))
        .route("/api/notify-owner", post(finder::notify_owner))
        .route("/api/breeds/:species", get(breeds::list_breeds))
        .merge(admin_routes)
        .layer(Extension(registry))
        .layer(Extension(intake))
        .layer(Extension(config))
}
