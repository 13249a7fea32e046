use super::json_body;
use crate::error::AppError;
use crate::registry::{RegistrationRequest, Registry};
use axum::{
    extract::{rejection::JsonRejection, Extension, Json, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;
use tracing::field::display;

pub async fn register(
    Extension(registry): Extension<Arc<Registry>>,
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let request = json_body(payload)?;

    let registration = match registry.register(request).await {
        Ok(registration) => registration,
        Err(e) => {
            tracing::Span::current()
                .record("action", "register_pet_failed")
                .record("error", display(&e));
            return Err(e);
        }
    };
    let pet = &registration.pet;

    tracing::Span::current()
        .record("action", "register_pet")
        .record("pet_code", pet.pet_code.as_str())
        .record("business_event", "Pet registered successfully");

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "petId": pet.pet_code,
            "qrCode": registration.qr_code,
            "petUrl": registration.pet_url,
            "pet": {
                "name": pet.name,
                "species": pet.species,
                "sex": pet.sex,
                "color": pet.color,
                "breed": pet.breed.as_deref().unwrap_or("No especificada"),
            }
        })),
    )
        .into_response())
}

pub async fn get_pet(
    Extension(registry): Extension<Arc<Registry>>,
    Path(code): Path<String>,
) -> Result<Response, AppError> {
    tracing::Span::current()
        .record("action", "lookup_pet")
        .record("pet_code", code.as_str());

    let profile = registry.lookup(&code).await?;
    Ok((StatusCode::OK, Json(json!({"success": true, "pet": profile}))).into_response())
}
