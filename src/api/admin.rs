use crate::error::AppError;
use crate::intake::Intake;
use crate::registry::Registry;
use axum::{
    extract::{Extension, Json, Path},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;

pub async fn list_pets(
    Extension(registry): Extension<Arc<Registry>>,
) -> Result<Response, AppError> {
    let pets = registry.active_pets().await?;
    tracing::Span::current().record("action", "admin_list_pets");
    Ok(Json(json!({"success": true, "pets": pets})).into_response())
}

pub async fn deactivate_pet(
    Extension(registry): Extension<Arc<Registry>>,
    Path(code): Path<String>,
) -> Result<Response, AppError> {
    tracing::Span::current()
        .record("action", "admin_deactivate_pet")
        .record("pet_code", code.as_str());

    let pet = registry.deactivate(&code).await?;
    tracing::Span::current().record("business_event", "Pet deactivated");
    Ok(Json(json!({"success": true, "petId": pet.pet_code})).into_response())
}

pub async fn pet_reports(
    Extension(intake): Extension<Arc<Intake>>,
    Path(code): Path<String>,
) -> Result<Response, AppError> {
    tracing::Span::current()
        .record("action", "admin_pet_reports")
        .record("pet_code", code.as_str());

    let (pet, locations, notifications) = intake.reports(&code).await?;
    Ok(Json(json!({
        "success": true,
        "petId": pet.pet_code,
        "locations": locations,
        "notifications": notifications,
    }))
    .into_response())
}

pub async fn owner_pets(
    Extension(registry): Extension<Arc<Registry>>,
    Path(owner_id): Path<i32>,
) -> Result<Response, AppError> {
    tracing::Span::current().record("action", "admin_owner_pets");
    let pets = registry.pets_of_owner(owner_id).await?;
    Ok(Json(json!({"success": true, "ownerId": owner_id, "pets": pets})).into_response())
}
