use super::json_body;
use crate::error::AppError;
use crate::intake::{Intake, LocationSubmission, OwnerNotificationRequest};
use axum::{
    extract::{rejection::JsonRejection, Extension, Json},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;

pub async fn found_location(
    Extension(intake): Extension<Arc<Intake>>,
    payload: Result<Json<LocationSubmission>, JsonRejection>,
) -> Result<Response, AppError> {
    let submission = json_body(payload)?;
    let (pet, location) = intake.submit_location(submission).await?;

    tracing::Span::current()
        .record("action", "record_location")
        .record("pet_code", pet.pet_code.as_str())
        .record("business_event", "Finder location recorded");

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "locationId": location.id,
            "message": "Ubicación registrada correctamente",
        })),
    )
        .into_response())
}

pub async fn notify_owner(
    Extension(intake): Extension<Arc<Intake>>,
    payload: Result<Json<OwnerNotificationRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let request = json_body(payload)?;
    let (pet, recorded) = intake.notify_owner(request).await?;

    tracing::Span::current()
        .record("action", "notify_owner")
        .record("pet_code", pet.pet_code.as_str())
        .record("business_event", "Finder contact recorded");

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "notificationId": recorded.notification.id,
            "ownerNotified": recorded.owner_notified,
            "message": "Notificación enviada al dueño",
        })),
    )
        .into_response())
}
