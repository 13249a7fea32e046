use crate::error::AppError;
use crate::registry::Registry;
use axum::{
    extract::{Extension, Json, Path},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;

pub async fn list_breeds(
    Extension(registry): Extension<Arc<Registry>>,
    Path(species): Path<String>,
) -> Result<Response, AppError> {
    let breeds = registry.store().list_breeds(&species).await?;
    let breeds: Vec<_> = breeds
        .into_iter()
        .map(|b| json!({"id": b.id, "name": b.name}))
        .collect();

    Ok(Json(json!({"success": true, "breeds": breeds})).into_response())
}
