use crate::config::AppConfig;
use axum::{
    extract::{Extension, Request},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use constant_time_eq::constant_time_eq;
use serde_json::json;
use std::sync::Arc;

fn presented_token(request: &Request) -> Option<&str> {
    let headers = request.headers();
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .or_else(|| headers.get("x-admin-token").and_then(|v| v.to_str().ok()))
        .map(str::trim)
}

fn token_matches(presented: Option<&str>, expected: &str) -> bool {
    presented.is_some_and(|token| constant_time_eq(token.as_bytes(), expected.as_bytes()))
}

/// Admin routes answer 403 until `ADMIN_TOKEN` is configured, then require it.
pub async fn admin_gate(
    Extension(config): Extension<Arc<AppConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = config.admin_token.as_deref() else {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"success": false, "error": "Admin access disabled"})),
        )
            .into_response();
    };

    if token_matches(presented_token(&request), expected) {
        return next.run(request).await;
    }

    tracing::Span::current().record("error", "admin_unauthorized");
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"success": false, "error": "Unauthorized"})),
    )
        .into_response()
}
