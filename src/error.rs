use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures of an external collaborator (geocoder, mailer, QR renderer).
/// Callers log these and carry on without the collaborator's result.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("{0} timed out")]
    Timeout(&'static str),
    #[error("{collaborator} request failed: {message}")]
    Http {
        collaborator: &'static str,
        message: String,
    },
    #[error("{collaborator} rejected the request: {message}")]
    Rejected {
        collaborator: &'static str,
        message: String,
    },
    #[error("rendering failed: {0}")]
    Render(String),
}

impl CollaboratorError {
    pub fn collaborator(&self) -> &'static str {
        match self {
            CollaboratorError::Timeout(name) => *name,
            CollaboratorError::Http { collaborator, .. } => *collaborator,
            CollaboratorError::Rejected { collaborator, .. } => *collaborator,
            CollaboratorError::Render(_) => "qr",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{}", validation_message(.missing_fields, .invalid_fields))]
    Validation {
        missing_fields: Vec<&'static str>,
        invalid_fields: Vec<&'static str>,
    },
    #[error("malformed request: {0}")]
    BadRequest(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("conflict: {0}")]
    ConstraintViolation(String),
    #[error("registration failed after {attempts} attempts")]
    RegistrationFailed { attempts: u32 },
    #[error(transparent)]
    CollaboratorUnavailable(#[from] CollaboratorError),
    #[error("storage failure: {0}")]
    Io(String),
}

fn validation_message(missing: &[&'static str], invalid: &[&'static str]) -> String {
    match (missing.is_empty(), invalid.is_empty()) {
        (false, true) => format!("Missing required fields: {}", missing.join(", ")),
        (true, false) => format!("Invalid fields: {}", invalid.join(", ")),
        _ => format!(
            "Missing required fields: {}; invalid fields: {}",
            missing.join(", "),
            invalid.join(", ")
        ),
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ConstraintViolation(detail) => AppError::ConstraintViolation(detail),
            StoreError::NotFound(detail) => AppError::NotFound(detail),
            StoreError::Io(e) => AppError::Io(e.to_string()),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConstraintViolation(_) => StatusCode::CONFLICT,
            AppError::RegistrationFailed { .. } | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::CollaboratorUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Validation {
                missing_fields,
                invalid_fields,
            } => json!({
                "success": false,
                "error": self.to_string(),
                "missingFields": missing_fields,
                "invalidFields": invalid_fields,
            }),
            AppError::BadRequest(_) => json!({"success": false, "error": self.to_string()}),
            AppError::NotFound(_) => json!({"success": false, "error": "Pet not found"}),
            AppError::ConstraintViolation(_) => {
                json!({"success": false, "error": "Conflicting record"})
            }
            AppError::CollaboratorUnavailable(_) => {
                json!({"success": false, "error": "Service temporarily unavailable"})
            }
            AppError::RegistrationFailed { .. } | AppError::Io(_) => {
                json!({"success": false, "error": "Internal server error"})
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            tracing::Span::current().record("error", tracing::field::display(&self));
        }

        (status, Json(body)).into_response()
    }
}
