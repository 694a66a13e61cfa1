use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use ventura_core::CoreError;
use ventura_order::ValidationErrors;

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFoundError(String),
    PaymentRequired(String),
    Unprocessable(String),
    Validation(ValidationErrors),
    UpstreamError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::PaymentRequired(msg) => (StatusCode::PAYMENT_REQUIRED, msg),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Validation(errors) => {
                let body = Json(json!({
                    "error": errors.to_string(),
                    "fields": errors.to_map(),
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::UpstreamError(msg) => {
                tracing::warn!("Supplier request failed: {}", msg);
                (StatusCode::BAD_GATEWAY, msg)
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let message = err.user_message();
        match err {
            CoreError::NotFound(_) => AppError::NotFoundError(message),
            CoreError::ValidationError(_) => AppError::BadRequest(message),
            CoreError::ConfigurationInvalid(_) => AppError::Unprocessable(message),
            CoreError::PaymentDeclined(_) => AppError::PaymentRequired(message),
            CoreError::Api { status: Some(status), .. } if status >= 500 => {
                AppError::UpstreamError(message)
            }
            CoreError::Api { .. } => AppError::Unprocessable(message),
            CoreError::Transport(_) => AppError::UpstreamError(message),
            CoreError::InternalError(detail) => AppError::InternalServerError(detail),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}
