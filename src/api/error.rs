use crate::core::forecast::{ErrorResponse, ForecastError};
use crate::utils::error::AppError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Everything a handler can fail with, rendered as `{status: "error", message}`.
#[derive(Debug)]
pub enum ApiError {
    Forecast(ForecastError),
    App(AppError),
    BadRequest(String),
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Forecast(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Forecast(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::App(e) => match e {
                AppError::ValidationError { .. }
                | AppError::ConflictError { .. }
                | AppError::SerializationError(_) => StatusCode::BAD_REQUEST,
                AppError::NotFoundError { .. } => StatusCode::NOT_FOUND,
                AppError::AuthError { .. } => StatusCode::UNAUTHORIZED,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Forecast(e) => e.to_string(),
            ApiError::App(e) => e.to_string(),
            ApiError::BadRequest(m) | ApiError::Internal(m) => m.clone(),
        }
    }
}

impl From<ForecastError> for ApiError {
    fn from(e: ForecastError) -> Self {
        ApiError::Forecast(e)
    }
}

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        ApiError::App(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("❌ Request failed: {}", self.message());
        }
        (status, Json(ErrorResponse::new(self.message()))).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
