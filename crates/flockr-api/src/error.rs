use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use flockr_core::{ErrorKind, FlockrError};
use flockr_types::api::ErrorBody;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Flockr(#[from] FlockrError),

    /// Failure outside the domain, e.g. a worker thread that died. Details are
    /// logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, name, message) = match self {
            ApiError::Flockr(e) => {
                let name = match e.kind() {
                    ErrorKind::Validation => "InputError",
                    ErrorKind::Auth => "AccessError",
                };
                (StatusCode::BAD_REQUEST, name, e.to_string())
            }
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "InternalError",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorBody {
            code: status.as_u16(),
            name: name.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("worker task failed: {}", e))
    }
}
