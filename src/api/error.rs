use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

use crate::core::rates::ExchangeError;

/// Errors surfaced to HTTP clients as `{success: false, message}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing required parameters")]
    MissingParameters,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unprocessable(String),

    /// Source currency has no rate table.
    #[error("Unsupported Currency")]
    UnsupportedSource,

    /// Target currency is not in the currency table.
    #[error("Unsupported Currency")]
    UnsupportedTarget,

    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error("Couldn't detect origin")]
    Geolocation,

    #[error("Exceeded limit")]
    RateLimited,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingParameters
            | ApiError::BadRequest(_)
            | ApiError::UnsupportedSource
            | ApiError::RateLimited => StatusCode::BAD_REQUEST,
            ApiError::Unprocessable(_) | ApiError::UnsupportedTarget => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Geolocation => StatusCode::UNAUTHORIZED,
            ApiError::Exchange(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            debug!(error = %self, %status, "Request rejected");
        }

        (
            status,
            Json(json!({
                "success": false,
                "message": self.to_string(),
            })),
        )
            .into_response()
    }
}
