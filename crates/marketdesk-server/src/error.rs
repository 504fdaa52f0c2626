use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use marketdesk_core::{ApiEnvelope, CoreError, ProviderError, ValidationError};
use thiserror::Error;

/// Handler failure rendered as a `{success: false, error}` envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Provider(error) => {
                tracing::error!(code = error.code(), %error, "request failed");
            }
            Self::Validation(error) => tracing::debug!(%error, "request rejected"),
        }
        (status, Json(ApiEnvelope::<()>::failure(self.to_string()))).into_response()
    }
}

/// Startup and serve failures, mapped to process exit codes.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ServerError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Core(_) => 2,
            Self::Bind { .. } => 3,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let error = ApiError::from(ValidationError::UnknownCategory {
            value: String::from("crypto"),
        });
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error.to_string(), "Invalid category");
    }

    #[test]
    fn provider_failure_maps_to_internal_error() {
        let error = ApiError::from(ProviderError::unavailable("upstream down"));
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.to_string(), "upstream down");
    }
}
