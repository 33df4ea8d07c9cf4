//! HTTP error mapping: one stable JSON error shape for every failure.
//!
//! Validation failures map to 400, everything else to 500 with the wrapped
//! failure message in the body. The full cause is logged server-side here —
//! the one choke point every handler error flows through — so handlers never
//! log and respond separately.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::error::ConvertError;

/// Stable machine-readable error codes.
pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const RENDER: &str = "render_error";
    pub const INTERNAL: &str = "internal_error";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: &'static str,
    pub message: String,
}

/// An error response: status + code + caller-safe message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: codes::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: codes::INTERNAL,
            message: message.into(),
        }
    }
}

impl From<ConvertError> for ApiError {
    fn from(err: ConvertError) -> Self {
        match &err {
            ConvertError::EmptyInput => Self::bad_request(err.to_string()),
            ConvertError::RenderFailed { .. } | ConvertError::EmptyOutput => {
                error!(error = %err, "conversion failed");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    code: codes::RENDER,
                    message: err.to_string(),
                }
            }
            ConvertError::WorkerUnavailable | ConvertError::Internal(_) => {
                error!(error = %err, "internal conversion error");
                Self::internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}
