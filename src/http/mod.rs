//! HTTP boundary: router, shared state, and error mapping.
//!
//! Thin by design — every route is a direct pass-through to
//! [`crate::convert::ConvertService`]; the only logic here is extraction and
//! response shaping.

pub mod error;
pub mod handlers;

pub use error::ApiError;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::convert::ConvertService;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub convert: ConvertService,
}

/// Build the application router.
///
/// `max_body_bytes` raises the framework's default 2 MB body cap on the
/// conversion routes; large HTML payloads are the norm here.
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/convert", post(handlers::convert_json))
        .route("/convert-form", post(handlers::convert_form))
        .route("/convert-raw", post(handlers::convert_raw))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}
