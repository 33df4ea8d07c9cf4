//! Error types for the html2pdf-server library.
//!
//! Two distinct error types reflect two distinct failure scopes:
//!
//! * [`ConvertError`] — **Request-scoped**: one conversion failed (empty
//!   input, engine error, empty output). Returned from
//!   [`crate::convert::ConvertService::convert`] and mapped to an HTTP
//!   status at the boundary.
//!
//! * [`StartupError`] — **Process-scoped**: the native engine could not be
//!   located, loaded, or initialized. Raised before the listen socket is
//!   bound; the process must not come up serving traffic without a working
//!   renderer.
//!
//! Validation failures never reach the render worker, and engine-internal
//! error types never leak past [`ConvertError::RenderFailed`] — callers see
//! a stable message with the engine detail folded into it.

use std::path::PathBuf;
use thiserror::Error;

/// All errors a single conversion request can produce.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Validation ────────────────────────────────────────────────────────
    /// The supplied HTML was missing or blank after trimming.
    /// Rejected before any renderer work.
    #[error("no HTML content supplied")]
    EmptyInput,

    // ── Render failures ───────────────────────────────────────────────────
    /// The native engine reported an error during conversion.
    #[error("failed to convert HTML to PDF: {detail}")]
    RenderFailed { detail: String },

    /// The engine returned a zero-length document. Treated as a failure,
    /// not a valid empty PDF.
    #[error("failed to convert HTML to PDF: renderer produced an empty document")]
    EmptyOutput,

    // ── Infrastructure ────────────────────────────────────────────────────
    /// The render worker thread is gone (panicked or shut down) and can no
    /// longer accept jobs.
    #[error("render worker is unavailable")]
    WorkerUnavailable,

    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ConvertError {
    /// Whether this error is the caller's fault (HTTP 400) rather than a
    /// server-side failure (HTTP 500).
    pub fn is_validation(&self) -> bool {
        matches!(self, ConvertError::EmptyInput)
    }
}

/// Errors that prevent the process from starting.
///
/// Every variant is fatal: the binary logs it and exits non-zero before
/// accepting any request.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The wkhtmltox shared library could not be located, loaded, or its
    /// symbol table resolved.
    #[error("{0}")]
    Library(#[from] wkhtmltox_auto::WkhtmltoxAutoError),

    /// `wkhtmltopdf_init` returned failure after the library loaded.
    #[error("wkhtmltox at '{path}' loaded but failed to initialize")]
    InitFailed { path: PathBuf },

    /// The render worker thread could not be spawned.
    #[error("failed to spawn render worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// Invalid server configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
