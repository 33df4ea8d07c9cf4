//! Rendering: the job specification, the renderer seam, and the worker that
//! serializes access to the native engine.
//!
//! ## Data flow
//!
//! ```text
//! normalized HTML ──▶ RenderJobSpec ──▶ RenderWorker queue ──▶ HtmlRenderer
//!                     (fixed policy)    (one thread)           (wkhtmltox)
//! ```
//!
//! 1. [`spec`]      — the immutable per-request job specification
//! 2. [`worker`]    — dedicated render thread; the serialization layer
//! 3. [`wkhtmltox`] — the production [`HtmlRenderer`] over libwkhtmltox
//!
//! The [`HtmlRenderer`] trait is the seam the tests stub: the worker and the
//! orchestrator are exercised end-to-end without the native library.

pub mod spec;
pub mod wkhtmltox;
pub mod worker;

pub use spec::RenderJobSpec;
pub use wkhtmltox::WkhtmltoxRenderer;
pub use worker::RenderWorker;

use thiserror::Error;

/// Failure reported by a renderer implementation.
///
/// Wrapped into [`crate::error::ConvertError::RenderFailed`] by the
/// orchestrator; no implementation-specific type crosses that boundary.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The engine rejected or failed the conversion.
    #[error("{0}")]
    Engine(String),

    /// The job could not be handed to the engine at all (e.g. content not
    /// representable as a C string).
    #[error("render job rejected: {0}")]
    BadJob(String),
}

/// Capability to render one HTML document to PDF bytes.
///
/// Implementations may be stateful and are NOT required to be thread-safe:
/// the worker confines each renderer to a single thread and serializes all
/// calls through it. `Send` is required only so the renderer can be
/// constructed on (or moved to) that thread.
pub trait HtmlRenderer: Send {
    /// Render the job to PDF bytes.
    ///
    /// A zero-length return is passed through here; the orchestrator is the
    /// layer that classifies it as a failure.
    fn render(&mut self, spec: &RenderJobSpec) -> Result<Vec<u8>, RenderError>;
}
