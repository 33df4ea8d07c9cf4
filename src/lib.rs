//! # html2pdf-server
//!
//! Convert HTML to PDF over HTTP, rendering through the wkhtmltox native
//! engine.
//!
//! ## Why this crate?
//!
//! Producing a print-faithful PDF from arbitrary HTML needs a real browser
//! engine — CSS layout, JavaScript, web fonts. wkhtmltox packages one as a
//! shared library; this crate wraps it in a small HTTP service so any client
//! that can POST a string gets back a downloadable document, without linking
//! the engine into every application.
//!
//! ## Pipeline Overview
//!
//! ```text
//! HTML (JSON / form field / raw body)
//!  │
//!  ├─ 1. Extract    three equivalent entry points, one contract
//!  ├─ 2. Validate   blank input → 400 before any engine work
//!  ├─ 3. Normalize  guarantee a UTF-8 charset declaration
//!  ├─ 4. Specify    fixed A4/300-DPI policy wraps the content
//!  ├─ 5. Render     wkhtmltox on a dedicated single worker thread
//!  └─ 6. Respond    application/pdf, attachment, xyz_<stamp>.pdf
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use html2pdf_server::{ConvertService, RenderWorker, WkhtmltoxRenderer};
//! use html2pdf_server::http::{build_router, AppState};
//! use html2pdf_server::render::HtmlRenderer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let lib_path = wkhtmltox_auto::locate_library()?;
//!     let worker = RenderWorker::spawn(move || {
//!         Ok(Box::new(WkhtmltoxRenderer::load(&lib_path)?) as Box<dyn HtmlRenderer>)
//!     })?;
//!     let state = AppState { convert: ConvertService::new(worker) };
//!     let app = build_router(state, 64 * 1024 * 1024);
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency model
//!
//! wkhtmltox is single-threaded: init and every conversion must run on the
//! same thread, and calls must never overlap. All rendering therefore flows
//! through one dedicated worker thread behind a queue — requests stay
//! async, the engine stays serialized, and the tokio workers never block on
//! native rendering.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod encoding;
pub mod error;
pub mod http;
pub mod render;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ServerConfig, ServerConfigBuilder};
pub use convert::ConvertService;
pub use error::{ConvertError, StartupError};
pub use render::{RenderJobSpec, RenderWorker, WkhtmltoxRenderer};
