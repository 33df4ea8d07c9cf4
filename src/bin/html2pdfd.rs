//! Service binary for html2pdf-server.
//!
//! A thin shim over the library crate: maps CLI flags to `ServerConfig`,
//! loads the native engine (failing fast before the socket is bound), and
//! serves until interrupted.

use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use html2pdf_server::http::{build_router, AppState};
use html2pdf_server::render::HtmlRenderer;
use html2pdf_server::{ConvertService, RenderWorker, ServerConfig, WkhtmltoxRenderer};
use tracing::info;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve on the default port (5000)
  html2pdfd

  # Bind a specific interface and port
  html2pdfd --host 127.0.0.1 --port 8080

  # Point at a non-standard wkhtmltox install
  html2pdfd --wkhtmltox-lib /opt/wkhtmltox/lib/libwkhtmltox.so

ENDPOINTS:
  POST /convert        JSON body  {"htmlContent": "<html>…</html>"}
  POST /convert-form   form field htmlContent (urlencoded or multipart)
  POST /convert-raw    raw text/html or text/plain body
  GET  /health         liveness probe

ENVIRONMENT VARIABLES:
  WKHTMLTOX_LIB_PATH   Path to an existing libwkhtmltox — skips the probe
                       of well-known install locations
  RUST_LOG             Tracing filter (overrides --verbose/--quiet)

SETUP:
  Install wkhtmltopdf 0.12.x (which ships libwkhtmltox) from your package
  manager or https://wkhtmltopdf.org/downloads.html, then start the service.
  The process refuses to start if the engine cannot be loaded.
"#;

/// HTML→PDF conversion service over the wkhtmltox engine.
#[derive(Parser, Debug)]
#[command(
    name = "html2pdfd",
    version,
    about = "Serve an HTML to PDF conversion API backed by wkhtmltox",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Interface to bind.
    #[arg(long, env = "HTML2PDF_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// TCP port to bind.
    #[arg(long, short, env = "HTML2PDF_PORT", default_value_t = 5000)]
    port: u16,

    /// Maximum request-body size in megabytes (floor: 50).
    #[arg(long, env = "HTML2PDF_MAX_BODY_MB", default_value_t = 64)]
    max_body_mb: usize,

    /// Explicit path to the wkhtmltox shared library.
    #[arg(long, env = "WKHTMLTOX_LIB_PATH")]
    wkhtmltox_lib: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "HTML2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "HTML2PDF_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    // ── Configuration ────────────────────────────────────────────────────
    let mut builder = ServerConfig::builder()
        .host(cli.host)
        .port(cli.port)
        .max_body_bytes(cli.max_body_mb * 1024 * 1024);
    if let Some(path) = cli.wkhtmltox_lib {
        builder = builder.wkhtmltox_lib_path(path);
    }
    let config = builder.build().context("invalid server configuration")?;

    // ── Load the native engine (fail fast) ───────────────────────────────
    // Resolution happens before the worker spawns so a missing library is
    // reported with the probe list, not as a worker startup failure.
    let lib_path = match &config.wkhtmltox_lib_path {
        Some(path) => path.clone(),
        None => wkhtmltox_auto::locate_library().context("wkhtmltox engine unavailable")?,
    };
    info!(path = %lib_path.display(), "using wkhtmltox library");

    let worker = RenderWorker::spawn(move || {
        Ok(Box::new(WkhtmltoxRenderer::load(&lib_path)?) as Box<dyn HtmlRenderer>)
    })
    .context("failed to initialize the render engine")?;

    // ── Serve ────────────────────────────────────────────────────────────
    let state = AppState {
        convert: ConvertService::new(worker),
    };
    let app = build_router(state, config.max_body_bytes);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "html2pdf-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until killed.
        std::future::pending::<()>().await;
    }
}
