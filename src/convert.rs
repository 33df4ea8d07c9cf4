//! The conversion orchestrator: validate → normalize → render → classify.
//!
//! This is the single place where a request's HTML becomes PDF bytes.
//! Validation happens before any renderer work, the render call itself is
//! offloaded to the dedicated worker thread (the caller's async task only
//! awaits a reply channel), and every engine failure leaves here as one
//! stable [`ConvertError`] — no renderer-internal type crosses this
//! boundary.

use std::time::Instant;

use tracing::{debug, info};

use crate::encoding;
use crate::error::ConvertError;
use crate::render::{RenderJobSpec, RenderWorker};

/// Request-scoped HTML→PDF conversion over a shared render worker.
///
/// Cheap to clone; clones share the same worker queue.
#[derive(Clone)]
pub struct ConvertService {
    worker: RenderWorker,
}

impl ConvertService {
    pub fn new(worker: RenderWorker) -> Self {
        Self { worker }
    }

    /// Convert `html` to PDF bytes.
    ///
    /// # Errors
    /// - [`ConvertError::EmptyInput`] — blank input; the renderer is never
    ///   invoked.
    /// - [`ConvertError::RenderFailed`] — the engine reported a failure.
    /// - [`ConvertError::EmptyOutput`] — the engine returned zero bytes.
    pub async fn convert(&self, html: &str) -> Result<Vec<u8>, ConvertError> {
        if html.trim().is_empty() {
            return Err(ConvertError::EmptyInput);
        }
        let started = Instant::now();

        // ── Step 1: Normalize encoding ───────────────────────────────────
        let normalized = encoding::normalize(html);
        debug!(
            input_bytes = html.len(),
            normalized_bytes = normalized.len(),
            "html normalized"
        );

        // ── Step 2: Build the job spec (fixed policy, variable content) ──
        let spec = RenderJobSpec::for_content(normalized);

        // ── Step 3: Render on the worker thread ──────────────────────────
        let bytes = self
            .worker
            .render(spec)
            .await
            .map_err(|e| ConvertError::RenderFailed {
                detail: e.to_string(),
            })?;

        // ── Step 4: Classify the result ──────────────────────────────────
        if bytes.is_empty() {
            return Err(ConvertError::EmptyOutput);
        }

        info!(
            pdf_bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "conversion complete"
        );
        Ok(bytes)
    }

    /// Synchronous wrapper around [`convert`](Self::convert).
    ///
    /// Creates a temporary tokio runtime internally; for callers outside an
    /// async context.
    pub fn convert_sync(&self, html: &str) -> Result<Vec<u8>, ConvertError> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ConvertError::Internal(format!("failed to create tokio runtime: {e}")))?
            .block_on(self.convert(html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{HtmlRenderer, RenderError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Stub renderer: counts calls and echoes input-tagged output.
    struct EchoRenderer {
        calls: Arc<AtomicUsize>,
        delay: Duration,
    }

    impl HtmlRenderer for EchoRenderer {
        fn render(&mut self, spec: &RenderJobSpec) -> Result<Vec<u8>, RenderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            Ok(format!("%PDF-stub {}", spec.html).into_bytes())
        }
    }

    fn echo_service(calls: Arc<AtomicUsize>, delay: Duration) -> ConvertService {
        let worker = RenderWorker::spawn(move || {
            Ok(Box::new(EchoRenderer { calls, delay }) as Box<dyn HtmlRenderer>)
        })
        .unwrap();
        ConvertService::new(worker)
    }

    #[tokio::test]
    async fn empty_input_never_reaches_renderer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = echo_service(calls.clone(), Duration::ZERO);

        for input in ["", "   ", "\n\t  \r\n"] {
            let err = service.convert(input).await.unwrap_err();
            assert!(matches!(err, ConvertError::EmptyInput), "input: {input:?}");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn successful_conversion_returns_engine_bytes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = echo_service(calls.clone(), Duration::ZERO);

        let bytes = service.convert("<p>hi</p>").await.unwrap();
        assert!(bytes.starts_with(b"%PDF-stub"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn renderer_receives_normalized_html() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = echo_service(calls, Duration::ZERO);

        let bytes = service
            .convert("<html><head></head><body>x</body></html>")
            .await
            .unwrap();
        let echoed = String::from_utf8(bytes).unwrap();
        assert!(echoed.contains(r#"<meta charset="utf-8">"#));
    }

    #[tokio::test]
    async fn zero_length_output_is_a_failure() {
        struct Empty;
        impl HtmlRenderer for Empty {
            fn render(&mut self, _spec: &RenderJobSpec) -> Result<Vec<u8>, RenderError> {
                Ok(Vec::new())
            }
        }
        let worker = RenderWorker::spawn(|| Ok(Box::new(Empty) as Box<dyn HtmlRenderer>)).unwrap();
        let service = ConvertService::new(worker);

        let err = service.convert("<p>x</p>").await.unwrap_err();
        assert!(matches!(err, ConvertError::EmptyOutput));
    }

    #[tokio::test]
    async fn engine_error_is_wrapped() {
        struct Failing;
        impl HtmlRenderer for Failing {
            fn render(&mut self, _spec: &RenderJobSpec) -> Result<Vec<u8>, RenderError> {
                Err(RenderError::Engine("segfault adjacent".into()))
            }
        }
        let worker = RenderWorker::spawn(|| Ok(Box::new(Failing) as Box<dyn HtmlRenderer>)).unwrap();
        let service = ConvertService::new(worker);

        let err = service.convert("<p>x</p>").await.unwrap_err();
        match err {
            ConvertError::RenderFailed { detail } => {
                assert!(detail.contains("segfault adjacent"))
            }
            other => panic!("expected RenderFailed, got {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_conversions_keep_their_own_content() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = echo_service(calls.clone(), Duration::from_millis(5));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let svc = service.clone();
                tokio::spawn(async move {
                    let html = format!("<p>request {i}</p>");
                    let bytes = svc.convert(&html).await.unwrap();
                    (html, bytes)
                })
            })
            .collect();
        for result in futures::future::join_all(handles).await {
            let (html, bytes) = result.unwrap();
            let echoed = String::from_utf8(bytes).unwrap();
            assert!(
                echoed.contains(&html),
                "response does not match its own request: {echoed}"
            );
        }
        assert_eq!(calls.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn convert_sync_works_outside_async_context() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = echo_service(calls, Duration::ZERO);

        let bytes = service.convert_sync("<p>sync</p>").unwrap();
        assert!(bytes.starts_with(b"%PDF-stub"));
    }
}
