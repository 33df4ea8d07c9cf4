//! The render worker: a dedicated OS thread that owns the renderer and
//! executes jobs strictly one at a time.
//!
//! ## Why a thread, not a mutex?
//!
//! wkhtmltox is single-threaded by contract: `wkhtmltopdf_init` and every
//! conversion must happen on the *same* thread, and concurrent calls are
//! undefined behavior. A mutex would serialize calls but still migrate them
//! across tokio worker threads, violating the affinity requirement. One
//! dedicated thread owning the handle satisfies both constraints and keeps
//! native rendering — CPU-heavy and blocking — entirely off the async
//! executor.
//!
//! The renderer is constructed *on* the worker thread via the factory
//! closure, and the construction result is handed back through a startup
//! handshake so a broken native library fails the process before it serves
//! traffic.

use std::thread;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use crate::error::StartupError;
use crate::render::{HtmlRenderer, RenderError, RenderJobSpec};

struct Job {
    spec: RenderJobSpec,
    reply: oneshot::Sender<Result<Vec<u8>, RenderError>>,
}

/// Handle to the render thread. Cloneable; all clones feed the same queue.
///
/// Dropping the last handle closes the queue and the thread exits after the
/// job in flight, if any, completes.
#[derive(Clone)]
pub struct RenderWorker {
    tx: mpsc::UnboundedSender<Job>,
}

impl RenderWorker {
    /// Spawn the worker thread and construct the renderer on it.
    ///
    /// Blocks until the factory has run. A factory error is returned here —
    /// this is the fail-fast point for a missing or broken native library.
    pub fn spawn<F>(factory: F) -> Result<Self, StartupError>
    where
        F: FnOnce() -> Result<Box<dyn HtmlRenderer>, StartupError> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        let (ready_tx, ready_rx) = std::sync::mpsc::sync_channel::<Result<(), StartupError>>(1);

        thread::Builder::new()
            .name("render-worker".into())
            .spawn(move || {
                let mut renderer = match factory() {
                    Ok(r) => {
                        let _ = ready_tx.send(Ok(()));
                        r
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                info!("render worker started");
                while let Some(job) = rx.blocking_recv() {
                    debug!(html_bytes = job.spec.html.len(), "render job started");
                    let result = renderer.render(&job.spec);
                    if let Err(ref e) = result {
                        error!(error = %e, "render job failed");
                    }
                    // Caller may have hung up (dropped request); nothing to do.
                    let _ = job.reply.send(result);
                }
                info!("render worker stopped");
            })
            .map_err(StartupError::WorkerSpawn)?;

        ready_rx
            .recv()
            .map_err(|_| StartupError::WorkerSpawn(std::io::Error::other("worker exited before signalling readiness")))??;

        Ok(Self { tx })
    }

    /// Submit a job and await its result without blocking the async runtime.
    pub async fn render(&self, spec: RenderJobSpec) -> Result<Vec<u8>, RenderError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Job { spec, reply })
            .map_err(|_| RenderError::Engine("render worker is gone".into()))?;
        rx.await
            .map_err(|_| RenderError::Engine("render worker dropped the job".into()))?
    }
}
