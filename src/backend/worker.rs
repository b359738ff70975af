use std::sync::Arc;

use futures::{FutureExt as _, future::BoxFuture};
use tokio::sync::{Mutex, OnceCell};

use super::{Backend, BackendHandle, BackendKind, ModuleLoader, from_data_url, translate};
use crate::{
    compile::assets::ImageMode,
    foundation::{
        core::RenderOptions,
        error::{RastreeError, RastreeResult},
    },
    node::Node,
    worker::{InboundMessage, OutboundMessage, WorkerPort, spawn_worker},
};

/// Proxy that renders through a background worker.
///
/// The worker is spawned on first use and renders are sent only after it reports `ready`. The
/// protocol is single-slot, so the port is held for the whole request/reply exchange.
pub struct WorkerBackend {
    loader: Arc<dyn ModuleLoader>,
    port: OnceCell<Mutex<WorkerPort>>,
}

impl std::fmt::Debug for WorkerBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerBackend")
            .field("started", &self.port.initialized())
            .finish_non_exhaustive()
    }
}

impl WorkerBackend {
    /// Proxy whose worker loads its engine through `loader`.
    pub fn new(loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            loader,
            port: OnceCell::new(),
        }
    }

    async fn port(&self) -> RastreeResult<&Mutex<WorkerPort>> {
        self.port
            .get_or_try_init(|| async {
                let mut port = spawn_worker(self.loader.clone())?;
                loop {
                    match port.recv().await {
                        Some(OutboundMessage::Ready) => break,
                        Some(other) => {
                            tracing::debug!(?other, "unexpected message before ready");
                        }
                        None => {
                            return Err(RastreeError::backend_init(
                                "worker stopped before it was ready",
                            ));
                        }
                    }
                }
                Ok(Mutex::new(port))
            })
            .await
    }

    async fn request(&self, node: Node, options: RenderOptions) -> RastreeResult<String> {
        let mut port = self.port().await?.lock().await;
        port.post(&InboundMessage::Render { node, options })?;
        loop {
            match port.recv().await {
                Some(OutboundMessage::RenderComplete { data_url, duration }) => {
                    tracing::debug!(duration_ms = duration, "worker render complete");
                    return Ok(data_url);
                }
                Some(OutboundMessage::RenderError { error }) => {
                    return Err(translate::translate_message(error));
                }
                Some(OutboundMessage::Ready) => continue,
                None => {
                    return Err(RastreeError::worker_protocol(
                        "worker stopped before replying",
                    ));
                }
            }
        }
    }
}

impl Backend for WorkerBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Worker
    }

    fn image_mode(&self) -> ImageMode {
        ImageMode::Prefetch
    }

    fn prepare(&self) -> BoxFuture<'_, RastreeResult<()>> {
        async move { self.port().await.map(|_| ()) }.boxed()
    }

    fn render(&self, node: Node, options: RenderOptions) -> BoxFuture<'_, RastreeResult<Vec<u8>>> {
        async move { from_data_url(&self.request(node, options).await?) }.boxed()
    }

    fn render_as_data_url(
        &self,
        node: Node,
        options: RenderOptions,
    ) -> BoxFuture<'_, RastreeResult<String>> {
        self.request(node, options).boxed()
    }

    fn handle(&self) -> Option<Arc<BackendHandle>> {
        None
    }
}
