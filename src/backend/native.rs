use std::sync::Arc;

use anyhow::Context;
use futures::{FutureExt as _, future::BoxFuture};

use super::{Backend, BackendHandle, BackendKind};
use crate::{
    compile::assets::ImageMode,
    foundation::{core::RenderOptions, error::RastreeResult},
    node::Node,
};

/// In-process engine call.
///
/// The plain variant renders on the polling thread. The offloaded variant moves the engine call
/// to tokio's blocking pool so the caller's executor keeps running.
#[derive(Debug)]
pub struct NativeBackend {
    handle: Arc<BackendHandle>,
    offload: bool,
}

impl NativeBackend {
    /// Render on the calling thread.
    pub fn new(handle: Arc<BackendHandle>) -> Self {
        Self {
            handle,
            offload: false,
        }
    }

    /// Render on the blocking pool.
    pub fn offloaded(handle: Arc<BackendHandle>) -> Self {
        Self {
            handle,
            offload: true,
        }
    }

    /// Synchronous render, bypassing the async surface.
    pub fn render_sync(&self, node: &Node, options: &RenderOptions) -> RastreeResult<Vec<u8>> {
        self.handle.render(node, options)
    }
}

impl Backend for NativeBackend {
    fn kind(&self) -> BackendKind {
        if self.offload {
            BackendKind::NativeAsync
        } else {
            BackendKind::Native
        }
    }

    fn image_mode(&self) -> ImageMode {
        if self.handle.fetches_references() {
            ImageMode::Reference
        } else {
            ImageMode::Prefetch
        }
    }

    fn prepare(&self) -> BoxFuture<'_, RastreeResult<()>> {
        futures::future::ready(Ok(())).boxed()
    }

    fn render(&self, node: Node, options: RenderOptions) -> BoxFuture<'_, RastreeResult<Vec<u8>>> {
        if !self.offload {
            return futures::future::ready(self.render_sync(&node, &options)).boxed();
        }
        let handle = self.handle.clone();
        async move {
            tokio::task::spawn_blocking(move || handle.render(&node, &options))
                .await
                .context("native render task did not complete")?
        }
        .boxed()
    }

    fn handle(&self) -> Option<Arc<BackendHandle>> {
        Some(self.handle.clone())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/backend/native.rs"]
mod tests;
