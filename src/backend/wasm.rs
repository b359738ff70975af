//! Module-backed variants that separate instantiation from rendering.

use std::sync::{Arc, OnceLock};

use futures::{FutureExt as _, future::BoxFuture};
use tokio::sync::{OnceCell, watch};

use super::{Backend, BackendHandle, BackendKind, ModuleLoader, module::init_error};
use crate::{
    compile::assets::ImageMode,
    foundation::{
        core::RenderOptions,
        error::{RastreeError, RastreeResult},
    },
    node::Node,
};

/// Synchronously instantiated module.
///
/// [`WasmSyncBackend::init`] must run before the first render in the same context.
pub struct WasmSyncBackend {
    loader: Arc<dyn ModuleLoader>,
    handle: OnceLock<Arc<BackendHandle>>,
}

impl std::fmt::Debug for WasmSyncBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WasmSyncBackend")
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

impl WasmSyncBackend {
    /// Backend that will instantiate through `loader`.
    pub fn new(loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            loader,
            handle: OnceLock::new(),
        }
    }

    /// Instantiate the module once. Later calls return the existing handle.
    pub fn init(&self) -> RastreeResult<&Arc<BackendHandle>> {
        if let Some(handle) = self.handle.get() {
            return Ok(handle);
        }
        let handle = Arc::new(self.loader.instantiate().map_err(init_error)?);
        Ok(self.handle.get_or_init(|| handle))
    }

    /// Whether [`WasmSyncBackend::init`] has completed.
    pub fn is_initialized(&self) -> bool {
        self.handle.get().is_some()
    }

    /// Render synchronously.
    ///
    /// # Panics
    ///
    /// Panics when called before [`WasmSyncBackend::init`]; that is a programming error, not a
    /// recoverable condition.
    pub fn render_sync(&self, node: &Node, options: &RenderOptions) -> RastreeResult<Vec<u8>> {
        let Some(handle) = self.handle.get() else {
            panic!("WasmSyncBackend rendered before init()");
        };
        handle.render(node, options)
    }
}

impl Backend for WasmSyncBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::WasmSync
    }

    fn image_mode(&self) -> ImageMode {
        ImageMode::Prefetch
    }

    fn prepare(&self) -> BoxFuture<'_, RastreeResult<()>> {
        futures::future::ready(self.init().map(|_| ())).boxed()
    }

    fn render(&self, node: Node, options: RenderOptions) -> BoxFuture<'_, RastreeResult<Vec<u8>>> {
        futures::future::ready(self.render_sync(&node, &options)).boxed()
    }

    fn handle(&self) -> Option<Arc<BackendHandle>> {
        self.handle.get().cloned()
    }
}

/// Asynchronously loaded module.
///
/// Renders issued before loading completes are rejected; wait on [`WasmAsyncBackend::ready`]
/// (or drive [`WasmAsyncBackend::init`]) first.
pub struct WasmAsyncBackend {
    loader: Arc<dyn ModuleLoader>,
    handle: OnceCell<Arc<BackendHandle>>,
    ready: watch::Sender<bool>,
}

impl std::fmt::Debug for WasmAsyncBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WasmAsyncBackend")
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

impl WasmAsyncBackend {
    /// Backend that will load through `loader`.
    pub fn new(loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            loader,
            handle: OnceCell::new(),
            ready: watch::Sender::new(false),
        }
    }

    /// Load the module once; concurrent callers share one load. A failed load may be retried.
    pub async fn init(&self) -> RastreeResult<Arc<BackendHandle>> {
        let handle = self
            .handle
            .get_or_try_init(|| async {
                let handle = self.loader.load().await.map_err(init_error)?;
                tracing::debug!("module loaded");
                Ok::<_, RastreeError>(Arc::new(handle))
            })
            .await?
            .clone();
        self.ready.send_replace(true);
        Ok(handle)
    }

    /// Resolves once the module has been loaded by some caller.
    pub async fn ready(&self) {
        let mut rx = self.ready.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|ready| *ready).await;
    }

    /// Whether the module has been loaded.
    pub fn is_initialized(&self) -> bool {
        self.handle.initialized()
    }
}

impl Backend for WasmAsyncBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::WasmAsync
    }

    fn image_mode(&self) -> ImageMode {
        ImageMode::Prefetch
    }

    fn prepare(&self) -> BoxFuture<'_, RastreeResult<()>> {
        async move { self.init().await.map(|_| ()) }.boxed()
    }

    fn render(&self, node: Node, options: RenderOptions) -> BoxFuture<'_, RastreeResult<Vec<u8>>> {
        let result = match self.handle.get() {
            Some(handle) => handle.render(&node, &options),
            None => Err(RastreeError::backend_init(
                "module is not loaded; await ready() before rendering",
            )),
        };
        futures::future::ready(result).boxed()
    }

    fn handle(&self) -> Option<Arc<BackendHandle>> {
        self.handle.get().cloned()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/backend/wasm.rs"]
mod tests;
