//! Backend adapters: one capability surface over several execution environments.
//!
//! Every variant renders through a [`BackendHandle`]; they differ only in how the handle is
//! initialized and where the engine call runs. Given the same node tree and options, all variants
//! return identical bytes.

pub(crate) mod handle;
pub(crate) mod module;
pub(crate) mod native;
pub(crate) mod translate;
pub(crate) mod wasm;
pub(crate) mod worker;

use std::{str::FromStr, sync::Arc};

use base64::Engine as _;
use futures::{FutureExt as _, future::BoxFuture};

use crate::{
    compile::assets::ImageMode,
    foundation::{
        core::{OutputFormat, RenderOptions},
        error::{RastreeError, RastreeResult},
    },
    node::Node,
};
pub use handle::BackendHandle;
pub use module::{ModuleLoader, ReferenceModule};
pub use native::NativeBackend;
pub use wasm::{WasmAsyncBackend, WasmSyncBackend};
pub use worker::WorkerBackend;

/// Selects a backend variant.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// In-process call on the caller's thread.
    #[default]
    Native,
    /// In-process call offloaded to the blocking pool.
    NativeAsync,
    /// Module instantiated synchronously; must be initialized before rendering.
    WasmSync,
    /// Module loaded asynchronously; exposes a ready signal.
    WasmAsync,
    /// Message-passing proxy to a background worker.
    Worker,
}

impl BackendKind {
    /// Every variant, in declaration order.
    pub const ALL: [BackendKind; 5] = [
        Self::Native,
        Self::NativeAsync,
        Self::WasmSync,
        Self::WasmAsync,
        Self::Worker,
    ];

    /// Kebab-case name used in configs and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::NativeAsync => "native-async",
            Self::WasmSync => "wasm-sync",
            Self::WasmAsync => "wasm-async",
            Self::Worker => "worker",
        }
    }
}

impl FromStr for BackendKind {
    type Err = RastreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| RastreeError::validation(format!("unknown backend '{s}'")))
    }
}

/// Transport and initialization surface shared by all backend variants.
pub trait Backend: Send + Sync {
    /// Which variant this is.
    fn kind(&self) -> BackendKind;

    /// How the compiler should carry image sources for this backend.
    fn image_mode(&self) -> ImageMode;

    /// Initialize the backend. Idempotent; later calls reuse the first successful result.
    fn prepare(&self) -> BoxFuture<'_, RastreeResult<()>>;

    /// Render `node` to encoded bytes.
    fn render(&self, node: Node, options: RenderOptions) -> BoxFuture<'_, RastreeResult<Vec<u8>>>;

    /// Render `node` to a base64 `data:` URL.
    fn render_as_data_url(
        &self,
        node: Node,
        options: RenderOptions,
    ) -> BoxFuture<'_, RastreeResult<String>> {
        async move {
            let bytes = self.render(node, options).await?;
            Ok(to_data_url(options.format, &bytes))
        }
        .boxed()
    }

    /// Shared engine handle, when this backend lives in the caller's process.
    fn handle(&self) -> Option<Arc<BackendHandle>>;
}

/// Encode `bytes` as a `data:` URL typed by `format`.
pub fn to_data_url(format: OutputFormat, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        format.content_type(),
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Decode the payload of a base64 `data:` URL produced by [`to_data_url`].
pub(crate) fn from_data_url(url: &str) -> RastreeResult<Vec<u8>> {
    let (_, payload) = url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .ok_or_else(|| RastreeError::worker_protocol("render result is not a base64 data URL"))?;
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| RastreeError::worker_protocol(format!("invalid base64 in render result: {e}")))
}

/// Build the backend selected by `kind`. Modules are loaded through `loader`.
///
/// Native variants instantiate their module immediately; the others defer to
/// [`Backend::prepare`].
pub fn create_backend(
    kind: BackendKind,
    loader: Arc<dyn ModuleLoader>,
) -> RastreeResult<Arc<dyn Backend>> {
    let backend: Arc<dyn Backend> = match kind {
        BackendKind::Native | BackendKind::NativeAsync => {
            let handle = Arc::new(loader.instantiate().map_err(module::init_error)?);
            if kind == BackendKind::Native {
                Arc::new(NativeBackend::new(handle))
            } else {
                Arc::new(NativeBackend::offloaded(handle))
            }
        }
        BackendKind::WasmSync => Arc::new(WasmSyncBackend::new(loader)),
        BackendKind::WasmAsync => Arc::new(WasmAsyncBackend::new(loader)),
        BackendKind::Worker => Arc::new(WorkerBackend::new(loader)),
    };
    tracing::debug!(backend = kind.as_str(), "created backend");
    Ok(backend)
}

#[cfg(test)]
#[path = "../../tests/unit/backend/kind.rs"]
mod tests;
