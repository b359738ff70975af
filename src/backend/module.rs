use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use futures::{FutureExt as _, future::BoxFuture};

use super::handle::BackendHandle;
use crate::{
    engine::ReferenceRenderer,
    foundation::error::{RastreeError, RastreeResult},
};

/// Loads and instantiates an engine module together with its startup assets.
pub trait ModuleLoader: Send + Sync {
    /// Instantiate synchronously from assets that are already at hand.
    fn instantiate(&self) -> RastreeResult<BackendHandle>;

    /// Fetch assets and instantiate without blocking the caller.
    fn load(&self) -> BoxFuture<'_, RastreeResult<BackendHandle>> {
        async move { self.instantiate() }.boxed()
    }
}

/// Normalize a module failure into [`RastreeError::BackendInit`].
pub(crate) fn init_error(err: RastreeError) -> RastreeError {
    match err {
        RastreeError::BackendInit(_) => err,
        other => RastreeError::backend_init(format!("{:#}", anyhow::Error::new(other))),
    }
}

/// Module loader for [`ReferenceRenderer`], preloading fonts and persistent images from disk.
#[derive(Clone, Debug, Default)]
pub struct ReferenceModule {
    asset_root: Option<PathBuf>,
    fonts: Vec<PathBuf>,
    persistent_images: Vec<(String, PathBuf)>,
}

impl ReferenceModule {
    /// Loader with no startup assets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Let the engine resolve plain image references below `root`.
    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = Some(root.into());
        self
    }

    /// Load the font file at `path` on startup.
    pub fn with_font(mut self, path: impl Into<PathBuf>) -> Self {
        self.fonts.push(path.into());
        self
    }

    /// Store the image file at `path` under `src` on startup.
    pub fn with_persistent_image(mut self, src: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.persistent_images.push((src.into(), path.into()));
        self
    }

    fn empty_handle(&self) -> BackendHandle {
        let mut renderer = ReferenceRenderer::new();
        if let Some(root) = &self.asset_root {
            renderer = renderer.with_asset_root(root);
        }
        BackendHandle::new(Arc::new(renderer))
    }
}

fn read_font(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))
}

fn read_image(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("read persistent image '{}'", path.display()))
}

impl ModuleLoader for ReferenceModule {
    fn instantiate(&self) -> RastreeResult<BackendHandle> {
        let handle = self.empty_handle();
        for path in &self.fonts {
            handle.register_font(&read_font(path)?)?;
        }
        for (src, path) in &self.persistent_images {
            handle.put_persistent_image(src, &read_image(path)?)?;
        }
        Ok(handle)
    }

    fn load(&self) -> BoxFuture<'_, RastreeResult<BackendHandle>> {
        async move {
            let handle = self.empty_handle();
            for path in &self.fonts {
                let data = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("read font '{}'", path.display()))?;
                handle.register_font(&data)?;
            }
            for (src, path) in &self.persistent_images {
                let data = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("read persistent image '{}'", path.display()))?;
                handle.put_persistent_image(src, &data)?;
            }
            Ok(handle)
        }
        .boxed()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/backend/module.rs"]
mod tests;
