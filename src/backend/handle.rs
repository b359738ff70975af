use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use anyhow::anyhow;
use xxhash_rust::xxh3::xxh3_64;

use super::translate::translate_failure;
use crate::{
    engine::Renderer,
    foundation::{core::RenderOptions, error::RastreeResult},
    node::Node,
};

/// An initialized engine plus the ledger of what has been registered with it.
///
/// Registration is additive and idempotent: a font is identified by the hash of its bytes and is
/// loaded at most once; a persistent image key keeps its first value.
pub struct BackendHandle {
    renderer: Arc<dyn Renderer>,
    fonts: Mutex<HashSet<u64>>,
    images: Mutex<HashSet<String>>,
}

impl std::fmt::Debug for BackendHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendHandle")
            .field("fonts", &self.font_count())
            .field("persistent_images", &self.persistent_image_count())
            .finish_non_exhaustive()
    }
}

impl BackendHandle {
    /// Wrap an engine.
    pub fn new(renderer: Arc<dyn Renderer>) -> Self {
        Self {
            renderer,
            fonts: Mutex::new(HashSet::new()),
            images: Mutex::new(HashSet::new()),
        }
    }

    /// The wrapped engine.
    pub fn renderer(&self) -> &Arc<dyn Renderer> {
        &self.renderer
    }

    /// Load a font unless identical bytes were already loaded. Returns whether it was new.
    pub fn register_font(&self, data: &[u8]) -> RastreeResult<bool> {
        let key = xxh3_64(data);
        let mut fonts = self
            .fonts
            .lock()
            .map_err(|_| anyhow!("font ledger lock poisoned"))?;
        if fonts.contains(&key) {
            tracing::debug!(hash = key, "font already registered");
            return Ok(false);
        }
        self.renderer.load_font(data).map_err(translate_failure)?;
        fonts.insert(key);
        Ok(true)
    }

    /// Store a persistent image unless `src` is already taken. Returns whether it was new.
    pub fn put_persistent_image(&self, src: &str, data: &[u8]) -> RastreeResult<bool> {
        let mut images = self
            .images
            .lock()
            .map_err(|_| anyhow!("persistent image ledger lock poisoned"))?;
        if images.contains(src) {
            tracing::debug!(src, "persistent image already registered");
            return Ok(false);
        }
        self.renderer
            .put_persistent_image(src, data)
            .map_err(translate_failure)?;
        images.insert(src.to_string());
        Ok(true)
    }

    /// Render through the engine, translating failures.
    pub fn render(&self, node: &Node, options: &RenderOptions) -> RastreeResult<Vec<u8>> {
        self.renderer.render(node, options).map_err(translate_failure)
    }

    /// Distinct fonts registered through this handle.
    pub fn font_count(&self) -> usize {
        self.fonts.lock().map(|f| f.len()).unwrap_or(0)
    }

    /// Distinct persistent image keys registered through this handle.
    pub fn persistent_image_count(&self) -> usize {
        self.images.lock().map(|i| i.len()).unwrap_or(0)
    }

    /// Whether the engine resolves plain image references itself.
    pub fn fetches_references(&self) -> bool {
        self.renderer.fetches_references()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/backend/handle.rs"]
mod tests;
