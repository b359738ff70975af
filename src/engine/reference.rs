use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use image::RgbaImage;

use super::{
    EngineFailure, Renderer, encode,
    paint::{self, ImageLookup},
};
use crate::{
    compile::assets::{decode_data_uri, normalize_rel_path},
    foundation::core::RenderOptions,
    node::{ImageSource, Node},
};

/// In-process engine: block/flex layout, box painting and `image`-based encoding.
///
/// Fonts and persistent images are kept for the lifetime of the renderer and are never evicted.
pub struct ReferenceRenderer {
    fonts: RwLock<usvg::fontdb::Database>,
    persistent: RwLock<HashMap<String, Arc<RgbaImage>>>,
    asset_root: Option<PathBuf>,
}

impl std::fmt::Debug for ReferenceRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceRenderer")
            .field("fonts", &self.font_count())
            .field("persistent_images", &self.persistent_image_count())
            .field("asset_root", &self.asset_root)
            .finish()
    }
}

impl Default for ReferenceRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceRenderer {
    /// Renderer with an empty font cache and no asset root.
    pub fn new() -> Self {
        Self {
            fonts: RwLock::new(usvg::fontdb::Database::new()),
            persistent: RwLock::new(HashMap::new()),
            asset_root: None,
        }
    }

    /// Resolve plain image references against `root` instead of requiring prefetched bytes.
    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = Some(root.into());
        self
    }

    /// Number of font faces currently loaded.
    pub fn font_count(&self) -> usize {
        self.fonts.read().map(|db| db.len()).unwrap_or(0)
    }

    /// Number of persistent images stored.
    pub fn persistent_image_count(&self) -> usize {
        self.persistent.read().map(|m| m.len()).unwrap_or(0)
    }

    fn read_reference(&self, root: &Path, src: &str) -> Result<Vec<u8>, EngineFailure> {
        let rel = src.strip_prefix("file://").unwrap_or(src);
        let rel = normalize_rel_path(rel).map_err(|e| EngineFailure::invalid_arg(e.to_string()))?;
        std::fs::read(root.join(rel))
            .map_err(|e| EngineFailure::generic(format!("failed to read image '{src}': {e}")))
    }
}

fn decode(bytes: &[u8]) -> Result<RgbaImage, EngineFailure> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| EngineFailure::invalid_arg(format!("failed to decode image: {e}")))
}

fn poisoned() -> EngineFailure {
    EngineFailure::generic("engine state lock poisoned")
}

impl ImageLookup for ReferenceRenderer {
    fn image(&self, src: &ImageSource) -> Result<Arc<RgbaImage>, EngineFailure> {
        match src {
            ImageSource::Binary(handle) => decode(handle.bytes()).map(Arc::new),
            ImageSource::Url(url) => {
                if let Some(img) = self.persistent.read().map_err(|_| poisoned())?.get(url) {
                    return Ok(img.clone());
                }
                let bytes = if url.starts_with("data:") {
                    decode_data_uri(url).map_err(|e| EngineFailure::invalid_arg(e.to_string()))?
                } else if let Some(root) = &self.asset_root {
                    self.read_reference(root, url)?
                } else {
                    return Err(EngineFailure::generic(format!(
                        "image '{url}' is not a persistent image and cannot be fetched"
                    )));
                };
                decode(&bytes).map(Arc::new)
            }
        }
    }
}

impl Renderer for ReferenceRenderer {
    #[tracing::instrument(level = "debug", skip_all, fields(format = options.format.as_str()))]
    fn render(&self, node: &Node, options: &RenderOptions) -> Result<Vec<u8>, EngineFailure> {
        options
            .validate()
            .map_err(|e| EngineFailure::invalid_arg(e.to_string()))?;
        let canvas = paint::rasterize(node, options.viewport, self, options.debug_border)?;
        encode::encode(&canvas, options.format, options.quality)
            .map_err(|e| EngineFailure::generic(format!("failed to encode image: {e:#}")))
    }

    fn load_font(&self, data: &[u8]) -> Result<(), EngineFailure> {
        if data.is_empty() {
            return Err(EngineFailure::invalid_arg("font data is empty"));
        }
        let mut db = self.fonts.write().map_err(|_| poisoned())?;
        let before = db.len();
        db.load_font_data(data.to_vec());
        tracing::debug!(faces = db.len() - before, "loaded font data");
        Ok(())
    }

    fn put_persistent_image(&self, src: &str, data: &[u8]) -> Result<(), EngineFailure> {
        let img = Arc::new(decode(data)?);
        let mut store = self.persistent.write().map_err(|_| poisoned())?;
        store.entry(src.to_string()).or_insert(img);
        Ok(())
    }

    fn fetches_references(&self) -> bool {
        self.asset_root.is_some()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/reference.rs"]
mod tests;
