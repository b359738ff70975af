use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use crate::{
    backend::{BackendKind, ReferenceModule},
    compile::assets::ImageMode,
    foundation::{
        core::RenderOptions,
        error::{RastreeError, RastreeResult},
    },
};

/// Orchestrator settings, usually loaded from a JSON file.
///
/// Relative paths are resolved against the config file's directory when loaded with
/// [`OrchestratorConfig::from_path`], and against the working directory otherwise.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrchestratorConfig {
    /// Backend variant.
    pub backend: BackendKind,
    /// Forces an image mode instead of the backend's preference.
    pub image_mode: Option<ImageMode>,
    /// Directory relative image sources are read from.
    pub asset_root: Option<PathBuf>,
    /// Font files loaded when the backend starts.
    pub fonts: Vec<PathBuf>,
    /// Images stored in the engine under fixed keys when the backend starts.
    pub persistent_images: Vec<PersistentImageConfig>,
    /// Default render options.
    pub options: RenderOptions,
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

/// A persistent image preload.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PersistentImageConfig {
    /// Key `img` elements refer to.
    pub src: String,
    /// Image file.
    pub path: PathBuf,
}

impl OrchestratorConfig {
    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> RastreeResult<Self> {
        let config: Self = serde_json::from_reader(r)
            .map_err(|e| RastreeError::validation(format!("parse orchestrator config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> RastreeResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            RastreeError::validation(format!("open orchestrator config '{}': {e}", path.display()))
        })?;
        let mut config = Self::from_reader(BufReader::new(f))?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Check option invariants and preload declarations.
    pub fn validate(&self) -> RastreeResult<()> {
        self.options.validate()?;
        for image in &self.persistent_images {
            if image.src.is_empty() {
                return Err(RastreeError::validation(
                    "persistent image src must be non-empty",
                ));
            }
        }
        Ok(())
    }

    /// Resolve `path` against the config's base directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Asset root with the base directory applied; defaults to the base directory itself.
    pub fn resolved_asset_root(&self) -> PathBuf {
        match &self.asset_root {
            Some(root) => self.resolve(root),
            None => self.base_dir.clone().unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    /// Engine module loader carrying this config's startup assets.
    pub fn module_loader(&self) -> ReferenceModule {
        let mut module = ReferenceModule::new();
        if self.image_mode == Some(ImageMode::Reference) {
            module = module.with_asset_root(self.resolved_asset_root());
        }
        for font in &self.fonts {
            module = module.with_font(self.resolve(font));
        }
        for image in &self.persistent_images {
            module = module.with_persistent_image(image.src.clone(), self.resolve(&image.path));
        }
        module
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/config.rs"]
mod tests;
