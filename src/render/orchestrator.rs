use std::sync::Arc;

use anyhow::Context as _;
use image::RgbaImage;

use futures::{FutureExt as _, future::try_join_all};
use tokio::sync::OnceCell;

use super::{
    config::OrchestratorConfig,
    response::{AnimationFrame, ImageResponse, MAX_FRAME_DURATION_MS},
};
use crate::{
    backend::{Backend, create_backend},
    compile::{
        Compiler,
        assets::{ImageMode, RoutingFetcher},
    },
    component::Element,
    engine::encode::encode_animation,
    foundation::{
        core::{AnimationFormat, OutputFormat, RenderOptions},
        error::{RastreeError, RastreeResult},
    },
    node::Node,
};

/// Compiles component trees and renders them through one backend.
///
/// Backend initialization happens once, on first use. Renders through a shared orchestrator are
/// not serialized here; callers that need ordering must provide it.
pub struct Orchestrator {
    compiler: Compiler,
    backend: Arc<dyn Backend>,
    options: RenderOptions,
    prepared: OnceCell<()>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("compiler", &self.compiler)
            .field("backend", &self.backend.kind())
            .field("options", &self.options)
            .field("prepared", &self.prepared.initialized())
            .finish()
    }
}

impl Orchestrator {
    /// Orchestrator over an existing compiler and backend.
    pub fn new(compiler: Compiler, backend: Arc<dyn Backend>) -> Self {
        Self {
            compiler,
            backend,
            options: RenderOptions::default(),
            prepared: OnceCell::new(),
        }
    }

    /// Build the compiler and backend described by `config`.
    pub fn from_config(config: &OrchestratorConfig) -> RastreeResult<Self> {
        config.validate()?;
        let backend = create_backend(config.backend, Arc::new(config.module_loader()))?;
        let mut compiler = Compiler::new().with_fetcher(Arc::new(RoutingFetcher::fs_and_http(
            config.resolved_asset_root(),
        )));
        if let Some(mode) = config.image_mode {
            compiler = compiler.with_image_mode(mode);
        }
        for image in &config.persistent_images {
            compiler = compiler.with_persistent_key(image.src.clone());
        }
        Ok(Self::new(compiler, backend).with_options(config.options))
    }

    /// Replace the default render options.
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Default render options.
    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// The compiler.
    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    /// The backend.
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Initialize the backend if that has not happened yet.
    pub async fn prepare(&self) -> RastreeResult<()> {
        self.prepared
            .get_or_try_init(|| self.backend.prepare())
            .await
            .map(|_| ())
    }

    fn image_mode(&self) -> ImageMode {
        self.compiler
            .image_mode()
            .unwrap_or_else(|| self.backend.image_mode())
    }

    /// Compile `tree` the way this orchestrator's backend wants images carried.
    pub async fn compile(&self, tree: &Element) -> RastreeResult<Node> {
        self.compiler.compile_with_mode(tree, self.image_mode()).await
    }

    /// Register a font with the backend. Returns `false` when identical bytes were already
    /// registered.
    pub async fn register_font(&self, data: &[u8]) -> RastreeResult<bool> {
        self.prepare().await?;
        let handle = self.backend.handle().ok_or_else(|| {
            RastreeError::validation(format!(
                "{} backend only loads fonts at startup",
                self.backend.kind().as_str()
            ))
        })?;
        handle.register_font(data)
    }

    /// Store an image in the engine under `src`. Later `img` elements with that `src` are sent
    /// as references. Returns `false` when `src` was already taken.
    pub async fn put_persistent_image(&self, src: &str, data: &[u8]) -> RastreeResult<bool> {
        self.prepare().await?;
        let handle = self.backend.handle().ok_or_else(|| {
            RastreeError::validation(format!(
                "{} backend only loads persistent images at startup",
                self.backend.kind().as_str()
            ))
        })?;
        let added = handle.put_persistent_image(src, data)?;
        self.compiler.add_persistent_key(src);
        Ok(added)
    }

    /// Compile `tree` and return a response whose body renders on first read.
    ///
    /// Compilation and backend initialization failures are returned here; render failures
    /// surface from [`ImageResponse::bytes`].
    #[tracing::instrument(skip_all, fields(backend = self.backend.kind().as_str()))]
    pub async fn render_to_response(
        &self,
        tree: &Element,
        options: RenderOptions,
    ) -> RastreeResult<ImageResponse> {
        options.validate()?;
        let node = self.compile(tree).await?;
        self.prepare().await?;
        let backend = self.backend.clone();
        let body = async move { backend.render(node, options).await }.boxed();
        Ok(ImageResponse::new(options.format.content_type(), body))
    }

    /// Compile and render `tree` to encoded bytes.
    pub async fn render(&self, tree: &Element, options: RenderOptions) -> RastreeResult<Vec<u8>> {
        self.render_to_response(tree, options).await?.bytes().await
    }

    /// Compile and render `tree` to a base64 `data:` URL.
    pub async fn render_as_data_url(
        &self,
        tree: &Element,
        options: RenderOptions,
    ) -> RastreeResult<String> {
        options.validate()?;
        let node = self.compile(tree).await?;
        self.prepare().await?;
        self.backend.render_as_data_url(node, options).await
    }

    /// Render animation frames in order. Frames are compiled concurrently.
    pub async fn render_frames(
        &self,
        frames: Vec<(Element, u32)>,
        options: RenderOptions,
    ) -> RastreeResult<Vec<AnimationFrame>> {
        options.validate()?;
        let mode = self.image_mode();
        let nodes = try_join_all(
            frames
                .iter()
                .map(|(tree, _)| self.compiler.compile_with_mode(tree, mode)),
        )
        .await?;
        self.prepare().await?;

        let mut out = Vec::with_capacity(nodes.len());
        for (node, (_, duration_ms)) in nodes.into_iter().zip(&frames) {
            let bytes = self.backend.render(node, options).await?;
            out.push(AnimationFrame::new(bytes, *duration_ms));
        }
        tracing::debug!(frames = out.len(), "rendered animation frames");
        Ok(out)
    }

    /// Compile every frame and return a response whose body is one animated image.
    ///
    /// Each element is paired with its display time in milliseconds. `options.format` and
    /// `options.quality` are ignored; frames are always lossless. Durations above
    /// [`MAX_FRAME_DURATION_MS`] are clamped.
    #[tracing::instrument(
        skip_all,
        fields(backend = self.backend.kind().as_str(), format = format.as_str(), frames = frames.len())
    )]
    pub async fn render_animation(
        &self,
        frames: Vec<(Element, u32)>,
        options: RenderOptions,
        format: AnimationFormat,
    ) -> RastreeResult<ImageResponse> {
        if frames.is_empty() {
            return Err(RastreeError::validation("animation needs at least one frame"));
        }
        let options = RenderOptions {
            format: OutputFormat::Raw,
            quality: None,
            ..options
        };
        options.validate()?;
        let mode = self.image_mode();
        let nodes = try_join_all(
            frames
                .iter()
                .map(|(tree, _)| self.compiler.compile_with_mode(tree, mode)),
        )
        .await?;
        self.prepare().await?;

        let durations: Vec<u32> = frames
            .iter()
            .map(|(_, ms)| (*ms).min(MAX_FRAME_DURATION_MS))
            .collect();
        let backend = self.backend.clone();
        let body = async move {
            let (w, h) = (options.viewport.width, options.viewport.height);
            let mut rendered = Vec::with_capacity(nodes.len());
            for (i, (node, duration_ms)) in nodes.into_iter().zip(durations).enumerate() {
                let raw = backend.render(node, options).await?;
                let pixels = RgbaImage::from_raw(w, h, raw).ok_or_else(|| {
                    RastreeError::validation(format!(
                        "frame {i} does not match the {w}x{h} viewport"
                    ))
                })?;
                rendered.push((pixels, duration_ms));
            }
            let encoded = tokio::task::spawn_blocking(move || encode_animation(&rendered, format))
                .await
                .context("animation encode task did not complete")??;
            Ok::<_, RastreeError>(encoded)
        }
        .boxed();
        Ok(ImageResponse::new(format.content_type(), body))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/orchestrator.rs"]
mod tests;
