use std::str::FromStr;

use crate::foundation::error::{RastreeError, RastreeResult};

/// Output raster dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Construct a viewport, rejecting zero-sized dimensions.
    pub fn new(width: u32, height: u32) -> RastreeResult<Self> {
        if width == 0 || height == 0 {
            return Err(RastreeError::validation(
                "viewport width/height must be > 0",
            ));
        }
        Ok(Self { width, height })
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 630,
        }
    }
}

/// Encoding applied to rendered pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless PNG.
    #[default]
    Png,
    /// Lossless WebP.
    WebP,
    /// Lossy JPEG; alpha is dropped.
    Jpeg,
    /// Unencoded, tightly packed RGBA8.
    Raw,
}

impl OutputFormat {
    /// MIME type bound to the `content-type` header of a response.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::WebP => "image/webp",
            Self::Jpeg => "image/jpeg",
            Self::Raw => "application/octet-stream",
        }
    }

    /// Lowercase token used in configs and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::WebP => "webp",
            Self::Jpeg => "jpeg",
            Self::Raw => "raw",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = RastreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "webp" => Ok(Self::WebP),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "raw" => Ok(Self::Raw),
            other => Err(RastreeError::validation(format!(
                "unknown output format '{other}'"
            ))),
        }
    }
}

/// Container for multi-frame output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationFormat {
    /// Animated WebP with lossless frames.
    #[default]
    WebP,
    /// Animated PNG.
    Apng,
}

impl AnimationFormat {
    /// MIME type bound to the `content-type` header of a response.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::WebP => "image/webp",
            Self::Apng => "image/apng",
        }
    }

    /// Lowercase token used in configs and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WebP => "webp",
            Self::Apng => "apng",
        }
    }
}

impl FromStr for AnimationFormat {
    type Err = RastreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "webp" => Ok(Self::WebP),
            "apng" | "png" => Ok(Self::Apng),
            other => Err(RastreeError::validation(format!(
                "unknown animation format '{other}'"
            ))),
        }
    }
}

/// Per-render options handed to a backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    /// Output dimensions.
    pub viewport: Viewport,
    /// Output encoding.
    pub format: OutputFormat,
    /// Encoder quality (JPEG only), 1..=100.
    pub quality: Option<u8>,
    /// Outline every box: red around the border box, green around the content box.
    pub debug_border: bool,
}

impl RenderOptions {
    /// Options for `format` at `width`x`height`.
    pub fn new(width: u32, height: u32, format: OutputFormat) -> RastreeResult<Self> {
        Ok(Self {
            viewport: Viewport::new(width, height)?,
            format,
            quality: None,
            debug_border: false,
        })
    }

    /// Check option invariants before handing them to a backend.
    pub fn validate(&self) -> RastreeResult<()> {
        Viewport::new(self.viewport.width, self.viewport.height)?;
        if let Some(q) = self.quality
            && !(1..=100).contains(&q)
        {
            return Err(RastreeError::validation("quality must be within 1..=100"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
