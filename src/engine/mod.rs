//! Rendering engine boundary.
//!
//! A [`Renderer`] consumes the node IR and produces encoded bytes. It is an opaque collaborator
//! that reports failures as `"<Category>, <detail>"` strings; [`ReferenceRenderer`] is the
//! in-crate implementation used by the CLI and the test-suite.

pub(crate) mod encode;
pub(crate) mod paint;
pub(crate) mod reference;
pub(crate) mod style;

use std::fmt;

use crate::{foundation::core::RenderOptions, node::Node};

pub use reference::ReferenceRenderer;

/// Failure category leading every engine error string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The engine rejected its input (style, node shape, font bytes).
    InvalidArg,
    /// Anything else.
    GenericFailure,
}

impl ErrorCategory {
    /// Token used in the error grammar.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArg => "InvalidArg",
            Self::GenericFailure => "GenericFailure",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured engine failure. Displays as `"<Category>, <detail>"`.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
#[error("{category}, {detail}")]
pub struct EngineFailure {
    /// Leading category.
    pub category: ErrorCategory,
    /// Free-form detail; never reformatted downstream.
    pub detail: String,
}

impl EngineFailure {
    /// `InvalidArg` failure.
    pub fn invalid_arg(detail: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::InvalidArg,
            detail: detail.into(),
        }
    }

    /// `GenericFailure` failure.
    pub fn generic(detail: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::GenericFailure,
            detail: detail.into(),
        }
    }

    /// Parse an engine error string. Returns `None` when `s` does not follow the grammar.
    pub fn parse(s: &str) -> Option<Self> {
        let (category, detail) = s.split_once(", ")?;
        let category = match category {
            "InvalidArg" => ErrorCategory::InvalidArg,
            "GenericFailure" => ErrorCategory::GenericFailure,
            _ => return None,
        };
        Some(Self {
            category,
            detail: detail.to_string(),
        })
    }
}

/// Synchronous engine entry points.
///
/// Implementations must tolerate concurrent calls: font and persistent image registration may
/// race with renders, and their caches are additive-only.
pub trait Renderer: Send + Sync {
    /// Lay out, paint and encode `node`.
    fn render(&self, node: &Node, options: &RenderOptions) -> Result<Vec<u8>, EngineFailure>;

    /// Add a font to the engine's font cache.
    fn load_font(&self, data: &[u8]) -> Result<(), EngineFailure>;

    /// Store decoded image bytes under `src` for the lifetime of the engine.
    fn put_persistent_image(&self, src: &str, data: &[u8]) -> Result<(), EngineFailure>;

    /// Whether the engine can fetch `Image` sources that arrive as plain references.
    fn fetches_references(&self) -> bool {
        false
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/failure.rs"]
mod tests;
