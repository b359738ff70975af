//! Canonical node IR exchanged between the compiler and rendering backends.
//!
//! Every node handed to a backend carries a fully resolved [`StyleRecord`] (or none at all).
//! The tree is JSON-serializable; binary image handles serialize as base64 `data:` URIs.

pub(crate) mod style;

use std::sync::Arc;

use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::foundation::error::{RastreeError, RastreeResult};
use style::StyleRecord;

/// A node of the render IR.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// Groups children in document order.
    Container(ContainerNode),
    /// A run of text.
    Text(TextNode),
    /// A raster image.
    Image(ImageNode),
    /// A node kind understood only by engines that registered it.
    Extension(ExtensionNode),
}

/// Container node; owns its children exclusively.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerNode {
    /// Effective style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleRecord>,
    /// Children in source order.
    #[serde(default)]
    pub children: Vec<Node>,
}

/// Text leaf.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    /// Effective style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleRecord>,
    /// Text payload.
    pub text: String,
}

/// Image leaf.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageNode {
    /// Effective style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleRecord>,
    /// Where the pixels come from.
    pub src: ImageSource,
    /// Explicit width in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    /// Explicit height in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
}

/// Open extension node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtensionNode {
    /// Registered extension name.
    pub kind: String,
    /// Effective style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleRecord>,
    /// Children in source order.
    #[serde(default)]
    pub children: Vec<Node>,
    /// Extension-specific properties, passed through untouched.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub props: serde_json::Map<String, serde_json::Value>,
}

/// Image source: either a reference the engine resolves itself, or pre-fetched bytes.
#[derive(Clone, Debug, PartialEq)]
pub enum ImageSource {
    /// Remote URL, asset path, persistent image key, or `data:` URI.
    Url(String),
    /// Bytes fetched during compilation.
    Binary(ImageHandle),
}

/// Pre-fetched image bytes with a content hash.
///
/// A handle is only meaningful for the render call whose compilation produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageHandle {
    hash: u64,
    bytes: Arc<[u8]>,
}

impl ImageHandle {
    /// Wrap fetched bytes.
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes = bytes.into();
        Self {
            hash: xxhash_rust::xxh3::xxh3_64(&bytes),
            bytes,
        }
    }

    /// xxh3 hash of the bytes.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Raw encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// MIME type sniffed from the bytes, falling back to `application/octet-stream`.
    pub fn mime_type(&self) -> &'static str {
        image::guess_format(&self.bytes)
            .map(|f| f.to_mime_type())
            .unwrap_or("application/octet-stream")
    }

    /// Encode as a base64 `data:` URI.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type(),
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

impl ImageSource {
    /// The reference string, if this source is not binary.
    pub fn as_url(&self) -> Option<&str> {
        match self {
            Self::Url(s) => Some(s),
            Self::Binary(_) => None,
        }
    }
}

impl Serialize for ImageSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Url(s) => serializer.serialize_str(s),
            Self::Binary(h) => serializer.serialize_str(&h.to_data_uri()),
        }
    }
}

impl<'de> Deserialize<'de> for ImageSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::Url)
    }
}

impl Node {
    /// Discriminant name as it appears in the serialized `type` field.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Container(_) => "container",
            Self::Text(_) => "text",
            Self::Image(_) => "image",
            Self::Extension(_) => "extension",
        }
    }

    /// Effective style, if any.
    pub fn style(&self) -> Option<&StyleRecord> {
        match self {
            Self::Container(n) => n.style.as_ref(),
            Self::Text(n) => n.style.as_ref(),
            Self::Image(n) => n.style.as_ref(),
            Self::Extension(n) => n.style.as_ref(),
        }
    }

    /// Children in source order; leaves have none.
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Container(n) => &n.children,
            Self::Extension(n) => &n.children,
            Self::Text(_) | Self::Image(_) => &[],
        }
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(Node::node_count).sum::<usize>()
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> RastreeResult<String> {
        serde_json::to_string(self).map_err(|e| RastreeError::serde(e.to_string()))
    }

    /// Parse a JSON string produced by [`Node::to_json`].
    pub fn from_json(s: &str) -> RastreeResult<Self> {
        serde_json::from_str(s).map_err(|e| RastreeError::serde(e.to_string()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/node/node.rs"]
mod tests;
