//! Component-tree input model.
//!
//! Trees use a React-JSON-like shape: bare strings are text, `{"type": "div", "props": {..}}`
//! is a host element and `{"component": "Card", "props": {..}}` expands through a
//! [`ComponentRegistry`].

pub(crate) mod kind;
pub(crate) mod sandbox;

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use crate::{foundation::error::RastreeResult, node::style::StyleRecord};

/// A node of the component tree handed to the compiler.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Element {
    /// Text content.
    Text(String),
    /// Reference to a registered component.
    Component(ComponentElement),
    /// Host element such as `div` or `img`.
    Host(HostElement),
}

/// Reference to a component by name plus its props.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ComponentElement {
    /// Registered component name.
    pub component: String,
    /// Props passed to the component.
    #[serde(default)]
    pub props: serde_json::Value,
}

/// Host element.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HostElement {
    /// Tag name (`div`, `h1`, `img`, or a registered extension).
    #[serde(rename = "type")]
    pub tag: String,
    /// Element props.
    #[serde(default)]
    pub props: HostProps,
}

/// Props understood by host elements.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostProps {
    /// Space separated utility classes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Inline style; always wins over presets and classes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleRecord>,
    /// Image source for `img`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Explicit image width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    /// Explicit image height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    /// Children in source order. A lone element or string stands for a one-child list.
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children: Vec<Element>,
    /// Remaining props, forwarded to extension nodes.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<Element>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum Children {
        Many(Vec<Element>),
        One(Element),
    }

    Ok(
        match <Option<Children> as serde::Deserialize>::deserialize(deserializer)? {
            None => Vec::new(),
            Some(Children::Many(children)) => children,
            Some(Children::One(child)) => vec![child],
        },
    )
}

impl Element {
    /// Text element.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Component reference.
    pub fn component(name: impl Into<String>, props: serde_json::Value) -> Self {
        Self::Component(ComponentElement {
            component: name.into(),
            props,
        })
    }

    /// Start building a host element.
    pub fn host(tag: impl Into<String>) -> HostElement {
        HostElement {
            tag: tag.into(),
            props: HostProps::default(),
        }
    }

    /// Nesting depth of this subtree (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        match self {
            Self::Host(h) => {
                1 + h
                    .props
                    .children
                    .iter()
                    .map(Element::depth)
                    .max()
                    .unwrap_or(0)
            }
            Self::Text(_) | Self::Component(_) => 1,
        }
    }

    /// Number of elements in this subtree.
    pub fn count(&self) -> usize {
        match self {
            Self::Host(h) => 1 + h.props.children.iter().map(Element::count).sum::<usize>(),
            Self::Text(_) | Self::Component(_) => 1,
        }
    }
}

impl HostElement {
    /// Set utility classes.
    pub fn class(mut self, classes: impl Into<String>) -> Self {
        self.props.class_name = Some(classes.into());
        self
    }

    /// Set the inline style.
    pub fn style(mut self, style: StyleRecord) -> Self {
        self.props.style = Some(style);
        self
    }

    /// Set the image source.
    pub fn src(mut self, src: impl Into<String>) -> Self {
        self.props.src = Some(src.into());
        self
    }

    /// Set explicit image dimensions.
    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.props.width = Some(width);
        self.props.height = Some(height);
        self
    }

    /// Set an extra prop.
    pub fn prop(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.props.extra.insert(key.into(), value);
        self
    }

    /// Append a child.
    pub fn child(mut self, child: impl Into<Element>) -> Self {
        self.props.children.push(child.into());
        self
    }

    /// Append several children.
    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.props.children.extend(children);
        self
    }
}

impl From<HostElement> for Element {
    fn from(value: HostElement) -> Self {
        Self::Host(value)
    }
}

impl From<&str> for Element {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A function component: props in, element tree out.
pub trait Component: Send + Sync {
    /// Expand this component.
    fn render(&self, props: &serde_json::Value) -> RastreeResult<Element>;
}

impl<F> Component for F
where
    F: Fn(&serde_json::Value) -> RastreeResult<Element> + Send + Sync,
{
    fn render(&self, props: &serde_json::Value) -> RastreeResult<Element> {
        self(props)
    }
}

/// Named components and extension element kinds known to a compiler.
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    components: HashMap<String, Arc<dyn Component>>,
    extensions: HashSet<String>,
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.components.keys().collect();
        names.sort();
        f.debug_struct("ComponentRegistry")
            .field("components", &names)
            .field("extensions", &self.extensions)
            .finish()
    }
}

impl ComponentRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component under `name`.
    pub fn register(mut self, name: impl Into<String>, component: impl Component + 'static) -> Self {
        self.components.insert(name.into(), Arc::new(component));
        self
    }

    /// Register an extension element kind.
    pub fn register_extension(mut self, name: impl Into<String>) -> Self {
        self.extensions.insert(name.into());
        self
    }

    /// Lookup a component.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Component>> {
        self.components.get(name)
    }

    /// Registered extension kinds.
    pub fn extensions(&self) -> &HashSet<String> {
        &self.extensions
    }
}

#[cfg(test)]
#[path = "../../tests/unit/component/element.rs"]
mod tests;
