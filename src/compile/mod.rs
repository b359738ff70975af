//! Component tree -> node IR compiler.
//!
//! The walk is depth-first. Sibling subtrees are compiled concurrently so their image fetches
//! overlap, and children are reassembled in source order once every sibling has settled.

pub(crate) mod assets;

use std::{
    collections::HashSet,
    sync::{Arc, RwLock},
};

use futures::{
    FutureExt as _,
    future::{BoxFuture, try_join_all},
};

use crate::{
    component::{
        ComponentRegistry, Element, HostElement,
        kind::{ElementKind, NodeCategory},
    },
    foundation::error::{RastreeError, RastreeResult},
    node::{ContainerNode, ExtensionNode, ImageNode, ImageSource, Node, TextNode},
    style::StyleResolver,
};
use assets::{AssetFetcher, ImageMode, NoFetch};

const DEFAULT_MAX_EXPANSIONS: usize = 64;

/// Compiles [`Element`] trees into [`Node`] trees.
#[derive(Clone)]
pub struct Compiler {
    resolver: StyleResolver,
    registry: ComponentRegistry,
    fetcher: Arc<dyn AssetFetcher>,
    image_mode: Option<ImageMode>,
    persistent_keys: Arc<RwLock<HashSet<String>>>,
    max_expansions: usize,
}

impl std::fmt::Debug for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiler")
            .field("registry", &self.registry)
            .field("image_mode", &self.image_mode)
            .field("persistent_keys", &self.persistent_keys)
            .field("max_expansions", &self.max_expansions)
            .finish_non_exhaustive()
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    /// Compiler with built-in styles, no components, and no asset fetcher.
    pub fn new() -> Self {
        Self {
            resolver: StyleResolver::new(),
            registry: ComponentRegistry::new(),
            fetcher: Arc::new(NoFetch),
            image_mode: None,
            persistent_keys: Arc::default(),
            max_expansions: DEFAULT_MAX_EXPANSIONS,
        }
    }

    /// Replace the style resolver.
    pub fn with_resolver(mut self, resolver: StyleResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replace the component registry.
    pub fn with_registry(mut self, registry: ComponentRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the asset fetcher.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn AssetFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Pin the image mode instead of following the backend's preference.
    pub fn with_image_mode(mut self, mode: ImageMode) -> Self {
        self.image_mode = Some(mode);
        self
    }

    /// Treat `src` as a persistent image key the engine already holds; it is never fetched.
    pub fn with_persistent_key(self, src: impl Into<String>) -> Self {
        self.add_persistent_key(src);
        self
    }

    /// Register a persistent image key after construction. Clones of this compiler share keys.
    pub fn add_persistent_key(&self, src: impl Into<String>) {
        if let Ok(mut keys) = self.persistent_keys.write() {
            keys.insert(src.into());
        }
    }

    fn is_persistent(&self, src: &str) -> bool {
        self.persistent_keys
            .read()
            .map(|keys| keys.contains(src))
            .unwrap_or(false)
    }

    /// Bound on nested component expansions.
    pub fn with_max_expansions(mut self, max: usize) -> Self {
        self.max_expansions = max;
        self
    }

    /// Image mode pinned on this compiler, if any.
    pub fn image_mode(&self) -> Option<ImageMode> {
        self.image_mode
    }

    /// Compile `tree` using the pinned image mode (prefetch when unset).
    pub async fn compile(&self, tree: &Element) -> RastreeResult<Node> {
        self.compile_with_mode(tree, self.image_mode.unwrap_or_default())
            .await
    }

    /// Compile `tree`, carrying images as `mode` dictates.
    ///
    /// Fails as a whole on the first error; no partial tree is returned.
    #[tracing::instrument(skip(self, tree), fields(elements = tree.count()))]
    pub async fn compile_with_mode(&self, tree: &Element, mode: ImageMode) -> RastreeResult<Node> {
        let node = self.compile_element(tree, mode, 0).await?;
        tracing::debug!(nodes = node.node_count(), "compiled component tree");
        Ok(node)
    }

    fn compile_element<'a>(
        &'a self,
        element: &'a Element,
        mode: ImageMode,
        expansions: usize,
    ) -> BoxFuture<'a, RastreeResult<Node>> {
        async move {
            match element {
                Element::Text(text) => Ok(Node::Text(TextNode {
                    style: None,
                    text: text.clone(),
                })),
                Element::Component(c) => {
                    if expansions >= self.max_expansions {
                        return Err(RastreeError::compile_with_cause(
                            format!("component '{}' expands too deeply", c.component),
                            format!("more than {} nested expansions", self.max_expansions),
                        ));
                    }
                    let component = self.registry.get(&c.component).ok_or_else(|| {
                        RastreeError::compile_with_cause(
                            format!("component '{}' has no usable export", c.component),
                            "component is not registered",
                        )
                    })?;
                    let expanded = component.render(&c.props).map_err(|e| {
                        RastreeError::compile_with_cause(
                            format!("component '{}' failed to render", c.component),
                            e,
                        )
                    })?;
                    self.compile_element(&expanded, mode, expansions + 1).await
                }
                Element::Host(host) => self.compile_host(host, mode, expansions).await,
            }
        }
        .boxed()
    }

    async fn compile_host(
        &self,
        host: &HostElement,
        mode: ImageMode,
        expansions: usize,
    ) -> RastreeResult<Node> {
        let kind = ElementKind::from_tag(&host.tag, self.registry.extensions()).ok_or_else(|| {
            RastreeError::compile(format!("unknown element kind '{}'", host.tag))
        })?;
        let props = &host.props;
        let style = self.resolver.resolve(
            &kind,
            props.class_name.as_deref(),
            props.style.as_ref(),
        );

        match kind.category() {
            NodeCategory::Image => {
                if !props.children.is_empty() {
                    return Err(RastreeError::compile("img elements cannot have children"));
                }
                let src = props
                    .src
                    .as_deref()
                    .ok_or_else(|| RastreeError::compile("img element is missing 'src'"))?;
                let src = if self.is_persistent(src) {
                    ImageSource::Url(src.to_string())
                } else {
                    assets::resolve_image(src, mode, self.fetcher.as_ref())
                        .await
                        .map_err(|e| {
                            RastreeError::compile_with_cause(
                                format!("failed to resolve image '{}'", truncate(src)),
                                e,
                            )
                        })?
                };
                Ok(Node::Image(ImageNode {
                    style,
                    src,
                    width: props.width,
                    height: props.height,
                }))
            }
            NodeCategory::LineBreak => Ok(Node::Text(TextNode {
                style,
                text: "\n".to_string(),
            })),
            NodeCategory::Text if props.children.iter().all(|c| matches!(c, Element::Text(_))) => {
                let text = props
                    .children
                    .iter()
                    .filter_map(|c| match c {
                        Element::Text(t) => Some(t.as_str()),
                        _ => None,
                    })
                    .collect::<String>();
                Ok(Node::Text(TextNode { style, text }))
            }
            NodeCategory::Text | NodeCategory::Container => {
                let children = self.compile_children(&props.children, mode, expansions).await?;
                Ok(Node::Container(ContainerNode { style, children }))
            }
            NodeCategory::Extension => {
                let children = self.compile_children(&props.children, mode, expansions).await?;
                Ok(Node::Extension(ExtensionNode {
                    kind: kind.tag().to_string(),
                    style,
                    children,
                    props: props.extra.clone(),
                }))
            }
        }
    }

    async fn compile_children(
        &self,
        children: &[Element],
        mode: ImageMode,
        expansions: usize,
    ) -> RastreeResult<Vec<Node>> {
        try_join_all(
            children
                .iter()
                .map(|child| self.compile_element(child, mode, expansions)),
        )
        .await
    }
}

fn truncate(src: &str) -> &str {
    const MAX: usize = 64;
    if src.len() <= MAX {
        return src;
    }
    let mut end = MAX;
    while !src.is_char_boundary(end) {
        end -= 1;
    }
    &src[..end]
}

#[cfg(test)]
#[path = "../../tests/unit/compile/compiler.rs"]
mod tests;
