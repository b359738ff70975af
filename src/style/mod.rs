//! Effective style resolution.
//!
//! Three layers are merged per node, lowest precedence first:
//! 1. the element kind's preset ([`presets::preset_for`])
//! 2. utility classes, left to right ([`classes::declarations_for`])
//! 3. the inline style record

pub(crate) mod classes;
pub(crate) mod presets;

use std::collections::HashMap;

use crate::{component::kind::ElementKind, node::style::StyleRecord};

/// Merges presets, utility classes and inline styles into one effective record.
///
/// Custom classes registered with [`StyleResolver::with_class`] shadow built-in tokens of the
/// same name.
#[derive(Clone, Debug, Default)]
pub struct StyleResolver {
    custom_classes: HashMap<String, StyleRecord>,
}

impl StyleResolver {
    /// Resolver with only the built-in class table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a custom utility class.
    pub fn with_class(mut self, token: impl Into<String>, declarations: StyleRecord) -> Self {
        self.custom_classes.insert(token.into(), declarations);
        self
    }

    /// Declarations for one class token. Unknown tokens yield `None`.
    pub fn class(&self, token: &str) -> Option<StyleRecord> {
        self.custom_classes
            .get(token)
            .cloned()
            .or_else(|| classes::declarations_for(token))
    }

    /// Resolve the effective style for one node.
    ///
    /// Returns `None` when no layer sets any property; the IR never carries an empty record.
    pub fn resolve(
        &self,
        kind: &ElementKind,
        utility_classes: Option<&str>,
        inline: Option<&StyleRecord>,
    ) -> Option<StyleRecord> {
        let mut out = StyleRecord::new();

        if let Some(preset) = presets::preset_for(kind) {
            out.overlay(&preset);
        }

        for token in utility_classes.into_iter().flat_map(str::split_whitespace) {
            match self.class(token) {
                Some(decls) => out.overlay(&decls),
                None => tracing::trace!(token, "ignoring unknown utility class"),
            }
        }

        if let Some(inline) = inline {
            out.overlay(inline);
        }

        out.into_option()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/resolver.rs"]
mod tests;
