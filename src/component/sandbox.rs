//! Gate for untrusted component source.
//!
//! Source is a JSON module object mapping export names to element trees. Nothing is executed:
//! the module is parsed, bounded, and type-checked against the [`Element`] contract.

use crate::{
    component::Element,
    foundation::error::{RastreeError, RastreeResult},
};

/// Export evaluated when the caller does not name one.
pub const DEFAULT_EXPORT: &str = "default";

/// Bounds applied to untrusted source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SandboxLimits {
    /// Maximum source length in bytes.
    pub max_source_bytes: usize,
    /// Maximum element nesting depth.
    pub max_depth: usize,
    /// Maximum number of elements in the exported tree.
    pub max_elements: usize,
}

impl Default for SandboxLimits {
    fn default() -> Self {
        Self {
            max_source_bytes: 1024 * 1024,
            max_depth: 64,
            max_elements: 10_000,
        }
    }
}

/// Evaluates untrusted component modules into element trees.
#[derive(Clone, Debug, Default)]
pub struct Sandbox {
    limits: SandboxLimits,
}

impl Sandbox {
    /// Sandbox with custom limits.
    pub fn new(limits: SandboxLimits) -> Self {
        Self { limits }
    }

    /// Active limits.
    pub fn limits(&self) -> SandboxLimits {
        self.limits
    }

    /// Evaluate `source` and return the element tree bound to `export`.
    ///
    /// Every failure is a [`RastreeError::Compile`] carrying the underlying cause.
    pub fn evaluate(&self, source: &str, export: Option<&str>) -> RastreeResult<Element> {
        let export = export.unwrap_or(DEFAULT_EXPORT);

        if source.len() > self.limits.max_source_bytes {
            return Err(RastreeError::compile_with_cause(
                "component source rejected",
                format!(
                    "source is {} bytes, limit is {}",
                    source.len(),
                    self.limits.max_source_bytes
                ),
            ));
        }

        let mut module: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(source).map_err(|e| {
                RastreeError::compile_with_cause("component source is not a valid module", e)
            })?;

        let value = module.remove(export).ok_or_else(|| {
            let mut available: Vec<_> = module.keys().cloned().collect();
            available.sort();
            RastreeError::compile_with_cause(
                format!("module has no '{export}' component export"),
                format!("available exports: [{}]", available.join(", ")),
            )
        })?;

        let element: Element = serde_json::from_value(value).map_err(|e| {
            RastreeError::compile_with_cause(
                format!("export '{export}' is not a usable component"),
                e,
            )
        })?;

        let depth = element.depth();
        if depth > self.limits.max_depth {
            return Err(RastreeError::compile_with_cause(
                "component tree rejected",
                format!("depth {depth} exceeds limit {}", self.limits.max_depth),
            ));
        }
        let count = element.count();
        if count > self.limits.max_elements {
            return Err(RastreeError::compile_with_cause(
                "component tree rejected",
                format!(
                    "{count} elements exceed limit {}",
                    self.limits.max_elements
                ),
            ));
        }

        tracing::debug!(export, depth, count, "sandboxed component accepted");
        Ok(element)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/component/sandbox.rs"]
mod tests;
