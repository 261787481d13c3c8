//! The technique transform capability interface and registry.

use std::collections::HashMap;
use std::sync::Arc;

use promptforge_core::{ContextMap, Result};

/// Output of one technique application.
#[derive(Debug, Clone, Default)]
pub struct TransformOutput {
    /// The transformed text; becomes the chain's current text.
    pub text: String,
    /// Opaque facts the technique reports about its own run.
    pub metadata: ContextMap,
    /// Key/value updates published to later stages. The executor
    /// namespaces keys as `<technique_id>_<key>` before merging.
    pub context_updates: ContextMap,
}

impl TransformOutput {
    /// Plain text output with no metadata or context updates.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// One prompt-transformation strategy.
///
/// Concrete techniques are interchangeable implementations registered into
/// the catalog by id — flat polymorphism over one interface. Every call is
/// treated as a fallible boundary by the executor; implementations must be
/// CPU-bound or honor the configured per-technique timeout.
pub trait TechniqueTransform: Send + Sync {
    /// Applies the technique to `text` given the effective chain context.
    fn apply(&self, text: &str, context: &ContextMap) -> Result<TransformOutput>;
}

/// Immutable id -> transform lookup, shared across runs.
#[derive(Default, Clone)]
pub struct TechniqueRegistry {
    transforms: HashMap<String, Arc<dyn TechniqueTransform>>,
}

impl TechniqueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a transform under a technique id, replacing any previous
    /// registration for that id.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        transform: Arc<dyn TechniqueTransform>,
    ) -> &mut Self {
        self.transforms.insert(id.into(), transform);
        self
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn TechniqueTransform>> {
        self.transforms.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.transforms.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

impl std::fmt::Debug for TechniqueRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<&str> = self.transforms.keys().map(String::as_str).collect();
        ids.sort_unstable();
        f.debug_struct("TechniqueRegistry").field("ids", &ids).finish()
    }
}
