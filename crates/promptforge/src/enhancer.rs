//! End-to-end enhancement: selection wired to chain execution.

use std::path::Path;
use std::sync::Arc;

use promptforge_chain::{ChainExecutor, TechniqueRegistry};
use promptforge_config::{ConfigError, EnhancerConfig};
use promptforge_core::{ChainSummary, ContextMap, Result, SelectionRequest, SelectionResponse};
use promptforge_scoring::TechniqueSelector;

/// Result of one end-to-end enhancement run.
#[derive(Debug, Clone)]
pub struct EnhanceOutcome {
    /// The selection decision, including per-technique reasoning.
    pub selection: SelectionResponse,
    /// The final transformed text.
    pub enhanced_text: String,
    /// Execution summary of the chain run.
    pub chain: ChainSummary,
}

/// The composed engine: selector plus chain executor over one validated
/// configuration.
///
/// Cheap to clone and safe to share across threads; every run is
/// self-contained.
#[derive(Debug, Clone)]
pub struct Enhancer {
    selector: TechniqueSelector,
    executor: ChainExecutor,
}

impl Enhancer {
    /// Loads and validates configuration from a TOML or YAML file, then
    /// wires the engine.
    ///
    /// # Errors
    ///
    /// Configuration errors are fatal and must prevent startup.
    pub fn from_config_path(path: impl AsRef<Path>) -> std::result::Result<Self, ConfigError> {
        Self::with_config(EnhancerConfig::load(path)?)
    }

    /// Wires the engine from an in-memory configuration, validating it
    /// first.
    pub fn with_config(config: EnhancerConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let config = Arc::new(config);
        let executor = ChainExecutor::new()
            .with_technique_timeout(config.selection.technique_timeout())
            .with_fail_fast(config.selection.fail_fast);
        tracing::info!(
            techniques = config.techniques.len(),
            max_techniques = config.selection.max_techniques,
            "enhancer initialized"
        );
        Ok(Self {
            selector: TechniqueSelector::new(config),
            executor,
        })
    }

    /// Registers custom technique transforms; techniques without a
    /// registered transform fall back to template filling.
    pub fn with_registry(mut self, registry: Arc<TechniqueRegistry>) -> Self {
        self.executor = self.executor.with_registry(registry);
        self
    }

    /// Runs selection only.
    pub fn select(&self, request: &SelectionRequest) -> Result<SelectionResponse> {
        self.selector.select(request)
    }

    /// Runs selection followed by chain execution.
    pub fn enhance(&self, request: &SelectionRequest) -> Result<EnhanceOutcome> {
        self.enhance_with_context(request, ContextMap::new())
    }

    /// Like [`enhance`](Self::enhance), with a caller-supplied base
    /// context visible to every technique transform.
    pub fn enhance_with_context(
        &self,
        request: &SelectionRequest,
        base_context: ContextMap,
    ) -> Result<EnhanceOutcome> {
        let selection = self.selector.select(request)?;
        let outcome = self
            .executor
            .run(&selection.techniques, &request.text, base_context)?;
        Ok(EnhanceOutcome {
            selection,
            enhanced_text: outcome.text,
            chain: outcome.summary,
        })
    }
}
