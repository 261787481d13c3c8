//! Deterministic technique scoring and selection for PromptForge.
//!
//! This crate implements the request-time selection pipeline:
//! - [`ComplexityEstimator`]: derives a 0-1 complexity score from raw text
//! - [`ScoringEngine`]: scores every catalog technique against a request
//! - [`Selector`]: confidence filter, ranking, and combination rules
//! - [`TechniqueSelector`]: the composed pipeline producing a
//!   [`SelectionResponse`]
//!
//! All components are pure functions over validated inputs plus immutable
//! injected configuration; nothing here can fail at request time except
//! request validation itself. Concurrent selections need no coordination.

pub mod complexity;
pub mod engine;
pub mod response;
pub mod selector;

pub use complexity::ComplexityEstimator;
pub use engine::ScoringEngine;
pub use selector::Selector;

use std::sync::Arc;

use promptforge_config::EnhancerConfig;
use promptforge_core::{Result, ScoredTechnique, SelectionRequest, SelectionResponse};

/// The composed selection pipeline: estimate, score, filter, combine,
/// assemble.
#[derive(Debug, Clone)]
pub struct TechniqueSelector {
    config: Arc<EnhancerConfig>,
    estimator: ComplexityEstimator,
    engine: ScoringEngine,
    selector: Selector,
}

impl TechniqueSelector {
    /// Wires the pipeline from validated configuration.
    ///
    /// The catalog, rules, and incompatibility table are shared immutably;
    /// the selector is cheap to clone and safe to use from many threads.
    pub fn new(config: Arc<EnhancerConfig>) -> Self {
        let rules = Arc::new(config.selection.clone());
        let incompatibility = Arc::new(config.incompatibility_table());
        Self {
            estimator: ComplexityEstimator::new(config.estimator.clone()),
            engine: ScoringEngine::new(Arc::clone(&rules)),
            selector: Selector::new(rules, incompatibility),
            config,
        }
    }

    /// Runs one selection.
    ///
    /// # Errors
    ///
    /// Returns [`promptforge_core::PromptForgeError::InvalidRequest`] when
    /// the request fails validation; selection itself cannot fail.
    pub fn select(&self, request: &SelectionRequest) -> Result<SelectionResponse> {
        request.validate()?;

        let complexity = if request.complexity > 0.0 {
            request.complexity
        } else {
            let estimated = self.estimator.estimate(&request.text);
            tracing::debug!(complexity = estimated, "estimated request complexity");
            estimated
        };

        let scored: Vec<ScoredTechnique> = self
            .config
            .techniques
            .iter()
            .map(|t| self.engine.score(t, request, complexity))
            .collect();
        let techniques_evaluated = scored.len();

        let selected = self.selector.select(scored, request.max_techniques);
        tracing::debug!(
            selected = selected.len(),
            evaluated = techniques_evaluated,
            intent = %request.intent,
            "technique selection complete"
        );

        Ok(response::assemble(
            selected,
            &request.intent,
            complexity,
            request.word_count(),
            techniques_evaluated,
        ))
    }

    /// The catalog this selector was built over.
    pub fn config(&self) -> &EnhancerConfig {
        &self.config
    }
}
