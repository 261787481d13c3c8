//! The chain executor.
//!
//! Applies an ordered technique list to a text one stage at a time,
//! threading a [`ChainContext`] through the run. The technique-invocation
//! boundary is the one place in the core that can fail at request time, so
//! it is defensively isolated: a failing or timed-out transform is recorded
//! and the run continues (best-effort compound enhancement, not
//! all-or-nothing), unless the fail-fast policy is configured.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use promptforge_core::{
    ChainContext, ChainSummary, ContextMap, PromptForgeError, Result, ScoredTechnique,
};

use crate::techniques::TemplateTransform;
use crate::transform::{TechniqueRegistry, TechniqueTransform, TransformOutput};

/// Run state, advanced once per selected technique.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChainState {
    Idle,
    Running(usize),
    Complete,
    Failed,
}

/// Enhanced text plus the structured execution summary.
#[derive(Debug, Clone)]
pub struct ChainOutcome {
    pub text: String,
    pub summary: ChainSummary,
}

/// Executes technique chains.
///
/// Stateless across runs: every run builds a fresh [`ChainContext`], so
/// concurrent runs need no coordination. The registry is shared read-only.
#[derive(Debug, Clone)]
pub struct ChainExecutor {
    registry: Arc<TechniqueRegistry>,
    technique_timeout: Option<Duration>,
    fail_fast: bool,
}

impl ChainExecutor {
    /// Creates an executor with no custom transforms, no timeout, and the
    /// default continue-on-error policy.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(TechniqueRegistry::new()),
            technique_timeout: None,
            fail_fast: false,
        }
    }

    /// Uses custom transforms for techniques registered in `registry`;
    /// unregistered techniques fall back to template filling.
    pub fn with_registry(mut self, registry: Arc<TechniqueRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Applies a wall-clock timeout to every transform invocation. A
    /// timed-out transform is a technique-level failure; its worker thread
    /// is not killed, its result is discarded.
    pub fn with_technique_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.technique_timeout = timeout;
        self
    }

    /// Aborts the run on the first technique failure instead of
    /// continuing.
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Runs the chain.
    ///
    /// Zero techniques is a no-op: the outcome text equals the input and
    /// the summary is empty. A technique-level failure leaves the current
    /// text at the prior stage's output and the run continues.
    ///
    /// # Errors
    ///
    /// Only under the fail-fast policy: [`PromptForgeError::ChainFailed`]
    /// naming the technique that failed.
    pub fn run(
        &self,
        techniques: &[ScoredTechnique],
        original_text: &str,
        base_context: ContextMap,
    ) -> Result<ChainOutcome> {
        let mut context = ChainContext::new(original_text, base_context);
        let mut state = ChainState::Idle;
        tracing::trace!(?state, techniques = techniques.len(), "chain run created");

        for (position, technique) in techniques.iter().enumerate() {
            state = ChainState::Running(position);
            tracing::trace!(?state, technique = %technique.id, "chain step");
            let effective = context.effective_context(position);
            let transform = self.transform_for(technique);
            let started = Instant::now();

            let result = self.invoke(&technique.id, transform, context.current_text(), effective);
            let elapsed = started.elapsed();

            match result {
                Ok(output) => {
                    tracing::debug!(
                        technique = %technique.id,
                        position,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "technique applied"
                    );
                    if output.text == context.current_text() {
                        context.push_warning(format!(
                            "technique '{}' left the text unchanged",
                            technique.id
                        ));
                    }
                    context.record_success(
                        &technique.id,
                        output.text,
                        elapsed,
                        output.metadata,
                        output.context_updates,
                    );
                }
                Err(err) => {
                    tracing::warn!(
                        technique = %technique.id,
                        position,
                        error = %err,
                        "technique failed; continuing chain"
                    );
                    context.record_failure(&technique.id, err.to_string());
                    if self.fail_fast {
                        state = ChainState::Failed;
                        tracing::trace!(?state, "chain run aborted");
                        return Err(PromptForgeError::ChainFailed(technique.id.clone()));
                    }
                }
            }
        }

        state = ChainState::Complete;
        tracing::trace!(?state, applied = context.applied_techniques().len(), "chain run finished");

        let (text, summary) = context.into_summary();
        Ok(ChainOutcome { text, summary })
    }

    /// Resolves the transform for a technique: registry entry if present,
    /// otherwise template filling over the catalog template.
    fn transform_for(&self, technique: &ScoredTechnique) -> Arc<dyn TechniqueTransform> {
        self.registry
            .get(&technique.id)
            .unwrap_or_else(|| Arc::new(TemplateTransform::new(technique.template.clone())))
    }

    /// Invokes one transform, enforcing the configured timeout.
    fn invoke(
        &self,
        id: &str,
        transform: Arc<dyn TechniqueTransform>,
        text: &str,
        context: ContextMap,
    ) -> Result<TransformOutput> {
        match self.technique_timeout {
            None => transform.apply(text, &context),
            Some(timeout) => {
                let (tx, rx) = mpsc::channel();
                let text = text.to_string();
                thread::spawn(move || {
                    let result = transform.apply(&text, &context);
                    // The receiver may have given up; nothing to do then.
                    let _ = tx.send(result);
                });
                match rx.recv_timeout(timeout) {
                    Ok(result) => result,
                    Err(_) => Err(PromptForgeError::TechniqueTimeout(id.to_string())),
                }
            }
        }
    }
}

impl Default for ChainExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
