//! Selection request and response types.

use serde::{Deserialize, Serialize};

use crate::error::{PromptForgeError, Result};
use crate::technique::ScoredTechnique;

/// Per-call input to the selection pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SelectionRequest {
    /// The raw prompt text to enhance.
    pub text: String,
    /// Caller-declared or upstream-classified intent; empty allowed.
    #[serde(default)]
    pub intent: String,
    /// Task complexity in [0, 1]; 0 or unset triggers estimation.
    #[serde(default)]
    pub complexity: f64,
    /// Per-request override of the configured technique cap.
    #[serde(default)]
    pub max_techniques: Option<usize>,
}

impl SelectionRequest {
    /// Creates a request with only text set.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = intent.into();
        self
    }

    pub fn with_complexity(mut self, complexity: f64) -> Self {
        self.complexity = complexity;
        self
    }

    pub fn with_max_techniques(mut self, max: usize) -> Self {
        self.max_techniques = Some(max);
        self
    }

    /// Rejects requests that cannot be scored.
    ///
    /// # Errors
    ///
    /// Returns [`PromptForgeError::InvalidRequest`] when the text is empty
    /// or whitespace-only, or when a supplied complexity is outside [0, 1].
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(PromptForgeError::InvalidRequest(
                "text must not be empty".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.complexity) {
            return Err(PromptForgeError::InvalidRequest(format!(
                "complexity must be in [0, 1], got {}",
                self.complexity
            )));
        }
        Ok(())
    }

    /// Number of whitespace-separated words in the text.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Result of one selection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SelectionResponse {
    /// Ordered techniques that survived filtering and combination rules.
    pub techniques: Vec<ScoredTechnique>,
    /// Id of the first (highest-scoring) entry, or empty when none.
    pub primary_technique: String,
    /// Score-weighted aggregate confidence.
    pub confidence: f64,
    /// Narrative summary of the selection decision.
    pub reasoning: String,
    /// Diagnostic facts about the run.
    pub metadata: SelectionMetadata,
}

/// Diagnostic metadata attached to every selection response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SelectionMetadata {
    /// Complexity actually used (supplied or estimated).
    pub complexity: f64,
    /// Intent the request carried.
    pub intent: String,
    /// Word count of the request text.
    pub word_count: usize,
    /// Number of catalog techniques evaluated.
    pub techniques_evaluated: usize,
}
