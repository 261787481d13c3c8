//! Technique catalog entries and applicability conditions.

use serde::{Deserialize, Serialize};

use crate::context::ContextMap;

/// An immutable catalog entry describing one prompt-engineering technique.
///
/// Loaded once at process start from configuration and never mutated at
/// request time. The `template` and `parameters` fields are opaque to the
/// scoring core; they are consumed by the technique's transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Technique {
    /// Unique key identifying the technique.
    pub id: String,
    /// Display name.
    pub name: String,
    /// One-line description.
    #[serde(default)]
    pub description: String,
    /// Static base score added last during scoring.
    #[serde(default)]
    pub priority: i32,
    /// Rendering template, opaque to the selection core.
    #[serde(default)]
    pub template: String,
    /// Opaque per-technique configuration bag.
    #[serde(default)]
    pub parameters: ContextMap,
    /// Declarative applicability conditions.
    #[serde(default)]
    pub conditions: Conditions,
}

/// Declarative conditions controlling when a technique applies.
///
/// All text checks are case-insensitive substring matches. An empty
/// `intents` list matches any intent. The boolean flags each pair with a
/// fixed text-pattern check evaluated by the scoring engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Conditions {
    /// Intents this technique applies to; empty matches any.
    #[serde(default)]
    pub intents: Vec<String>,
    /// Minimum complexity required to qualify.
    #[serde(default)]
    pub complexity_threshold: Option<f64>,
    /// Maximum complexity allowed to qualify.
    #[serde(default)]
    pub complexity_threshold_max: Option<f64>,
    /// Substrings scored when present in the input text.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Substrings suggesting a multi-step request.
    #[serde(default)]
    pub multi_step_indicators: Vec<String>,
    /// Bonus when the text asks for exploration of alternatives.
    #[serde(default)]
    pub requires_exploration: bool,
    /// Bonus when the text asks for something pattern- or example-shaped.
    #[serde(default)]
    pub requires_pattern: bool,
    /// Bonus when the text asks for verified or precise output.
    #[serde(default)]
    pub requires_accuracy: bool,
    /// Bonus when the text looks like a short single-part request.
    #[serde(default)]
    pub simple_request: bool,
}

/// A technique together with its computed score for one request.
///
/// Ephemeral: produced by the scoring engine, consumed by the selector and
/// the chain executor, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScoredTechnique {
    pub id: String,
    pub name: String,
    pub description: String,
    pub template: String,
    pub parameters: ContextMap,
    pub priority: i32,
    /// Unbounded non-negative raw score.
    pub score: f64,
    /// Score normalized to [0, 1].
    pub confidence: f64,
    /// Ordered human-readable fragments for every rule that contributed.
    pub reasoning: String,
}

impl ScoredTechnique {
    /// Copies catalog fields from `technique` and attaches the computed
    /// score triple.
    pub fn from_technique(
        technique: &Technique,
        score: f64,
        confidence: f64,
        reasoning: String,
    ) -> Self {
        Self {
            id: technique.id.clone(),
            name: technique.name.clone(),
            description: technique.description.clone(),
            template: technique.template.clone(),
            parameters: technique.parameters.clone(),
            priority: technique.priority,
            score,
            confidence,
            reasoning,
        }
    }

    /// A rejected technique: zero score, zero confidence, no reasoning.
    pub fn rejected(technique: &Technique) -> Self {
        Self::from_technique(technique, 0.0, 0.0, String::new())
    }
}
