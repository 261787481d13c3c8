//! Selection response assembly.

use std::fmt::Write;

use promptforge_core::{ScoredTechnique, SelectionMetadata, SelectionResponse};

/// Builds the final response from the selected techniques.
///
/// Aggregate confidence is the score-weighted average of each selected
/// technique's confidence, or 0 when nothing was selected or the total
/// score is 0.
pub fn assemble(
    selected: Vec<ScoredTechnique>,
    intent: &str,
    complexity: f64,
    word_count: usize,
    techniques_evaluated: usize,
) -> SelectionResponse {
    let confidence = weighted_confidence(&selected);
    let reasoning = narrative(&selected, intent, complexity);
    let primary_technique = selected.first().map(|t| t.id.clone()).unwrap_or_default();
    SelectionResponse {
        techniques: selected,
        primary_technique,
        confidence,
        reasoning,
        metadata: SelectionMetadata {
            complexity,
            intent: intent.to_string(),
            word_count,
            techniques_evaluated,
        },
    }
}

fn weighted_confidence(selected: &[ScoredTechnique]) -> f64 {
    let total_score: f64 = selected.iter().map(|t| t.score).sum();
    if total_score == 0.0 {
        return 0.0;
    }
    selected
        .iter()
        .map(|t| t.confidence * t.score)
        .sum::<f64>()
        / total_score
}

fn narrative(selected: &[ScoredTechnique], intent: &str, complexity: f64) -> String {
    let intent_label = if intent.is_empty() { "unspecified" } else { intent };
    let mut out = format!("Intent '{intent_label}' with complexity {complexity:.2}.");
    match selected {
        [] => {
            out.push_str(" No techniques met the selection criteria.");
        }
        [only] => {
            let _ = write!(out, " Selected '{}': {}.", only.name, only.reasoning);
        }
        [primary, ..] => {
            let names: Vec<&str> = selected.iter().map(|t| t.name.as_str()).collect();
            let _ = write!(
                out,
                " Selected {} techniques: {}. Primary '{}': {}.",
                selected.len(),
                names.join(", "),
                primary.name,
                primary.reasoning
            );
        }
    }
    out
}
