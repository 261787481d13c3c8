//! The technique scoring engine.
//!
//! A data-driven interpreter over [`Conditions`]: every rule reads
//! declarative catalog data, so new techniques require only new config
//! rows, never new code branches. Scoring is a pure function of
//! (technique, request, complexity) plus the injected selection rules, and
//! identical inputs always produce bit-identical score, confidence, and
//! reasoning text.

use std::fmt::Write;
use std::sync::Arc;

use promptforge_config::SelectionRules;
use promptforge_core::{Conditions, ScoredTechnique, SelectionRequest, Technique};

/// Bonus for an explicit intent match (rule 1).
const INTENT_MATCH_BONUS: f64 = 30.0;
/// Bonus for clearing a minimum-complexity threshold (rule 2).
const COMPLEXITY_MIN_BONUS: f64 = 20.0;
/// Bonus for staying under a maximum-complexity ceiling (rule 3).
const COMPLEXITY_MAX_BONUS: f64 = 10.0;
/// Per-hit keyword weight and its cap (rule 4).
const KEYWORD_HIT_WEIGHT: f64 = 5.0;
const KEYWORD_CAP: f64 = 15.0;
/// Per-hit multi-step indicator weight, uncapped (rule 5).
const MULTI_STEP_WEIGHT: f64 = 10.0;
/// Boolean condition-flag bonuses (rule 6).
const EXPLORATION_BONUS: f64 = 15.0;
const PATTERN_BONUS: f64 = 15.0;
const ACCURACY_BONUS: f64 = 20.0;
const SIMPLE_REQUEST_BONUS: f64 = 10.0;
/// Intent-boost multiplier (rule 7).
const BOOST_MULTIPLIER: f64 = 10.0;
/// Score-to-confidence divisor (rule 9).
const CONFIDENCE_DIVISOR: f64 = 100.0;

/// Fixed text patterns paired with the boolean condition flags.
const EXPLORATION_PATTERNS: &[&str] = &["explore", "alternative", "options", "brainstorm", "what if"];
const PATTERN_PATTERNS: &[&str] = &["similar", "like this", "example", "pattern", "format"];
const ACCURACY_PATTERNS: &[&str] = &["accurate", "verify", "precise", "correct", "exact"];

/// Word-count ceiling for the simple-request pattern.
const SIMPLE_REQUEST_MAX_WORDS: usize = 15;

/// Scores techniques against a request.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    rules: Arc<SelectionRules>,
}

impl ScoringEngine {
    /// Creates an engine over the injected selection rules.
    pub fn new(rules: Arc<SelectionRules>) -> Self {
        Self { rules }
    }

    /// Scores one technique.
    ///
    /// Hard conditions (rules 1-3) short-circuit: an unmet condition
    /// returns a zero-score entry with empty reasoning, skipping all later
    /// additions. Contributing rules append reasoning fragments in
    /// evaluation order.
    pub fn score(
        &self,
        technique: &Technique,
        request: &SelectionRequest,
        complexity: f64,
    ) -> ScoredTechnique {
        let conditions = &technique.conditions;
        let lower = request.text.to_lowercase();
        let mut score = 0.0;
        let mut reasoning = String::new();

        // Rule 1: intent membership.
        if !conditions.intents.is_empty() {
            if !conditions.intents.iter().any(|i| i == &request.intent) {
                return ScoredTechnique::rejected(technique);
            }
            score += INTENT_MATCH_BONUS;
            push_fragment(
                &mut reasoning,
                &format!("matches intent '{}' (+{INTENT_MATCH_BONUS:.0})", request.intent),
            );
        }

        // Rule 2: minimum complexity.
        if let Some(threshold) = conditions.complexity_threshold {
            if complexity < threshold {
                return ScoredTechnique::rejected(technique);
            }
            score += COMPLEXITY_MIN_BONUS;
            push_fragment(
                &mut reasoning,
                &format!(
                    "complexity {complexity:.2} meets threshold {threshold:.2} (+{COMPLEXITY_MIN_BONUS:.0})"
                ),
            );
        }

        // Rule 3: maximum complexity.
        if let Some(ceiling) = conditions.complexity_threshold_max {
            if complexity > ceiling {
                return ScoredTechnique::rejected(technique);
            }
            score += COMPLEXITY_MAX_BONUS;
            push_fragment(
                &mut reasoning,
                &format!(
                    "complexity {complexity:.2} within ceiling {ceiling:.2} (+{COMPLEXITY_MAX_BONUS:.0})"
                ),
            );
        }

        // Rule 4: keyword hits, capped.
        let keyword_hits = count_hits(&lower, &conditions.keywords);
        if keyword_hits > 0 {
            let contribution = (keyword_hits as f64 * KEYWORD_HIT_WEIGHT).min(KEYWORD_CAP);
            score += contribution;
            push_fragment(
                &mut reasoning,
                &format!("{keyword_hits} keyword match(es) (+{contribution:.0})"),
            );
        }

        // Rule 5: multi-step indicators, uncapped.
        let step_hits = count_hits(&lower, &conditions.multi_step_indicators);
        if step_hits > 0 {
            let contribution = step_hits as f64 * MULTI_STEP_WEIGHT;
            score += contribution;
            push_fragment(
                &mut reasoning,
                &format!("{step_hits} multi-step indicator(s) (+{contribution:.0})"),
            );
        }

        // Rule 6: boolean condition flags with paired text patterns.
        score += self.flag_bonuses(conditions, &lower, &mut reasoning);

        // Rule 7: configured intent boost.
        let boost = self.rules.boost(&request.intent, &technique.id);
        if boost != 0.0 {
            let contribution = boost * BOOST_MULTIPLIER;
            score += contribution;
            push_fragment(
                &mut reasoning,
                &format!(
                    "intent boost for '{}' ({contribution:+.0})",
                    request.intent
                ),
            );
        }

        // Rule 8: static priority.
        if technique.priority != 0 {
            score += f64::from(technique.priority);
            push_fragment(
                &mut reasoning,
                &format!("base priority ({:+})", technique.priority),
            );
        }

        // Rule 9: normalize.
        let confidence = (score / CONFIDENCE_DIVISOR).min(1.0);
        ScoredTechnique::from_technique(technique, score, confidence, reasoning)
    }

    fn flag_bonuses(&self, conditions: &Conditions, lower: &str, reasoning: &mut String) -> f64 {
        let mut total = 0.0;
        if conditions.requires_exploration && matches_any(lower, EXPLORATION_PATTERNS) {
            total += EXPLORATION_BONUS;
            push_fragment(
                reasoning,
                &format!("exploration request detected (+{EXPLORATION_BONUS:.0})"),
            );
        }
        if conditions.requires_pattern && matches_any(lower, PATTERN_PATTERNS) {
            total += PATTERN_BONUS;
            push_fragment(
                reasoning,
                &format!("pattern/example request detected (+{PATTERN_BONUS:.0})"),
            );
        }
        if conditions.requires_accuracy && matches_any(lower, ACCURACY_PATTERNS) {
            total += ACCURACY_BONUS;
            push_fragment(
                reasoning,
                &format!("accuracy request detected (+{ACCURACY_BONUS:.0})"),
            );
        }
        if conditions.simple_request && is_simple_request(lower) {
            total += SIMPLE_REQUEST_BONUS;
            push_fragment(
                reasoning,
                &format!("simple request detected (+{SIMPLE_REQUEST_BONUS:.0})"),
            );
        }
        total
    }
}

/// Case-insensitive substring hit count over a term list. The input text is
/// lowercased once by the caller.
fn count_hits(lower: &str, terms: &[String]) -> usize {
    terms
        .iter()
        .filter(|term| lower.contains(term.to_lowercase().as_str()))
        .count()
}

fn matches_any(lower: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| lower.contains(p))
}

/// A short single-part request: few words, at most one question mark, no
/// explicit conjunction.
fn is_simple_request(lower: &str) -> bool {
    lower.split_whitespace().count() <= SIMPLE_REQUEST_MAX_WORDS
        && lower.matches('?').count() <= 1
        && !lower.contains(" and ")
}

fn push_fragment(reasoning: &mut String, fragment: &str) {
    if !reasoning.is_empty() {
        reasoning.push_str("; ");
    }
    let _ = write!(reasoning, "{fragment}");
}
