//! Filtering, ranking, and combination of scored techniques.

use std::sync::Arc;

use promptforge_config::{IncompatibilityTable, SelectionRules};
use promptforge_core::ScoredTechnique;

/// Applies the confidence filter, score ranking, and pairwise combination
/// rules to a scored catalog.
#[derive(Debug, Clone)]
pub struct Selector {
    rules: Arc<SelectionRules>,
    incompatibility: Arc<IncompatibilityTable>,
}

impl Selector {
    /// Creates a selector over injected rules and the immutable
    /// incompatibility table.
    pub fn new(rules: Arc<SelectionRules>, incompatibility: Arc<IncompatibilityTable>) -> Self {
        Self {
            rules,
            incompatibility,
        }
    }

    /// Produces the ordered technique list for one request.
    ///
    /// Drops entries below the minimum confidence, sorts the survivors by
    /// score descending (the sort is stable, so score ties keep catalog
    /// order — that is the documented tie-break policy), then walks the
    /// ranking greedily: the top survivor is always kept, and each later
    /// candidate is dropped iff it is incompatible with any technique
    /// already accepted. Finally truncates to the technique cap.
    ///
    /// Greedy score-priority independent-set selection: deterministic and
    /// O(n^2) over a small n, not globally optimal.
    pub fn select(
        &self,
        scored: Vec<ScoredTechnique>,
        max_override: Option<usize>,
    ) -> Vec<ScoredTechnique> {
        let mut survivors: Vec<ScoredTechnique> = scored
            .into_iter()
            .filter(|s| s.confidence >= self.rules.min_confidence)
            .collect();
        survivors.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut accepted: Vec<ScoredTechnique> = Vec::new();
        for candidate in survivors {
            let blocked = accepted
                .iter()
                .any(|kept| self.incompatibility.incompatible(&kept.id, &candidate.id));
            if blocked {
                tracing::debug!(
                    technique = %candidate.id,
                    score = candidate.score,
                    "dropped by combination rules"
                );
                continue;
            }
            accepted.push(candidate);
        }

        let cap = max_override.unwrap_or(self.rules.max_techniques);
        accepted.truncate(cap);
        accepted
    }
}
