//! Text complexity estimation.
//!
//! Used when the caller does not supply a complexity score. Deterministic
//! and side-effect-free; all weights come from the injected
//! [`EstimatorConfig`]. No dependency on the technique catalog.

use promptforge_config::EstimatorConfig;

/// Derives a complexity score in [0, 1] from raw text.
#[derive(Debug, Clone)]
pub struct ComplexityEstimator {
    config: EstimatorConfig,
}

impl ComplexityEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    /// Estimates task complexity for `text`.
    ///
    /// Additive: a word-count bucket score, a fixed bonus for multi-part
    /// questions, and density-scaled contributions from the technical and
    /// abstract term lists, clamped to 1.0.
    pub fn estimate(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let word_count = text.split_whitespace().count();

        let mut score = self.bucket_score(word_count);

        if is_multi_part(&lower) {
            score += self.config.multi_part_bonus;
        }

        score += list_contribution(
            &lower,
            &self.config.technical_terms,
            self.config.technical_weight,
        );
        score += list_contribution(
            &lower,
            &self.config.abstract_terms,
            self.config.abstract_weight,
        );

        score.clamp(0.0, 1.0)
    }

    fn bucket_score(&self, word_count: usize) -> f64 {
        for bucket in &self.config.word_buckets {
            match bucket.max_words {
                Some(max) if word_count > max => continue,
                _ => return bucket.score,
            }
        }
        // All buckets bounded and exceeded; the last bucket acts as the
        // catch-all.
        self.config.word_buckets.last().map_or(0.0, |b| b.score)
    }
}

/// More than one question mark, or an explicit conjunction, suggests a
/// multi-part request.
fn is_multi_part(lower: &str) -> bool {
    lower.matches('?').count() > 1 || lower.contains(" and ")
}

/// Each list's total weight is divided evenly across its terms, so the
/// contribution scales with match density rather than raw match count.
fn list_contribution(lower: &str, terms: &[String], total_weight: f64) -> f64 {
    if terms.is_empty() {
        return 0.0;
    }
    let hits = terms
        .iter()
        .filter(|term| lower.contains(term.to_lowercase().as_str()))
        .count();
    total_weight * hits as f64 / terms.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator() -> ComplexityEstimator {
        ComplexityEstimator::new(EstimatorConfig::default())
    }

    #[test]
    fn short_plain_text_scores_low() {
        let score = estimator().estimate("What time is it?");
        assert!(score < 0.2, "got {score}");
    }

    #[test]
    fn estimation_is_deterministic() {
        let e = estimator();
        let text = "Design a database architecture and explain the trade-off?";
        assert_eq!(e.estimate(text), e.estimate(text));
    }

    #[test]
    fn multi_part_text_scores_higher() {
        let e = estimator();
        let single = e.estimate("How does this work?");
        let multi = e.estimate("How does this work? And why does it fail?");
        assert!(multi > single);
    }

    #[test]
    fn term_matches_raise_score() {
        let e = estimator();
        let plain = e.estimate("Tell me about cats in general terms please");
        let technical = e.estimate("Optimize the algorithm and refactor the api");
        assert!(technical > plain);
    }

    #[test]
    fn score_is_clamped_to_one() {
        // Long text stuffed with every term and multiple question marks.
        let mut text = String::new();
        for term in EstimatorConfig::default()
            .technical_terms
            .iter()
            .chain(EstimatorConfig::default().abstract_terms.iter())
        {
            text.push_str(term);
            text.push_str(" and ");
        }
        text.push_str(&"word ".repeat(60));
        text.push_str("?? ");
        let score = estimator().estimate(&text);
        assert!(score <= 1.0);
        assert!(score > 0.9);
    }

    #[test]
    fn word_bucket_boundaries() {
        let e = estimator();
        // 10 words falls in the first bucket, 11 in the second.
        let ten = "w ".repeat(10);
        let eleven = "w ".repeat(11);
        assert!(e.estimate(&eleven) > e.estimate(&ten));
    }

    #[test]
    fn empty_text_scores_first_bucket_only() {
        // No terms, no markers; only the smallest bucket contributes.
        assert_eq!(estimator().estimate(""), 0.1);
    }
}
