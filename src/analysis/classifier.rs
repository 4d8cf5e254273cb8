// Classifier - nearest-prototype emotion classification
//
// Scores a point in emotion space against every eligible category of an
// EmotionTaxonomy and returns the best match plus ranked alternatives.
//
// Scoring:
// - score = 1 - mean(|Δvalence|, |Δarousal|, |Δdominance|)
// - Primary categories are always eligible
// - Composite categories are eligible only when complexity > gate (0.6)
//
// Ordering is total and deterministic: score descending, then category name
// ascending. The best match is the first entry of that order.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::analysis::dimensions::EmotionDimensions;
use crate::config::ClassificationConfig;
use crate::taxonomy::EmotionTaxonomy;

/// A runner-up category with its similarity score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub category: String,
    pub score: f32,
}

/// Result of classifying one set of dimensions
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Best-matching category name
    pub primary: String,
    /// Similarity of the best match, 0.0-1.0 (raw confidence)
    pub score: f32,
    /// Other categories above the alternative floor, best first
    pub alternatives: Vec<Alternative>,
}

/// EmotionClassifier applies the nearest-prototype rule to a taxonomy
///
/// Holds only thresholds; the taxonomy is passed per call so the same
/// classifier can serve any table.
pub struct EmotionClassifier {
    composite_gate: f32,
    alternative_min_score: f32,
    max_alternatives: usize,
}

impl EmotionClassifier {
    /// Create a classifier from classification thresholds
    ///
    /// # Arguments
    /// * `config` - Composite gate, alternative floor, and alternative count
    pub fn new(config: &ClassificationConfig) -> Self {
        Self {
            composite_gate: config.composite_complexity_gate,
            alternative_min_score: config.alternative_min_score,
            max_alternatives: config.max_alternatives,
        }
    }

    /// Classify dimensions against a taxonomy
    ///
    /// # Arguments
    /// * `dims` - Point in emotion space
    /// * `taxonomy` - Category table to score against
    ///
    /// # Returns
    /// `None` when no category is eligible (empty taxonomy, or only
    /// composites with complexity at or below the gate)
    pub fn classify(
        &self,
        dims: &EmotionDimensions,
        taxonomy: &EmotionTaxonomy,
    ) -> Option<Classification> {
        let consider_composites = dims.complexity > self.composite_gate;

        let mut scored: Vec<(&str, f32)> = taxonomy
            .categories()
            .iter()
            .filter(|c| consider_composites || !c.is_composite())
            .map(|c| (c.name.as_str(), dims.affect_similarity(&c.prototype)))
            .collect();
        scored.sort_by(rank);

        let mut ranked = scored.into_iter();
        let (primary, score) = ranked.next()?;

        let alternatives = ranked
            .filter(|&(_, s)| s > self.alternative_min_score)
            .take(self.max_alternatives)
            .map(|(name, s)| Alternative {
                category: name.to_string(),
                score: s,
            })
            .collect();

        Some(Classification {
            primary: primary.to_string(),
            score,
            alternatives,
        })
    }
}

impl Default for EmotionClassifier {
    fn default() -> Self {
        Self::new(&ClassificationConfig::default())
    }
}

/// Score descending, then name ascending
fn rank(a: &(&str, f32), b: &(&str, f32)) -> Ordering {
    b.1.partial_cmp(&a.1)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.0.cmp(b.0))
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
