//! Weighted merge of per-signal candidate maps

use std::collections::HashMap;

use super::weights::SignalWeights;
use crate::signals::{CandidateMap, Signal};

/// A product after all signals have been merged
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedCandidate {
    pub product_id: String,
    pub total_score: f64,

    /// Reason of the first signal that produced the product
    pub reason: String,
}

pub type CombinedMap = HashMap<String, CombinedCandidate>;

#[derive(Debug, Clone, Default)]
pub struct ScoreCombiner {
    weights: SignalWeights,
}

impl ScoreCombiner {
    pub fn new() -> Self {
        let combiner = Self::default();
        debug_assert!(combiner.weights.validate().is_ok());
        combiner
    }

    pub fn weights(&self) -> &SignalWeights {
        &self.weights
    }

    /// Merge signal outputs additively.
    ///
    /// Signals are processed collaborative, content, location, trending
    /// regardless of the order given, so the kept reason is deterministic.
    /// Scores are summed without clamping.
    pub fn combine<'a, I>(&self, outputs: I) -> CombinedMap
    where
        I: IntoIterator<Item = (Signal, &'a CandidateMap)>,
    {
        let mut outputs: Vec<(Signal, &CandidateMap)> = outputs.into_iter().collect();
        outputs.sort_by_key(|(signal, _)| *signal);

        let mut combined = CombinedMap::new();
        for (signal, candidates) in outputs {
            let weight = self.weights.weight(signal);
            for (product_id, candidate) in candidates {
                let entry = combined
                    .entry(product_id.clone())
                    .or_insert_with(|| CombinedCandidate {
                        product_id: product_id.clone(),
                        total_score: 0.0,
                        reason: candidate.reason.clone(),
                    });
                entry.total_score += weight * candidate.partial_score;
            }
        }

        combined
    }
}
