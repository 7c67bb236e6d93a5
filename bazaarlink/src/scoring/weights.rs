//! Signal weights for hybrid scoring

use serde::{Deserialize, Serialize};

use crate::signals::Signal;

pub const COLLABORATIVE_WEIGHT: f64 = 0.4;
pub const CONTENT_WEIGHT: f64 = 0.3;
pub const LOCATION_WEIGHT: f64 = 0.2;
pub const TRENDING_WEIGHT: f64 = 0.1;

/// Allowed drift of the weight sum from 1.0
const SUM_TOLERANCE: f64 = 1e-9;

/// Contribution of each signal to the combined score
///
/// A candidate's combined score is `sum(weight(signal) * partial_score)` over the
/// signals that produced it, so with partial scores in `[0, 1]` the combined
/// score stays in `[0, 1]` as long as the weights sum to 1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SignalWeights {
    pub collaborative: f64,
    pub content: f64,
    pub location: f64,
    pub trending: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            collaborative: COLLABORATIVE_WEIGHT,
            content: CONTENT_WEIGHT,
            location: LOCATION_WEIGHT,
            trending: TRENDING_WEIGHT,
        }
    }
}

impl SignalWeights {
    pub fn weight(&self, signal: Signal) -> f64 {
        match signal {
            Signal::Collaborative => self.collaborative,
            Signal::Content => self.content,
            Signal::Location => self.location,
            Signal::Trending => self.trending,
        }
    }

    pub fn total(&self) -> f64 {
        Signal::ALL.iter().map(|s| self.weight(*s)).sum()
    }

    /// Every weight must be non-negative and together they must sum to 1.0
    pub fn validate(&self) -> Result<(), String> {
        for signal in Signal::ALL {
            let weight = self.weight(signal);
            if !weight.is_finite() || weight < 0.0 {
                return Err(format!("{} weight must be >= 0.0, got {}", signal, weight));
            }
        }

        let total = self.total();
        if (total - 1.0).abs() > SUM_TOLERANCE {
            return Err(format!("signal weights must sum to 1.0, got {}", total));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let weights = SignalWeights::default();
        assert_eq!(weights.weight(Signal::Collaborative), 0.4);
        assert_eq!(weights.weight(Signal::Content), 0.3);
        assert_eq!(weights.weight(Signal::Location), 0.2);
        assert_eq!(weights.weight(Signal::Trending), 0.1);
        assert!(weights.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_weights() {
        let negative = SignalWeights {
            trending: -0.1,
            collaborative: 0.6,
            ..Default::default()
        };
        assert!(negative.validate().unwrap_err().contains("trending"));

        let unbalanced = SignalWeights {
            collaborative: 0.5,
            ..Default::default()
        };
        assert!(unbalanced.validate().unwrap_err().contains("sum to 1.0"));
    }
}
