//! Hybrid scoring: weighting, merging and ranking of signal candidates

pub mod combiner;
pub mod ranker;
pub mod weights;

pub use combiner::{CombinedCandidate, CombinedMap, ScoreCombiner};
pub use ranker::{rank, resolve};
pub use weights::SignalWeights;
