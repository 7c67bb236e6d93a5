//! Candidate generators feeding the hybrid scorer
//!
//! Each provider turns one request into a map of raw (unweighted) candidate
//! scores. Providers never see each other's output and never apply weights;
//! that is the [`ScoreCombiner`](crate::scoring::ScoreCombiner)'s job.

pub mod collaborative;
pub mod content;
pub mod location;
pub mod trending;

pub use collaborative::CollaborativeSignal;
pub use content::ContentSignal;
pub use location::LocationSignal;
pub use trending::TrendingSignal;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::UserProfile;
use crate::storage::{GeoPoint, StorageError};

/// Candidates requested per slot of the final list, for signals that over-fetch
pub const CANDIDATE_MULTIPLIER: usize = 2;

/// The four recommendation signals, in combination order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Collaborative,
    Content,
    Location,
    Trending,
}

impl Signal {
    pub const ALL: [Signal; 4] = [
        Signal::Collaborative,
        Signal::Content,
        Signal::Location,
        Signal::Trending,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Collaborative => "collaborative",
            Signal::Content => "content",
            Signal::Location => "location",
            Signal::Trending => "trending",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One provider's opinion about one product
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    pub product_id: String,

    /// Raw score before weighting
    pub partial_score: f64,

    pub reason: String,
}

impl CandidateScore {
    pub fn new(product_id: impl Into<String>, partial_score: f64, reason: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            partial_score,
            reason: reason.into(),
        }
    }
}

/// Candidates of one provider keyed by product id
pub type CandidateMap = HashMap<String, CandidateScore>;

/// Everything a provider may know about the request
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user_id: String,
    pub location: Option<GeoPoint>,
    pub limit: usize,

    /// Profile loaded once per request; empty for unknown users
    pub profile: Arc<UserProfile>,
}

impl RequestContext {
    pub fn new(user_id: impl Into<String>, location: Option<GeoPoint>, limit: usize) -> Self {
        Self {
            user_id: user_id.into(),
            location,
            limit,
            profile: Arc::new(UserProfile::empty()),
        }
    }

    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profile = Arc::new(profile);
        self
    }
}

/// Why a provider produced nothing
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait SignalProvider: Send + Sync + Debug {
    fn signal(&self) -> Signal;

    async fn candidates(&self, ctx: &RequestContext) -> Result<CandidateMap, SignalError>;
}

/// Result of running one provider for a request
#[derive(Debug)]
pub struct SignalOutcome {
    pub signal: Signal,
    pub candidates: CandidateMap,

    /// Set when the provider failed and contributed nothing
    pub error: Option<SignalError>,
}

impl SignalOutcome {
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// Run a provider under `timeout`. Errors and timeouts yield an empty map.
pub async fn collect(
    provider: &dyn SignalProvider,
    ctx: &RequestContext,
    timeout: Duration,
) -> SignalOutcome {
    let signal = provider.signal();
    let started = Instant::now();

    let result = match tokio::time::timeout(timeout, provider.candidates(ctx)).await {
        Ok(result) => result,
        Err(_) => Err(SignalError::Timeout(timeout)),
    };
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(candidates) => {
            debug!(
                user_id = %ctx.user_id,
                signal = %signal,
                candidates = candidates.len(),
                elapsed_ms,
                "Signal produced candidates"
            );
            SignalOutcome {
                signal,
                candidates,
                error: None,
            }
        }
        Err(e) => {
            warn!(
                user_id = %ctx.user_id,
                signal = %signal,
                elapsed_ms,
                error = %e,
                "Signal failed, continuing without it"
            );
            SignalOutcome {
                signal,
                candidates: CandidateMap::new(),
                error: Some(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct SlowSignal;

    #[async_trait]
    impl SignalProvider for SlowSignal {
        fn signal(&self) -> Signal {
            Signal::Trending
        }

        async fn candidates(&self, _ctx: &RequestContext) -> Result<CandidateMap, SignalError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(CandidateMap::new())
        }
    }

    #[derive(Debug)]
    struct BrokenSignal;

    #[async_trait]
    impl SignalProvider for BrokenSignal {
        fn signal(&self) -> Signal {
            Signal::Content
        }

        async fn candidates(&self, _ctx: &RequestContext) -> Result<CandidateMap, SignalError> {
            Err(StorageError::Connection("refused".to_string()).into())
        }
    }

    #[test]
    fn test_signal_order_and_names() {
        let mut shuffled = vec![Signal::Trending, Signal::Collaborative, Signal::Location, Signal::Content];
        shuffled.sort();
        assert_eq!(shuffled, Signal::ALL.to_vec());
        assert_eq!(Signal::Location.to_string(), "location");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_yields_empty() {
        let ctx = RequestContext::new("u1", None, 10);
        let outcome = collect(&SlowSignal, &ctx, Duration::from_millis(50)).await;
        assert!(outcome.candidates.is_empty());
        assert!(matches!(outcome.error, Some(SignalError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_error_yields_empty() {
        let ctx = RequestContext::new("u1", None, 10);
        let outcome = collect(&BrokenSignal, &ctx, Duration::from_secs(1)).await;
        assert_eq!(outcome.signal, Signal::Content);
        assert!(outcome.is_degraded());
        assert!(outcome.candidates.is_empty());
    }
}
