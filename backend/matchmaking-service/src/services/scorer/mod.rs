//! Bounded relevance scoring.
//!
//! The relevance scorer is the expensive stage of the pipeline: one remote
//! model call per candidate. To keep cost and latency independent of how
//! many suppliers matched, only the top-K candidates of the pre-ranked list
//! are ever scored; the rest keep the default score they were assembled
//! with. K is a fixed configuration ceiling, not a function of N.

pub mod relevance_api;

pub use relevance_api::RelevanceApiScorer;

use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::RankedCandidate;

/// Result of one successful scoring call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchScore {
    /// Relevance of the candidate's products to the requested materials.
    pub score: u8,
    /// Consumption units reported by the scoring resource.
    pub tokens: u64,
}

/// External match-scoring capability.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    async fn score_match(
        &self,
        materials: &[String],
        products: &[String],
    ) -> anyhow::Result<MatchScore>;
}

/// What a scoring pass produced: the full candidate list (scored top-K
/// followed by the untouched rest) plus the run's aggregate usage.
#[derive(Debug)]
pub struct ScoringOutcome {
    pub candidates: Vec<RankedCandidate>,
    pub scored_count: usize,
    pub total_tokens: u64,
}

pub struct BoundedRelevanceScorer {
    scorer: Arc<dyn MatchScorer>,
    top_k: usize,
}

impl BoundedRelevanceScorer {
    pub fn new(scorer: Arc<dyn MatchScorer>, top_k: usize) -> Self {
        BoundedRelevanceScorer { scorer, top_k }
    }

    /// Score the first `min(N, K)` candidates of a pre-ranked list.
    ///
    /// Calls for the top-K fan out concurrently and are joined before
    /// returning; each call is isolated, so a failed or malformed response
    /// leaves that one candidate at its default score with zero recorded
    /// consumption and never fails the batch.
    pub async fn score_top_candidates(
        &self,
        materials: &[String],
        candidates: Vec<RankedCandidate>,
    ) -> ScoringOutcome {
        let cut = self.top_k.min(candidates.len());
        let mut top = candidates;
        let rest = top.split_off(cut);

        let calls = top
            .iter()
            .map(|candidate| self.scorer.score_match(materials, &candidate.supplier.products));
        let results = join_all(calls).await;

        let mut scored_count = 0;
        let mut total_tokens = 0u64;

        let mut merged: Vec<RankedCandidate> = top
            .into_iter()
            .zip(results)
            .map(|(candidate, result)| match result {
                Ok(match_score) => {
                    scored_count += 1;
                    total_tokens += match_score.tokens;
                    RankedCandidate {
                        match_score: match_score.score,
                        ..candidate
                    }
                }
                Err(e) => {
                    warn!(
                        supplier_id = %candidate.supplier.id,
                        error = %e,
                        "match scoring failed; keeping default score"
                    );
                    candidate
                }
            })
            .collect();

        merged.extend(rest);

        info!(
            scored = scored_count,
            total = merged.len(),
            tokens = total_tokens,
            "bounded scoring pass complete"
        );

        ScoringOutcome {
            candidates: merged,
            scored_count,
            total_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Supplier, Tier, DEFAULT_MATCH_SCORE};
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    /// Scorer stub that counts calls and fails for suppliers whose product
    /// list contains a poison marker.
    struct StubScorer {
        calls: AtomicUsize,
        score: u8,
        tokens: u64,
    }

    impl StubScorer {
        fn new(score: u8, tokens: u64) -> Self {
            StubScorer {
                calls: AtomicUsize::new(0),
                score,
                tokens,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MatchScorer for StubScorer {
        async fn score_match(
            &self,
            _materials: &[String],
            products: &[String],
        ) -> anyhow::Result<MatchScore> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if products.iter().any(|p| p == "poison") {
                return Err(anyhow!("upstream scoring error"));
            }
            Ok(MatchScore {
                score: self.score,
                tokens: self.tokens,
            })
        }
    }

    fn candidates(n: usize) -> Vec<RankedCandidate> {
        (0..n)
            .map(|i| RankedCandidate {
                supplier: Supplier {
                    id: Uuid::new_v4(),
                    name: format!("Supplier {i}"),
                    lat: 47.6,
                    lng: -122.3,
                    verified: true,
                    products: vec!["mass timber".to_string()],
                    certifications: vec![],
                },
                distance_miles: i as f64,
                transport_carbon_kg: 10.0,
                embodied_carbon_kg: 200.0,
                total_carbon_kg: 210.0,
                verified: true,
                premium: false,
                tier: Tier::Two,
                match_score: DEFAULT_MATCH_SCORE,
            })
            .collect()
    }

    fn materials() -> Vec<String> {
        vec!["mass timber".to_string()]
    }

    async fn run(n: usize, k: usize) -> (usize, ScoringOutcome) {
        let stub = Arc::new(StubScorer::new(88, 120));
        let bounded = BoundedRelevanceScorer::new(stub.clone(), k);
        let outcome = bounded.score_top_candidates(&materials(), candidates(n)).await;
        (stub.calls(), outcome)
    }

    #[tokio::test]
    async fn call_count_is_min_of_n_and_k() {
        for (n, k, expected) in [(0, 10, 0), (10, 10, 10), (11, 10, 10), (100, 10, 10)] {
            let (calls, outcome) = run(n, k).await;
            assert_eq!(calls, expected, "n={n} k={k}");
            assert_eq!(outcome.scored_count, expected);
            assert_eq!(outcome.candidates.len(), n);
        }
    }

    #[tokio::test]
    async fn rest_keeps_default_score() {
        let (_, outcome) = run(15, 10).await;
        let (top, rest) = outcome.candidates.split_at(10);
        assert!(top.iter().all(|c| c.match_score == 88));
        assert!(rest.iter().all(|c| c.match_score == DEFAULT_MATCH_SCORE));
    }

    #[tokio::test]
    async fn tokens_sum_across_successful_calls() {
        let (_, outcome) = run(4, 10).await;
        assert_eq!(outcome.total_tokens, 4 * 120);
    }

    #[tokio::test]
    async fn one_failure_is_isolated_to_its_candidate() {
        let stub = Arc::new(StubScorer::new(95, 70));
        let bounded = BoundedRelevanceScorer::new(stub.clone(), 10);

        let mut list = candidates(10);
        list[3].supplier.products = vec!["poison".to_string()];
        let poisoned_id = list[3].supplier.id;

        let outcome = bounded.score_top_candidates(&materials(), list).await;

        assert_eq!(stub.calls(), 10);
        assert_eq!(outcome.scored_count, 9);
        assert_eq!(outcome.total_tokens, 9 * 70);
        assert_eq!(outcome.candidates.len(), 10);
        for c in &outcome.candidates {
            if c.supplier.id == poisoned_id {
                assert_eq!(c.match_score, DEFAULT_MATCH_SCORE);
            } else {
                assert_eq!(c.match_score, 95);
            }
        }
    }

    #[tokio::test]
    async fn zero_candidates_is_a_no_op() {
        let stub = Arc::new(StubScorer::new(60, 10));
        let bounded = BoundedRelevanceScorer::new(stub.clone(), 10);
        let outcome = bounded
            .score_top_candidates(&materials(), Vec::new())
            .await;
        assert_eq!(stub.calls(), 0);
        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.total_tokens, 0);
    }
}
