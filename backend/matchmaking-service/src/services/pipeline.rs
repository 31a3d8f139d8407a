//! Ranking orchestration.
//!
//! Drives one ranking run end to end: validate, fetch inputs, assemble,
//! score a bounded prefix, merge, sort for presentation, and write the
//! audit trail. Stages run strictly in sequence; the only fan-out is the
//! bounded scoring pass inside [`BoundedRelevanceScorer`].

use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::MatchmakingStore;
use crate::error::{AppError, Result};
use crate::models::{
    AgentUsageLog, CarbonCalculation, MaterialRequest, RankedCandidate, TierHistogram,
};
use crate::services::assembler::{self, presentation_order};
use crate::services::baseline::CarbonBaselineSource;
use crate::services::scorer::BoundedRelevanceScorer;
use crate::services::tier::TierThresholds;

/// Tag identifying this pipeline in usage logs.
pub const AGENT_TYPE: &str = "supplier_matchmaker";

/// Run-independent knobs for the orchestrator.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub thresholds: TierThresholds,
    pub transport_kg_per_ton_mile: f64,
    /// Identifier of the scoring resource, recorded in usage logs.
    pub model_used: String,
    /// Price per 1000 consumed tokens.
    pub token_unit_price_usd: f64,
}

pub struct RankingOrchestrator {
    store: Arc<dyn MatchmakingStore>,
    baseline: Arc<dyn CarbonBaselineSource>,
    scorer: BoundedRelevanceScorer,
    settings: PipelineSettings,
}

impl RankingOrchestrator {
    pub fn new(
        store: Arc<dyn MatchmakingStore>,
        baseline: Arc<dyn CarbonBaselineSource>,
        scorer: BoundedRelevanceScorer,
        settings: PipelineSettings,
    ) -> Self {
        RankingOrchestrator {
            store,
            baseline,
            scorer,
            settings,
        }
    }

    /// Execute one ranking run for `request_id` on behalf of `requester`.
    ///
    /// Any failure before assembly aborts with no output and nothing
    /// persisted. Scoring failures degrade individual candidates to the
    /// default score. Audit-write failures are logged and do not affect
    /// the returned ranking.
    pub async fn rank_candidates(
        &self,
        requester: Uuid,
        request_id: Uuid,
    ) -> Result<Vec<RankedCandidate>> {
        // 1. Validate ownership and run preconditions before doing any work.
        let request = self.owned_request(requester, request_id).await?;

        if request.status != "open" {
            return Err(AppError::BadRequest(format!(
                "material request is {}, not open for matching",
                request.status
            )));
        }

        if request.materials.is_empty() {
            return Err(AppError::BadRequest(
                "material request lists no materials".to_string(),
            ));
        }

        if !(request.weight_tons > 0.0) {
            return Err(AppError::BadRequest(
                "material request weight must be positive".to_string(),
            ));
        }

        // 2. One baseline lookup per run, shared by every candidate.
        let primary_material = &request.materials[0];
        let baseline_kg_per_ton = self
            .baseline
            .baseline_kg_per_ton(primary_material)
            .await
            .map_err(|e| AppError::Internal(format!("embodied-carbon lookup failed: {e}")))?;
        let embodied_carbon_kg = baseline_kg_per_ton * request.weight_tons;

        // 3. Snapshot reads; neither is transactional with the other.
        let suppliers = self.store.find_suppliers_offering(&request.materials).await?;
        let premium_ids = self.store.premium_supplier_ids().await?;

        info!(
            request_id = %request.id,
            suppliers = suppliers.len(),
            premium = premium_ids.len(),
            embodied_carbon_kg,
            "ranking inputs fetched"
        );

        // 4. Assemble and pre-rank.
        let candidates = assembler::assemble(
            request.site(),
            request.weight_tons,
            embodied_carbon_kg,
            suppliers,
            &premium_ids,
            &self.settings.thresholds,
            self.settings.transport_kg_per_ton_mile,
        );

        // 5. Bounded scoring of the pre-ranked prefix.
        let outcome = self
            .scorer
            .score_top_candidates(&request.materials, candidates)
            .await;

        // 6. Final presentation sort over the merged list.
        let mut ranked = outcome.candidates;
        ranked.sort_by(presentation_order);

        // 7. Best-effort audit trail; the ranking is the deliverable.
        self.persist_audit_records(
            &request,
            &ranked,
            outcome.scored_count,
            outcome.total_tokens,
        )
        .await;

        Ok(ranked)
    }

    /// Read the persisted carbon audit rows for a request the caller owns.
    pub async fn carbon_records(
        &self,
        requester: Uuid,
        request_id: Uuid,
    ) -> Result<Vec<CarbonCalculation>> {
        self.owned_request(requester, request_id).await?;
        Ok(self.store.carbon_calculations_for_request(request_id).await?)
    }

    /// Fetch a request the caller owns. Foreign requests are reported as
    /// missing so buyers cannot probe each other's request ids.
    async fn owned_request(&self, requester: Uuid, request_id: Uuid) -> Result<MaterialRequest> {
        let request = self
            .store
            .find_material_request(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("material request not found".to_string()))?;

        if request.buyer_id != requester {
            return Err(AppError::NotFound("material request not found".to_string()));
        }

        Ok(request)
    }

    async fn persist_audit_records(
        &self,
        request: &MaterialRequest,
        ranked: &[RankedCandidate],
        scored_count: usize,
        total_tokens: u64,
    ) {
        let rows: Vec<CarbonCalculation> = ranked
            .iter()
            .map(|candidate| CarbonCalculation::from_candidate(request.id, candidate))
            .collect();

        if let Err(e) = self.store.insert_carbon_calculations(&rows).await {
            warn!(request_id = %request.id, error = %e, "failed to persist carbon calculations");
        }

        let histogram = TierHistogram::from_candidates(ranked);
        let log = AgentUsageLog {
            user_id: request.buyer_id,
            request_id: request.id,
            agent_type: AGENT_TYPE.to_string(),
            input_summary: json!({
                "materials": &request.materials,
                "site": { "lat": request.site_lat, "lng": request.site_lng },
            }),
            output_summary: json!({
                "candidates_processed": ranked.len(),
                "candidates_scored": scored_count,
                "tier_breakdown": histogram,
            }),
            model_used: self.settings.model_used.clone(),
            total_tokens: total_tokens as i64,
            cost_usd: derived_cost(total_tokens, self.settings.token_unit_price_usd),
        };

        if let Err(e) = self.store.insert_usage_log(&log).await {
            warn!(request_id = %request.id, error = %e, "failed to persist usage log");
        }
    }
}

/// Monetary cost of a run: consumption is priced per 1000 tokens.
pub fn derived_cost(total_tokens: u64, unit_price_usd: f64) -> f64 {
    total_tokens as f64 / 1000.0 * unit_price_usd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_is_tokens_per_thousand_times_unit_price() {
        assert!((derived_cost(1000, 0.00015) - 0.00015).abs() < 1e-12);
        assert!((derived_cost(12_500, 0.2) - 2.5).abs() < 1e-12);
        assert_eq!(derived_cost(0, 0.2), 0.0);
    }
}
