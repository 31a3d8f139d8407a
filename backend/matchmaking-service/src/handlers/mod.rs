/// HTTP endpoints for the supplier matchmaking pipeline.
use actix_web::{web, HttpResponse};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::Result;
use crate::middleware::UserId;
use crate::models::{CarbonCalculation, RankedCandidate};
use crate::services::RankingOrchestrator;

/// One entry of the returned ranking. Carbon figures are rounded to whole
/// kilograms and distance to whole miles for presentation.
#[derive(Debug, Serialize)]
pub struct CandidateSummary {
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub distance_miles: i64,
    pub transport_carbon_kg: i64,
    pub embodied_carbon_kg: i64,
    pub total_carbon_kg: i64,
    pub verified: bool,
    pub premium: bool,
    pub tier: i16,
    pub match_score: u8,
}

impl From<&RankedCandidate> for CandidateSummary {
    fn from(candidate: &RankedCandidate) -> Self {
        CandidateSummary {
            supplier_id: candidate.supplier.id,
            supplier_name: candidate.supplier.name.clone(),
            distance_miles: candidate.distance_miles.round() as i64,
            transport_carbon_kg: candidate.transport_carbon_kg.round() as i64,
            embodied_carbon_kg: candidate.embodied_carbon_kg.round() as i64,
            total_carbon_kg: candidate.total_carbon_kg.round() as i64,
            verified: candidate.verified,
            premium: candidate.premium,
            tier: candidate.tier.rank(),
            match_score: candidate.match_score,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MatchRunResponse {
    pub request_id: Uuid,
    pub candidate_count: usize,
    pub candidates: Vec<CandidateSummary>,
}

#[derive(Debug, Serialize)]
pub struct CarbonRecordsResponse {
    pub request_id: Uuid,
    pub records: Vec<CarbonCalculation>,
}

/// Run the ranking pipeline for one of the caller's material requests.
pub async fn run_matchmaking(
    orchestrator: web::Data<Arc<RankingOrchestrator>>,
    user_id: UserId,
    request_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let ranked = orchestrator.rank_candidates(user_id.0, *request_id).await?;

    let response = MatchRunResponse {
        request_id: *request_id,
        candidate_count: ranked.len(),
        candidates: ranked.iter().map(CandidateSummary::from).collect(),
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Read the persisted carbon audit rows for one of the caller's requests.
pub async fn list_carbon_records(
    orchestrator: web::Data<Arc<RankingOrchestrator>>,
    user_id: UserId,
    request_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let records = orchestrator.carbon_records(user_id.0, *request_id).await?;

    Ok(HttpResponse::Ok().json(CarbonRecordsResponse {
        request_id: *request_id,
        records,
    }))
}
