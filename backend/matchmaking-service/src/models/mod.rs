use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Match score assigned to candidates the relevance scorer never saw.
pub const DEFAULT_MATCH_SCORE: u8 = 50;

/// A buyer's material request. Created elsewhere; read-only to this service.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MaterialRequest {
    pub id: Uuid,
    pub buyer_id: Uuid,
    /// Required material names; the first entry is the primary material
    /// used for the embodied-carbon baseline lookup.
    pub materials: Vec<String>,
    pub weight_tons: f64,
    pub site_lat: f64,
    pub site_lng: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl MaterialRequest {
    pub fn site(&self) -> GeoPoint {
        GeoPoint {
            lat: self.site_lat,
            lng: self.site_lng,
        }
    }
}

/// Supplier record as stored by the catalog. Immutable input to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub verified: bool,
    pub products: Vec<String>,
    pub certifications: Vec<String>,
}

impl Supplier {
    pub fn location(&self) -> GeoPoint {
        GeoPoint {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

/// A coordinate pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Ordinal priority bucket. Lower is better and dominates every sort
/// downstream of assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i16)]
pub enum Tier {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
}

impl Tier {
    pub fn rank(self) -> i16 {
        self as i16
    }

    pub fn from_rank(rank: i16) -> Option<Tier> {
        match rank {
            1 => Some(Tier::One),
            2 => Some(Tier::Two),
            3 => Some(Tier::Three),
            4 => Some(Tier::Four),
            _ => None,
        }
    }
}

/// Per-run candidate entity: a supplier joined with the carbon and tier
/// fields computed for one ranking run. Built fresh each run and never
/// persisted as a row itself; only its audit summary is (see
/// [`CarbonCalculation`]).
#[derive(Debug, Clone)]
pub struct RankedCandidate {
    pub supplier: Supplier,
    pub distance_miles: f64,
    pub transport_carbon_kg: f64,
    /// Shared across every candidate of one run: request weight times the
    /// request-scoped baseline, never a per-supplier figure.
    pub embodied_carbon_kg: f64,
    pub total_carbon_kg: f64,
    pub verified: bool,
    pub premium: bool,
    pub tier: Tier,
    pub match_score: u8,
}

/// Audit row written per (request, supplier) pair after a ranking run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CarbonCalculation {
    pub request_id: Uuid,
    pub supplier_id: Uuid,
    pub distance_miles: i32,
    pub transport_carbon_kg: i32,
    pub embodied_carbon_kg: i32,
    pub total_carbon_kg: i32,
    pub tier: i16,
}

impl CarbonCalculation {
    pub fn from_candidate(request_id: Uuid, candidate: &RankedCandidate) -> Self {
        CarbonCalculation {
            request_id,
            supplier_id: candidate.supplier.id,
            distance_miles: candidate.distance_miles.round() as i32,
            transport_carbon_kg: candidate.transport_carbon_kg.round() as i32,
            embodied_carbon_kg: candidate.embodied_carbon_kg.round() as i32,
            total_carbon_kg: candidate.total_carbon_kg.round() as i32,
            tier: candidate.tier.rank(),
        }
    }
}

/// Count of final-ranking candidates per tier, reported in the usage log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierHistogram {
    pub tier_1: u32,
    pub tier_2: u32,
    pub tier_3: u32,
    pub tier_4: u32,
}

impl TierHistogram {
    pub fn from_candidates(candidates: &[RankedCandidate]) -> Self {
        let mut histogram = TierHistogram::default();
        for candidate in candidates {
            match candidate.tier {
                Tier::One => histogram.tier_1 += 1,
                Tier::Two => histogram.tier_2 += 1,
                Tier::Three => histogram.tier_3 += 1,
                Tier::Four => histogram.tier_4 += 1,
            }
        }
        histogram
    }
}

/// One row per ranking run: which scoring resource was used, what it
/// consumed, and a summary of what came out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentUsageLog {
    pub user_id: Uuid,
    pub request_id: Uuid,
    pub agent_type: String,
    pub input_summary: serde_json::Value,
    pub output_summary: serde_json::Value,
    pub model_used: String,
    pub total_tokens: i64,
    pub cost_usd: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(tier: Tier) -> RankedCandidate {
        RankedCandidate {
            supplier: Supplier {
                id: Uuid::new_v4(),
                name: "Test Supply Co".to_string(),
                lat: 0.0,
                lng: 0.0,
                verified: true,
                products: vec!["timber".to_string()],
                certifications: vec![],
            },
            distance_miles: 12.4,
            transport_carbon_kg: 199.6,
            embodied_carbon_kg: 200.0,
            total_carbon_kg: 399.6,
            verified: true,
            premium: false,
            tier,
            match_score: DEFAULT_MATCH_SCORE,
        }
    }

    #[test]
    fn tier_ordering_follows_rank() {
        assert!(Tier::One < Tier::Two);
        assert!(Tier::Three < Tier::Four);
        assert_eq!(Tier::from_rank(3), Some(Tier::Three));
        assert_eq!(Tier::from_rank(0), None);
    }

    #[test]
    fn histogram_counts_each_tier() {
        let candidates = vec![
            candidate(Tier::One),
            candidate(Tier::One),
            candidate(Tier::Two),
            candidate(Tier::Four),
        ];

        let histogram = TierHistogram::from_candidates(&candidates);
        assert_eq!(histogram.tier_1, 2);
        assert_eq!(histogram.tier_2, 1);
        assert_eq!(histogram.tier_3, 0);
        assert_eq!(histogram.tier_4, 1);
    }

    #[test]
    fn carbon_calculation_rounds_to_whole_kilograms() {
        let c = candidate(Tier::Two);
        let row = CarbonCalculation::from_candidate(Uuid::new_v4(), &c);
        assert_eq!(row.distance_miles, 12);
        assert_eq!(row.transport_carbon_kg, 200);
        assert_eq!(row.embodied_carbon_kg, 200);
        assert_eq!(row.total_carbon_kg, 400);
        assert_eq!(row.tier, 2);
    }
}
