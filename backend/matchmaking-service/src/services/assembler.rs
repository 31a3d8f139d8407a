//! Candidate assembly and ordering.
//!
//! Joins raw supplier records with the carbon and tier fields computed for
//! one run, then applies the cheap pre-rank that decides which candidates
//! the expensive scorer will ever see. The pre-rank and the final
//! presentation order use different secondary keys on purpose: the first is
//! a cost-triage ordering, the second is what the buyer sees.

use std::cmp::Ordering;
use std::collections::HashSet;

use uuid::Uuid;

use crate::models::{GeoPoint, RankedCandidate, Supplier, DEFAULT_MATCH_SCORE};
use crate::services::geo;
use crate::services::tier::{self, TierThresholds};

/// Pre-rank: ascending tier, then ascending distance. Applied before the
/// top-K cut so that the candidates skipped by the scorer are always the
/// worst-tier, farthest ones.
pub fn pre_rank_order(a: &RankedCandidate, b: &RankedCandidate) -> Ordering {
    a.tier.cmp(&b.tier).then_with(|| {
        a.distance_miles
            .partial_cmp(&b.distance_miles)
            .unwrap_or(Ordering::Equal)
    })
}

/// Presentation order: ascending tier, then descending match score.
pub fn presentation_order(a: &RankedCandidate, b: &RankedCandidate) -> Ordering {
    a.tier
        .cmp(&b.tier)
        .then_with(|| b.match_score.cmp(&a.match_score))
}

/// Build one [`RankedCandidate`] per supplier and sort by [`pre_rank_order`].
///
/// `embodied_carbon_kg` is the run-wide figure (request weight times the
/// request-scoped baseline) and is shared by every candidate. Pure
/// transform; no scoring calls happen here and every candidate starts at
/// the default match score.
pub fn assemble(
    site: GeoPoint,
    weight_tons: f64,
    embodied_carbon_kg: f64,
    suppliers: Vec<Supplier>,
    premium_ids: &HashSet<Uuid>,
    thresholds: &TierThresholds,
    transport_kg_per_ton_mile: f64,
) -> Vec<RankedCandidate> {
    let mut candidates: Vec<RankedCandidate> = suppliers
        .into_iter()
        .map(|supplier| {
            let distance_miles = geo::distance_miles(site, supplier.location());
            let transport_carbon_kg =
                geo::transport_carbon_kg(distance_miles, weight_tons, transport_kg_per_ton_mile);
            let premium = premium_ids.contains(&supplier.id);
            let verified = supplier.verified;
            let tier = tier::classify(verified, premium, distance_miles, thresholds);

            RankedCandidate {
                distance_miles,
                transport_carbon_kg,
                embodied_carbon_kg,
                total_carbon_kg: geo::total_carbon_kg(embodied_carbon_kg, transport_carbon_kg),
                verified,
                premium,
                tier,
                match_score: DEFAULT_MATCH_SCORE,
                supplier,
            }
        })
        .collect();

    candidates.sort_by(pre_rank_order);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tier;

    fn supplier(name: &str, lat: f64, lng: f64, verified: bool) -> Supplier {
        Supplier {
            id: Uuid::new_v4(),
            name: name.to_string(),
            lat,
            lng,
            verified,
            products: vec!["hempcrete blocks".to_string()],
            certifications: vec![],
        }
    }

    fn site() -> GeoPoint {
        GeoPoint {
            lat: 47.6062,
            lng: -122.3321,
        }
    }

    #[test]
    fn assembly_populates_carbon_fields_and_default_score() {
        let near = supplier("Near Verified", 47.61, -122.33, true);
        let premium_ids: HashSet<Uuid> = [near.id].into_iter().collect();

        let candidates = assemble(
            site(),
            100.0,
            200.0,
            vec![near],
            &premium_ids,
            &TierThresholds::default(),
            0.161,
        );

        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!(c.match_score, DEFAULT_MATCH_SCORE);
        assert_eq!(c.tier, Tier::One);
        assert!(c.premium && c.verified);
        assert!((c.embodied_carbon_kg - 200.0).abs() < 1e-9);
        assert!(
            (c.total_carbon_kg - (c.embodied_carbon_kg + c.transport_carbon_kg)).abs() < 1e-9
        );
    }

    #[test]
    fn embodied_carbon_is_shared_across_all_candidates() {
        let suppliers = vec![
            supplier("A", 47.7, -122.3, true),
            supplier("B", 45.5, -122.7, false),
            supplier("C", 34.05, -118.24, true),
        ];

        let candidates = assemble(
            site(),
            100.0,
            200.0,
            suppliers,
            &HashSet::new(),
            &TierThresholds::default(),
            0.161,
        );

        assert!(candidates
            .iter()
            .all(|c| (c.embodied_carbon_kg - 200.0).abs() < 1e-9));
    }

    #[test]
    fn pre_rank_is_tier_then_distance() {
        let suppliers = vec![
            supplier("Far Verified", 34.05, -118.24, true), // ~960 mi -> tier 3
            supplier("Near Verified", 47.61, -122.33, true), // <1 mi -> tier 2 (not premium)
            supplier("Unverified", 47.62, -122.34, false),  // tier 4
            supplier("Regional Verified", 45.52, -122.68, true), // ~145 mi -> tier 2
        ];

        let candidates = assemble(
            site(),
            10.0,
            50.0,
            suppliers,
            &HashSet::new(),
            &TierThresholds::default(),
            0.161,
        );

        let tiers: Vec<i16> = candidates.iter().map(|c| c.tier.rank()).collect();
        assert_eq!(tiers, vec![2, 2, 3, 4]);
        // Within the shared tier, nearer comes first.
        assert!(candidates[0].distance_miles <= candidates[1].distance_miles);
        assert_eq!(candidates[0].supplier.name, "Near Verified");
    }

    #[test]
    fn presentation_order_breaks_ties_by_score_descending() {
        let mut candidates = assemble(
            site(),
            10.0,
            50.0,
            vec![
                supplier("Low", 47.61, -122.33, true),
                supplier("High", 45.52, -122.68, true),
            ],
            &HashSet::new(),
            &TierThresholds::default(),
            0.161,
        );

        candidates[0].match_score = 40;
        candidates[1].match_score = 90;
        candidates.sort_by(presentation_order);

        assert_eq!(candidates[0].supplier.name, "High");
        assert_eq!(candidates[1].supplier.name, "Low");
    }
}
