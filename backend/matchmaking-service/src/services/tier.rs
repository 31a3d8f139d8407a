//! Priority tier classification.
//!
//! Maps a supplier's verification status, subscription status, and distance
//! from the job site to an ordinal tier. Lower tiers rank ahead of higher
//! ones in both the pre-rank and the final presentation order.

use crate::models::Tier;

/// Distance cutoffs for tier classification, in miles.
#[derive(Debug, Clone)]
pub struct TierThresholds {
    pub near_miles: f64,
    pub regional_miles: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        TierThresholds {
            near_miles: 100.0,
            regional_miles: 500.0,
        }
    }
}

/// Classify a supplier into a tier.
///
/// Total over all distance values, and monotone: with flags held fixed, a
/// larger distance never yields a better (smaller) tier.
pub fn classify(verified: bool, premium: bool, distance_miles: f64, t: &TierThresholds) -> Tier {
    match (verified, premium) {
        (true, true) if distance_miles <= t.near_miles => Tier::One,
        (true, true) => Tier::Two,
        (true, false) if distance_miles <= t.regional_miles => Tier::Two,
        (true, false) => Tier::Three,
        (false, true) => Tier::Three,
        (false, false) => Tier::Four,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> TierThresholds {
        TierThresholds::default()
    }

    #[test]
    fn verified_premium_near_is_tier_one() {
        assert_eq!(classify(true, true, 50.0, &thresholds()), Tier::One);
    }

    #[test]
    fn unverified_non_premium_far_is_tier_four() {
        assert_eq!(classify(false, false, 2500.0, &thresholds()), Tier::Four);
    }

    #[test]
    fn distance_never_improves_the_tier() {
        let t = thresholds();
        let distances = [0.0, 50.0, 100.0, 100.1, 250.0, 500.0, 500.1, 3000.0];

        for &verified in &[false, true] {
            for &premium in &[false, true] {
                let mut previous = classify(verified, premium, distances[0], &t);
                for &d in &distances[1..] {
                    let current = classify(verified, premium, d, &t);
                    assert!(
                        current >= previous,
                        "tier improved from {previous:?} to {current:?} at {d} miles \
                         (verified={verified}, premium={premium})"
                    );
                    previous = current;
                }
            }
        }
    }

    #[test]
    fn classification_is_total_for_odd_distances() {
        let t = thresholds();
        // NaN and infinities fall through the near/regional guards.
        assert_eq!(classify(true, true, f64::NAN, &t), Tier::Two);
        assert_eq!(classify(true, false, f64::INFINITY, &t), Tier::Three);
        assert_eq!(classify(false, true, f64::NEG_INFINITY, &t), Tier::Three);
    }

    #[test]
    fn thresholds_are_policy_not_contract() {
        let tight = TierThresholds {
            near_miles: 10.0,
            regional_miles: 20.0,
        };
        assert_eq!(classify(true, true, 15.0, &tight), Tier::Two);
        assert_eq!(classify(true, false, 15.0, &tight), Tier::Two);
        assert_eq!(classify(true, false, 25.0, &tight), Tier::Three);
    }
}
