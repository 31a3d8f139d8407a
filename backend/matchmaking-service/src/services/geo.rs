//! Great-circle distance and transport-carbon estimates.
//!
//! Pure functions; coordinate validation is the caller's responsibility.

use crate::models::GeoPoint;

const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Haversine distance between two points, in statute miles.
pub fn distance_miles(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Shipping emissions for moving `weight_tons` over `distance_miles`,
/// using a linear road-freight factor (kg CO2e per ton-mile).
pub fn transport_carbon_kg(distance_miles: f64, weight_tons: f64, kg_per_ton_mile: f64) -> f64 {
    distance_miles * weight_tons * kg_per_ton_mile
}

/// Total footprint for one candidate: production plus shipping.
pub fn total_carbon_kg(embodied_kg: f64, transport_kg: f64) -> f64 {
    embodied_kg + transport_kg
}

#[cfg(test)]
mod tests {
    use super::*;

    const FACTOR: f64 = 0.161;

    fn point(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint { lat, lng }
    }

    #[test]
    fn distance_is_zero_for_coincident_points() {
        let seattle = point(47.6062, -122.3321);
        assert!(distance_miles(seattle, seattle).abs() < 1e-9);
    }

    #[test]
    fn distance_is_symmetric() {
        let seattle = point(47.6062, -122.3321);
        let portland = point(45.5152, -122.6784);
        let there = distance_miles(seattle, portland);
        let back = distance_miles(portland, seattle);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn seattle_to_portland_is_roughly_145_miles() {
        let seattle = point(47.6062, -122.3321);
        let portland = point(45.5152, -122.6784);
        let d = distance_miles(seattle, portland);
        assert!((130.0..160.0).contains(&d), "got {d}");
    }

    #[test]
    fn crossing_the_antimeridian_stays_finite() {
        let fiji = point(-17.7134, 178.0650);
        let samoa = point(-13.7590, -172.1046);
        let d = distance_miles(fiji, samoa);
        assert!(d.is_finite());
        assert!(d > 0.0 && d < 1500.0, "got {d}");
    }

    #[test]
    fn transport_carbon_grows_with_distance_and_weight() {
        let near = transport_carbon_kg(100.0, 10.0, FACTOR);
        let far = transport_carbon_kg(200.0, 10.0, FACTOR);
        let heavy = transport_carbon_kg(100.0, 20.0, FACTOR);
        assert!(far > near);
        assert!(heavy > near);
        assert!(transport_carbon_kg(0.0, 10.0, FACTOR).abs() < 1e-9);
    }

    #[test]
    fn total_carbon_is_a_plain_sum() {
        assert!((total_carbon_kg(200.0, 161.0) - 361.0).abs() < 1e-9);
    }
}
