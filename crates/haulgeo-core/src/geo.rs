//! Coordinate primitives shared by every crate in the workspace.
//!
//! A [`Coordinate`] is a plain lat/lon pair. Providers can hand back values
//! outside the valid range, so validity is checked at each boundary with
//! [`is_valid_coordinate`] rather than enforced by construction. Invalid
//! values are rejected, never clamped.

use ::geo::{algorithm::Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        is_valid_coordinate(self.lat, self.lon)
    }
}

impl From<Coordinate> for Point<f64> {
    /// `x` is longitude, `y` is latitude.
    fn from(c: Coordinate) -> Self {
        Point::new(c.lon, c.lat)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// Returns `true` iff `-90 ≤ lat ≤ 90`, `-180 ≤ lon ≤ 180` and neither is NaN.
#[must_use]
pub fn is_valid_coordinate(lat: f64, lon: f64) -> bool {
    // Range comparisons against NaN are always false, so NaN fails here.
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

/// Great-circle distance between two coordinates in metres, on geo's mean
/// earth radius.
#[must_use]
pub fn haversine_distance_m(a: Coordinate, b: Coordinate) -> f64 {
    Haversine.distance(Point::from(a), Point::from(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_range_boundaries() {
        assert!(is_valid_coordinate(90.0, 180.0));
        assert!(is_valid_coordinate(-90.0, -180.0));
        assert!(is_valid_coordinate(0.0, 0.0));
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(!is_valid_coordinate(90.000_1, 0.0));
        assert!(!is_valid_coordinate(-90.000_1, 0.0));
        assert!(!is_valid_coordinate(0.0, 180.000_1));
        assert!(!is_valid_coordinate(0.0, -180.000_1));
    }

    #[test]
    fn rejects_nan_and_infinity() {
        assert!(!is_valid_coordinate(f64::NAN, 0.0));
        assert!(!is_valid_coordinate(0.0, f64::NAN));
        assert!(!is_valid_coordinate(f64::INFINITY, 0.0));
        assert!(!Coordinate::new(0.0, f64::NEG_INFINITY).is_valid());
    }

    #[test]
    fn haversine_zero_for_same_point() {
        let p = Coordinate::new(25.04, 102.71);
        assert!(haversine_distance_m(p, p).abs() < 1e-6);
    }

    #[test]
    fn haversine_one_degree_of_latitude() {
        // One degree of latitude is ~111.2 km on the mean earth sphere.
        let d = haversine_distance_m(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0));
        assert!((d - 111_194.9).abs() < 1.0, "got {d}");
    }

    #[test]
    fn point_conversion_puts_longitude_on_x() {
        let p = Point::from(Coordinate::new(25.04, 102.71));
        assert!((p.x() - 102.71).abs() < f64::EPSILON);
        assert!((p.y() - 25.04).abs() < f64::EPSILON);
    }

    #[test]
    fn haversine_is_symmetric() {
        let kunming = Coordinate::new(25.04, 102.71);
        let chengdu = Coordinate::new(30.57, 104.07);
        let ab = haversine_distance_m(kunming, chengdu);
        let ba = haversine_distance_m(chengdu, kunming);
        assert!((ab - ba).abs() < 1e-6);
        assert!(ab > 600_000.0 && ab < 650_000.0, "got {ab}");
    }
}
