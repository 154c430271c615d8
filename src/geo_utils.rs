//! # Geographic Utilities
//!
//! Great-circle distance and unit conversion for ride tracking.
//!
//! Every distance in this crate is expressed in **miles**, speeds in **mph** and
//! vertical in **feet**, matching what the app displays. Sensor input arrives in
//! SI units (meters, meters/second) and is converted with the constants below.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance_miles`] | Great-circle distance between two coordinates |
//! | [`point_distance_miles`] | Same, for two [`GpsPoint`]s |
//! | [`polyline_length_miles`] | Total length of a route |
//! | [`compute_bounds`] | Bounding box of a route |
//! | [`compute_center`] | Centroid of a route |
//!
//! ## Example
//!
//! ```rust
//! use ride_tracker::{GpsPoint, geo_utils};
//!
//! let run = vec![
//!     GpsPoint::new(37.6308, -119.0326), // Mammoth Main Lodge
//!     GpsPoint::new(37.6318, -119.0336),
//!     GpsPoint::new(37.6328, -119.0346),
//! ];
//!
//! let length = geo_utils::polyline_length_miles(&run);
//! println!("Run length: {:.2} mi", length);
//! ```
//!
//! ## Algorithm Notes
//!
//! The haversine formula assumes a spherical Earth of radius 3959 miles. The
//! intermediate haversine term is clamped to `[0, 1]` so that floating-point
//! overshoot near antipodal points never reaches `sqrt` of a negative number.

use geo::{BoundingRect, Coord, LineString};

use crate::{Bounds, GpsPoint};

// =============================================================================
// Unit Constants
// =============================================================================

/// Mean Earth radius in miles.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Meters/second to miles/hour.
pub const MPS_TO_MPH: f64 = 2.237;

/// Meters to feet.
pub const METERS_TO_FEET: f64 = 3.281;

// =============================================================================
// Distance Functions
// =============================================================================

/// Convert degrees to radians (`deg * π / 180`).
#[inline]
pub fn degrees_to_radians(deg: f64) -> f64 {
    deg * std::f64::consts::PI / 180.0
}

/// Calculate the great-circle distance between two coordinates using the Haversine formula.
///
/// Inputs are WGS84 degrees. Returns miles. The result is exactly `0.0` for identical
/// points and exactly symmetric in its arguments.
///
/// # Example
///
/// ```rust
/// use ride_tracker::geo_utils::haversine_distance_miles;
///
/// let d = haversine_distance_miles(37.6308, -119.0326, 37.6328, -119.0346);
/// assert!((d - 0.167).abs() < 0.01);
/// ```
pub fn haversine_distance_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    // abs() keeps d(a, b) and d(b, a) bit-identical
    let d_lat = degrees_to_radians((lat2 - lat1).abs());
    let d_lon = degrees_to_radians((lon2 - lon1).abs());

    let sin_lat = (d_lat / 2.0).sin();
    let sin_lon = (d_lon / 2.0).sin();

    let a = sin_lat * sin_lat
        + degrees_to_radians(lat1).cos() * degrees_to_radians(lat2).cos() * sin_lon * sin_lon;
    let a = a.clamp(0.0, 1.0);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_MILES * c
}

/// Great-circle distance in miles between two [`GpsPoint`]s.
#[inline]
pub fn point_distance_miles(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    haversine_distance_miles(p1.latitude, p1.longitude, p2.latitude, p2.longitude)
}

/// Total length of a route in miles.
///
/// Sums the haversine distance between consecutive points. Empty or single-point
/// routes return 0.0.
pub fn polyline_length_miles(points: &[GpsPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| point_distance_miles(&w[0], &w[1]))
        .sum()
}

// =============================================================================
// Bounding Box / Center
// =============================================================================

/// Compute the bounding box of a route.
///
/// Returns `None` for an empty route.
///
/// # Example
///
/// ```rust
/// use ride_tracker::{GpsPoint, geo_utils};
///
/// let route = vec![
///     GpsPoint::new(37.6300, -119.0350),
///     GpsPoint::new(37.6330, -119.0320),
/// ];
///
/// let bounds = geo_utils::compute_bounds(&route).unwrap();
/// assert_eq!(bounds.min_lat, 37.6300);
/// assert_eq!(bounds.max_lng, -119.0320);
/// ```
pub fn compute_bounds(points: &[GpsPoint]) -> Option<Bounds> {
    let line: LineString<f64> = points
        .iter()
        .map(|p| Coord { x: p.longitude, y: p.latitude })
        .collect();

    line.bounding_rect().map(|rect| Bounds {
        min_lat: rect.min().y,
        max_lat: rect.max().y,
        min_lng: rect.min().x,
        max_lng: rect.max().x,
    })
}

/// Arithmetic centroid of a route. Returns `None` for an empty route.
///
/// Simple averaging is fine at ski-area scale; it is not meant for routes that
/// cross the antimeridian.
pub fn compute_center(points: &[GpsPoint]) -> Option<GpsPoint> {
    if points.is_empty() {
        return None;
    }

    let sum_lat: f64 = points.iter().map(|p| p.latitude).sum();
    let sum_lng: f64 = points.iter().map(|p| p.longitude).sum();
    let n = points.len() as f64;

    Some(GpsPoint::new(sum_lat / n, sum_lng / n))
}

// =============================================================================
// Unit Tests
// =============================================================================
