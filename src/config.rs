//! Tracker configuration: location request cadence and map viewport defaults.

use crate::GpsPoint;

/// How the host should subscribe to its location source while recording.
///
/// The crate never talks to the platform location API itself; this is the
/// cadence the ride numbers were tuned against.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct LocationRequest {
    /// Deliver a fix after moving this many meters.
    /// Default: 5.0
    pub distance_interval_meters: f64,
    /// Deliver a fix at least this often.
    /// Default: 1000 ms
    pub time_interval_ms: u32,
    /// Request the platform's best navigation accuracy.
    /// Default: true
    pub high_accuracy: bool,
}

impl Default for LocationRequest {
    fn default() -> Self {
        Self {
            distance_interval_meters: 5.0,
            time_interval_ms: 1000,
            high_accuracy: true,
        }
    }
}

/// A map viewport: center plus span in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct MapRegion {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl MapRegion {
    /// Viewport centered on `point` with a square span.
    pub fn around(point: GpsPoint, span_degrees: f64) -> Self {
        Self {
            latitude: point.latitude,
            longitude: point.longitude,
            latitude_delta: span_degrees,
            longitude_delta: span_degrees,
        }
    }

    pub fn center(&self) -> GpsPoint {
        GpsPoint::new(self.latitude, self.longitude)
    }
}

/// Configuration for a tracking session.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct TrackerConfig {
    /// Location subscription cadence for the host.
    pub location: LocationRequest,

    /// Viewport shown before the first fix arrives.
    /// Default: Mammoth Mountain (37.6308, -119.0326)
    pub default_region: MapRegion,

    /// Span used when following the rider.
    /// Default: 0.01 degrees
    pub region_span_degrees: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        let span = 0.01;
        Self {
            location: LocationRequest::default(),
            default_region: MapRegion::around(GpsPoint::new(37.6308, -119.0326), span),
            region_span_degrees: span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrackerConfig::default();
        assert_eq!(config.location.distance_interval_meters, 5.0);
        assert_eq!(config.location.time_interval_ms, 1000);
        assert!(config.location.high_accuracy);
        assert_eq!(config.default_region.latitude, 37.6308);
        assert_eq!(config.default_region.longitude, -119.0326);
        assert_eq!(config.default_region.latitude_delta, 0.01);
    }

    #[test]
    fn test_region_around_point() {
        let region = MapRegion::around(GpsPoint::new(46.0207, 7.7491), 0.05);
        assert_eq!(region.center(), GpsPoint::new(46.0207, 7.7491));
        assert_eq!(region.longitude_delta, 0.05);
    }
}
