//! # Ride Tracker
//!
//! GPS ride recording engine for ski and snowboard tracking.
//!
//! This library provides:
//! - A recording session state machine (`Idle → Recording → Stopped`)
//! - Incremental distance, speed and vertical drop from raw position fixes
//! - Immutable ride records and lenient lifetime totals over ride history
//!
//! It performs no I/O: the host delivers fixes, samples the clock and persists
//! ride history.
//!
//! ## Features
//!
//! - **`parallel`** - Parallel history aggregation with rayon
//! - **`ffi`** - FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use ride_tracker::{ingest, PositionFix, RideRecordBuilder, SessionState};
//!
//! let start = Utc::now();
//! let mut session = SessionState::new();
//! session.start(start).unwrap();
//!
//! let fixes = [
//!     PositionFix::new(37.6308, -119.0326, start).with_altitude(3000.0),
//!     PositionFix::new(37.6318, -119.0336, start + Duration::seconds(10))
//!         .with_altitude(2980.0)
//!         .with_speed(8.5),
//! ];
//! for fix in &fixes {
//!     ingest(&mut session, fix).unwrap();
//! }
//!
//! let ride = RideRecordBuilder::stop_and_build(&mut session, start + Duration::seconds(30)).unwrap();
//! println!("{} mi, {} mph max, {} ft", ride.distance_miles, ride.max_speed_mph, ride.vertical_drop_feet);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod accumulator;
pub mod config;
pub mod error;
pub mod format;
pub mod geo_utils;
pub mod history;
pub mod record;
pub mod session;
pub mod store;

pub use accumulator::{ingest, ingest_all, FixOutcome};
pub use config::{LocationRequest, MapRegion, TrackerConfig};
pub use error::{Result, TrackerError};
pub use history::{aggregate, HistoryEntry, HistoryTotals, LenientNumber};
#[cfg(feature = "parallel")]
pub use history::aggregate_parallel;
pub use record::{RideRecord, RideRecordBuilder};
pub use session::{LiveStats, SessionState, SessionStatus};
pub use store::{decode_rides, encode_rides, MemoryRideStore, RideStore, StoredRide};

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("RideTrackerRust")
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use ride_tracker::GpsPoint;
/// let point = GpsPoint::new(37.6308, -119.0326); // Mammoth Mountain
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Bounding box for a route.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from GPS points.
    pub fn from_points(points: &[GpsPoint]) -> Option<Self> {
        geo_utils::compute_bounds(points)
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> GpsPoint {
        GpsPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// One reading from the host's location source.
///
/// Altitude is meters above sea level, speed is meters/second. Either may be
/// missing when the platform does not report it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub speed: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl PositionFix {
    /// A fix with coordinates only.
    pub fn new(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            speed: None,
            timestamp,
        }
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn point(&self) -> GpsPoint {
        GpsPoint::new(self.latitude, self.longitude)
    }

    /// Speed if the sensor reported a usable value. Negative and non-finite
    /// readings count as missing.
    pub fn valid_speed(&self) -> Option<f64> {
        self.speed.filter(|s| s.is_finite() && *s >= 0.0)
    }

    /// Altitude if the sensor reported a finite value.
    pub fn valid_altitude(&self) -> Option<f64> {
        self.altitude.filter(|a| a.is_finite())
    }
}

// ============================================================================
// FFI Exports (only when feature enabled)
// ============================================================================

#[cfg(feature = "ffi")]
mod ffi {
    use super::*;
    use log::{debug, info};
    use std::sync::{Arc, Mutex, MutexGuard};

    fn instant(ms: i64) -> std::result::Result<DateTime<Utc>, TrackerError> {
        DateTime::<Utc>::from_timestamp_millis(ms).ok_or(TrackerError::InvalidTimestamp(ms))
    }

    /// Position fix with the timestamp as epoch milliseconds.
    #[derive(Debug, Clone, uniffi::Record)]
    pub struct FfiPositionFix {
        pub latitude: f64,
        pub longitude: f64,
        pub altitude: Option<f64>,
        pub speed: Option<f64>,
        pub timestamp_ms: i64,
    }

    /// Ride record with the date as epoch milliseconds and ISO string.
    #[derive(Debug, Clone, uniffi::Record)]
    pub struct FfiRideRecord {
        pub id: String,
        pub date_ms: i64,
        pub date_iso: String,
        pub duration_seconds: u64,
        pub distance_miles: f64,
        pub max_speed_mph: f64,
        pub vertical_drop_feet: i64,
        pub route: Vec<GpsPoint>,
    }

    impl From<RideRecord> for FfiRideRecord {
        fn from(record: RideRecord) -> Self {
            Self {
                id: record.id,
                date_ms: record.date.timestamp_millis(),
                date_iso: record.date.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
                duration_seconds: record.duration_seconds,
                distance_miles: record.distance_miles,
                max_speed_mph: record.max_speed_mph,
                vertical_drop_feet: record.vertical_drop_feet,
                route: record.route,
            }
        }
    }

    impl FfiRideRecord {
        fn into_record(self) -> std::result::Result<RideRecord, TrackerError> {
            Ok(RideRecord {
                id: self.id,
                date: instant(self.date_ms)?,
                duration_seconds: self.duration_seconds,
                distance_miles: self.distance_miles,
                max_speed_mph: self.max_speed_mph,
                vertical_drop_feet: self.vertical_drop_feet,
                route: self.route,
            })
        }
    }

    /// The active recording session, shared with the host.
    ///
    /// Location callbacks and UI reads arrive on different threads; the mutex
    /// serializes them.
    #[derive(uniffi::Object)]
    pub struct RideSession {
        state: Mutex<SessionState>,
        config: TrackerConfig,
    }

    impl RideSession {
        fn state(&self) -> MutexGuard<'_, SessionState> {
            self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }
    }

    #[uniffi::export]
    impl RideSession {
        #[uniffi::constructor]
        pub fn new(config: TrackerConfig) -> Arc<Self> {
            init_logging();
            Arc::new(Self {
                state: Mutex::new(SessionState::new()),
                config,
            })
        }

        pub fn start(&self, now_ms: i64) -> std::result::Result<(), TrackerError> {
            let now = instant(now_ms)?;
            self.state().start(now)?;
            info!("[RideTrackerRust] Session started at {}", now_ms);
            Ok(())
        }

        /// Feed one fix. Invalid coordinates come back as `InvalidFix` and can be ignored.
        pub fn ingest(&self, fix: FfiPositionFix) -> std::result::Result<(), TrackerError> {
            let position = PositionFix {
                latitude: fix.latitude,
                longitude: fix.longitude,
                altitude: fix.altitude,
                speed: fix.speed,
                timestamp: instant(fix.timestamp_ms)?,
            };
            let outcome = accumulator::ingest(&mut self.state(), &position)?;
            debug!("[RideTrackerRust] Fix accepted: {:?}", outcome);
            Ok(())
        }

        pub fn stop_and_build(&self, now_ms: i64) -> std::result::Result<FfiRideRecord, TrackerError> {
            let now = instant(now_ms)?;
            let record = RideRecordBuilder::stop_and_build(&mut self.state(), now)?;
            info!("[RideTrackerRust] Session stopped, ride {}", record.id);
            Ok(record.into())
        }

        pub fn status(&self) -> SessionStatus {
            self.state().status()
        }

        pub fn live_stats(&self, now_ms: i64) -> std::result::Result<LiveStats, TrackerError> {
            Ok(self.state().live_stats(instant(now_ms)?))
        }

        pub fn map_region(&self) -> MapRegion {
            self.state().map_region(&self.config)
        }

        pub fn route(&self) -> Vec<GpsPoint> {
            self.state().route().to_vec()
        }
    }

    /// Get default configuration.
    #[uniffi::export]
    pub fn default_tracker_config() -> TrackerConfig {
        init_logging();
        TrackerConfig::default()
    }

    #[uniffi::export]
    pub fn haversine_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        geo_utils::haversine_distance_miles(lat1, lon1, lat2, lon2)
    }

    /// Lifetime totals for a stored history document.
    #[uniffi::export]
    pub fn aggregate_history_json(history_json: String) -> std::result::Result<HistoryTotals, TrackerError> {
        init_logging();
        let rides = decode_rides(&history_json)?;
        let totals = history::aggregate_parallel(&rides);
        info!(
            "[RideTrackerRust] {} rides, {:.1} mi, {} ft",
            totals.total_rides, totals.total_distance_miles, totals.total_vertical_feet
        );
        Ok(totals)
    }

    /// Prepend a ride to a stored history document and return the new document.
    #[uniffi::export]
    pub fn append_ride_json(
        history_json: String,
        ride: FfiRideRecord,
    ) -> std::result::Result<String, TrackerError> {
        let mut store = MemoryRideStore::from_json(&history_json)?;
        store.save(&ride.into_record()?)?;
        store.to_json()
    }

    /// Remove a ride from a stored history document and return the new document.
    #[uniffi::export]
    pub fn delete_ride_json(history_json: String, ride_id: String) -> std::result::Result<String, TrackerError> {
        let mut store = MemoryRideStore::from_json(&history_json)?;
        store.delete(&ride_id)?;
        store.to_json()
    }

    #[uniffi::export]
    pub fn ride_summary(ride: FfiRideRecord) -> std::result::Result<String, TrackerError> {
        Ok(format::format_ride_summary(&ride.into_record()?))
    }
}

// ============================================================================
// Tests
// ============================================================================
