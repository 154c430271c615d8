//! # Recording Session
//!
//! The state machine for one ride: `Idle → Recording → Stopped`.
//!
//! A [`SessionState`] owns every metric accumulated during the ride. Fixes are
//! fed in through [`crate::accumulator::ingest`]; the session itself only knows
//! how to start, stop and report its own clock.
//!
//! Every transition requested from the wrong state is rejected with
//! [`TrackerError::InvalidTransition`] and leaves the session untouched, so
//! `stop` on an idle or already-stopped session is harmless.
//!
//! The session holds no locks. Hosts that read it from one thread while feeding
//! fixes from another must serialize access themselves.

use chrono::{DateTime, Utc};
use crate::config::{MapRegion, TrackerConfig};
use crate::error::{Result, TrackerError};
use crate::GpsPoint;

/// Lifecycle of a recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum SessionStatus {
    /// Created, nothing recorded yet
    Idle,
    /// Accepting position fixes
    Recording,
    /// Terminal, metrics frozen
    Stopped,
}

/// Accumulated state of one ride.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub(crate) status: SessionStatus,
    pub(crate) route: Vec<GpsPoint>,
    pub(crate) distance_miles: f64,
    pub(crate) current_speed_mph: f64,
    pub(crate) max_speed_mph: f64,
    pub(crate) reference_altitude_m: Option<f64>,
    pub(crate) vertical_drop_feet: f64,
    pub(crate) current_position: Option<GpsPoint>,
    started_at: Option<DateTime<Utc>>,
    stopped_at: Option<DateTime<Utc>>,
    frozen_elapsed_seconds: u64,
}

/// Point-in-time snapshot for the live stats overlay.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct LiveStats {
    pub status: SessionStatus,
    pub current_speed_mph: f64,
    pub max_speed_mph: f64,
    pub distance_miles: f64,
    pub vertical_drop_feet: f64,
    pub elapsed_seconds: u64,
    pub current_position: Option<GpsPoint>,
}

impl SessionState {
    /// Create a new session in the `Idle` state with all metrics zeroed.
    pub fn new() -> Self {
        Self {
            status: SessionStatus::Idle,
            route: Vec::new(),
            distance_miles: 0.0,
            current_speed_mph: 0.0,
            max_speed_mph: 0.0,
            reference_altitude_m: None,
            vertical_drop_feet: 0.0,
            current_position: None,
            started_at: None,
            stopped_at: None,
            frozen_elapsed_seconds: 0,
        }
    }

    /// Begin recording (`Idle → Recording`).
    ///
    /// Resets every metric and remembers `now` as the start instant.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.status != SessionStatus::Idle {
            return Err(TrackerError::InvalidTransition {
                from: self.status,
                action: "start",
            });
        }

        *self = Self::new();
        self.status = SessionStatus::Recording;
        self.started_at = Some(now);
        log::info!("Ride recording started at {}", now.to_rfc3339());
        Ok(())
    }

    /// Finish recording (`Recording → Stopped`).
    ///
    /// Freezes the elapsed time at `now`. Fails without side effects when the
    /// session is not recording.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.status != SessionStatus::Recording {
            return Err(TrackerError::InvalidTransition {
                from: self.status,
                action: "stop",
            });
        }

        self.frozen_elapsed_seconds = self.elapsed_seconds(now);
        self.stopped_at = Some(now);
        self.status = SessionStatus::Stopped;
        log::info!(
            "Ride recording stopped: {} points, {:.2} mi, {}s",
            self.route.len(),
            self.distance_miles,
            self.frozen_elapsed_seconds
        );
        Ok(())
    }

    /// Whole seconds since `start`.
    ///
    /// Live while recording, frozen once stopped, zero while idle. A `now`
    /// earlier than the start instant reads as zero.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> u64 {
        match (self.status, self.started_at) {
            (SessionStatus::Recording, Some(start)) => (now - start).num_seconds().max(0) as u64,
            (SessionStatus::Stopped, _) => self.frozen_elapsed_seconds,
            _ => 0,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_recording(&self) -> bool {
        self.status == SessionStatus::Recording
    }

    /// Accepted coordinates in delivery order.
    pub fn route(&self) -> &[GpsPoint] {
        &self.route
    }

    /// First accepted coordinate (start marker).
    pub fn start_point(&self) -> Option<GpsPoint> {
        self.route.first().copied()
    }

    /// Most recent accepted coordinate.
    pub fn current_position(&self) -> Option<GpsPoint> {
        self.current_position
    }

    pub fn distance_miles(&self) -> f64 {
        self.distance_miles
    }

    pub fn current_speed_mph(&self) -> f64 {
        self.current_speed_mph
    }

    pub fn max_speed_mph(&self) -> f64 {
        self.max_speed_mph
    }

    /// Altitude in meters that vertical drop is measured from.
    pub fn reference_altitude(&self) -> Option<f64> {
        self.reference_altitude_m
    }

    /// Feet below the reference altitude (negative when above it).
    pub fn vertical_drop_feet(&self) -> f64 {
        self.vertical_drop_feet
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn stopped_at(&self) -> Option<DateTime<Utc>> {
        self.stopped_at
    }

    /// Snapshot of the numbers shown while riding.
    pub fn live_stats(&self, now: DateTime<Utc>) -> LiveStats {
        LiveStats {
            status: self.status,
            current_speed_mph: self.current_speed_mph,
            max_speed_mph: self.max_speed_mph,
            distance_miles: self.distance_miles,
            vertical_drop_feet: self.vertical_drop_feet,
            elapsed_seconds: self.elapsed_seconds(now),
            current_position: self.current_position,
        }
    }

    /// Map viewport following the rider, or the configured default before the
    /// first fix.
    pub fn map_region(&self, config: &TrackerConfig) -> MapRegion {
        match self.current_position {
            Some(position) => MapRegion::around(position, config.region_span_degrees),
            None => config.default_region,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
