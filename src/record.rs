//! # Ride Records
//!
//! A [`RideRecord`] is the immutable result of one finished session and the only
//! schema the crate persists. Field names on the wire match what earlier versions
//! of the app wrote: `id`, `date`, `duration`, `distance`, `maxSpeed`, `elevation`
//! and `coordinates`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};
use crate::geo_utils::{compute_bounds, compute_center};
use crate::session::{SessionState, SessionStatus};
use crate::{Bounds, GpsPoint};

/// A finished ride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideRecord {
    /// Epoch milliseconds of the stop instant, possibly with a `-N` suffix
    pub id: String,
    /// Stop instant
    pub date: DateTime<Utc>,
    #[serde(rename = "duration")]
    pub duration_seconds: u64,
    /// Miles, one decimal
    #[serde(rename = "distance")]
    pub distance_miles: f64,
    /// Mph, one decimal
    #[serde(rename = "maxSpeed")]
    pub max_speed_mph: f64,
    /// Whole feet
    #[serde(rename = "elevation")]
    pub vertical_drop_feet: i64,
    #[serde(rename = "coordinates")]
    pub route: Vec<GpsPoint>,
}

impl RideRecord {
    /// Bounding box of the route, for framing the ride on a map.
    pub fn bounds(&self) -> Option<Bounds> {
        compute_bounds(&self.route)
    }

    pub fn center(&self) -> Option<GpsPoint> {
        compute_center(&self.route)
    }

    pub fn start_point(&self) -> Option<GpsPoint> {
        self.route.first().copied()
    }
}

/// Materializes [`RideRecord`]s from stopped sessions.
pub struct RideRecordBuilder;

impl RideRecordBuilder {
    /// Snapshot a stopped session.
    ///
    /// Fails with [`TrackerError::InvalidState`] unless the session is `Stopped`;
    /// no partial record is ever produced. Date and duration come from the
    /// session's stop instant, so building later yields the same record.
    ///
    /// Ids are the stop instant in epoch milliseconds. Two rides stopped in the
    /// same millisecond share an id; [`crate::store::MemoryRideStore::save`]
    /// disambiguates them.
    pub fn build(session: &SessionState) -> Result<RideRecord> {
        let stopped_at = match (session.status(), session.stopped_at()) {
            (SessionStatus::Stopped, Some(stopped_at)) => stopped_at,
            (status, _) => return Err(TrackerError::InvalidState { status }),
        };
        let record = RideRecord {
            id: stopped_at.timestamp_millis().to_string(),
            date: stopped_at,
            duration_seconds: session.elapsed_seconds(stopped_at),
            distance_miles: round_to_tenth(session.distance_miles()),
            max_speed_mph: round_to_tenth(session.max_speed_mph()),
            vertical_drop_feet: session.vertical_drop_feet().round() as i64,
            route: session.route().to_vec(),
        };

        log::info!(
            "Built ride {}: {} mi, {} mph max, {} ft, {}s",
            record.id,
            record.distance_miles,
            record.max_speed_mph,
            record.vertical_drop_feet,
            record.duration_seconds
        );
        Ok(record)
    }

    /// Stop a recording session at `now` and build its record in one step.
    pub fn stop_and_build(session: &mut SessionState, now: DateTime<Utc>) -> Result<RideRecord> {
        session.stop(now)?;
        Self::build(session)
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
