//! # Ride Store
//!
//! The persistence seam. Hosts keep ride history in whatever key-value storage
//! the platform offers; this module defines the contract ([`RideStore`]), an
//! in-memory implementation, and the JSON document format (an array of rides,
//! newest first).
//!
//! Stored rides are decoded as [`StoredRide`], which tolerates the string-typed
//! numbers written by earlier app versions.

use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};
use crate::history::{HistoryEntry, LenientNumber};
use crate::record::RideRecord;
use crate::GpsPoint;

/// Persistence contract for ride history.
pub trait RideStore {
    /// Prepend a ride. Returns the id it was stored under, which differs from
    /// `record.id` when that id was already taken.
    fn save(&mut self, record: &RideRecord) -> Result<String>;

    /// Every stored ride, newest first.
    fn load_all(&self) -> Result<Vec<StoredRide>>;

    fn delete(&mut self, id: &str) -> Result<()>;
}

/// A ride as found in storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRide {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<LenientNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<LenientNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_speed: Option<LenientNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<LenientNumber>,
    #[serde(default)]
    pub coordinates: Vec<GpsPoint>,
}

impl StoredRide {
    /// Typed view of this ride. Unreadable numbers become zero; an unreadable
    /// date is an error.
    pub fn to_record(&self) -> Result<RideRecord> {
        let date = self
            .date
            .as_deref()
            .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
            .map(|d| d.with_timezone(&Utc))
            .ok_or_else(|| {
                TrackerError::Serialization(format!("ride {} has no readable date", self.id))
            })?;

        let read_f64 = |field: &Option<LenientNumber>| field.as_ref().and_then(LenientNumber::as_f64);
        let read_i64 = |field: &Option<LenientNumber>| field.as_ref().and_then(LenientNumber::as_i64);

        Ok(RideRecord {
            id: self.id.clone(),
            date,
            duration_seconds: read_i64(&self.duration).unwrap_or(0).max(0) as u64,
            distance_miles: read_f64(&self.distance).unwrap_or(0.0),
            max_speed_mph: read_f64(&self.max_speed).unwrap_or(0.0),
            vertical_drop_feet: read_i64(&self.elevation).unwrap_or(0),
            route: self.coordinates.clone(),
        })
    }
}

impl From<&RideRecord> for StoredRide {
    fn from(record: &RideRecord) -> Self {
        Self {
            id: record.id.clone(),
            date: Some(record.date.to_rfc3339_opts(SecondsFormat::Millis, true)),
            duration: Some(LenientNumber::Integer(
                i64::try_from(record.duration_seconds).unwrap_or(i64::MAX),
            )),
            distance: Some(LenientNumber::Number(record.distance_miles)),
            max_speed: Some(LenientNumber::Number(record.max_speed_mph)),
            elevation: Some(LenientNumber::Integer(record.vertical_drop_feet)),
            coordinates: record.route.clone(),
        }
    }
}

impl HistoryEntry for StoredRide {
    fn ride_id(&self) -> &str {
        &self.id
    }

    fn distance_miles(&self) -> Option<f64> {
        self.distance.as_ref().and_then(LenientNumber::as_f64)
    }

    fn vertical_drop_feet(&self) -> Option<i64> {
        self.elevation.as_ref().and_then(LenientNumber::as_i64)
    }
}

/// Serialize ride history to the stored JSON document.
pub fn encode_rides(rides: &[StoredRide]) -> Result<String> {
    Ok(serde_json::to_string(rides)?)
}

/// Parse the stored JSON document. Blank input is an empty history.
pub fn decode_rides(json: &str) -> Result<Vec<StoredRide>> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(json)?)
}

/// In-memory [`RideStore`], newest ride first.
#[derive(Debug, Clone, Default)]
pub struct MemoryRideStore {
    rides: VecDeque<StoredRide>,
    ids: HashSet<String>,
}

impl MemoryRideStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a stored JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let rides: VecDeque<StoredRide> = decode_rides(json)?.into();
        let ids = rides.iter().map(|r| r.id.clone()).collect();
        log::debug!("Loaded {} stored rides", rides.len());
        Ok(Self { rides, ids })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.rides)?)
    }

    pub fn len(&self) -> usize {
        self.rides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rides.is_empty()
    }

    /// Stored rides, newest first.
    pub fn rides(&self) -> impl ExactSizeIterator<Item = &StoredRide> + '_ {
        self.rides.iter()
    }

    /// `base`, or `base-1`, `base-2`, ... whichever is free.
    fn unique_id(&self, base: &str) -> String {
        let taken = |id: &str| self.ids.contains(id);
        if !taken(base) {
            return base.to_string();
        }
        (1..)
            .map(|n| format!("{}-{}", base, n))
            .find(|candidate| !taken(candidate.as_str()))
            .unwrap_or_else(|| base.to_string())
    }
}

impl RideStore for MemoryRideStore {
    fn save(&mut self, record: &RideRecord) -> Result<String> {
        let mut stored = StoredRide::from(record);
        let id = self.unique_id(&record.id);
        if id != record.id {
            log::debug!("Ride id {} already stored, saving as {}", record.id, id);
        }
        stored.id = id.clone();
        self.ids.insert(id.clone());
        self.rides.push_front(stored);
        Ok(id)
    }

    fn load_all(&self) -> Result<Vec<StoredRide>> {
        Ok(self.rides.iter().cloned().collect())
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        let index = self
            .rides
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| TrackerError::RideNotFound(id.to_string()))?;
        self.rides.remove(index);
        // Legacy documents may repeat an id
        if !self.rides.iter().any(|r| r.id == id) {
            self.ids.remove(id);
        }
        log::info!("Deleted ride {}", id);
        Ok(())
    }
}
