//! # History Aggregation
//!
//! Lifetime totals over stored rides: ride count, miles and vertical feet.
//!
//! Totals are never persisted; they are recomputed from whatever the store holds.
//!
//! ## Lenient aggregation
//!
//! Older versions of the app wrote `distance` and `maxSpeed` as pre-formatted
//! strings (`"1.25"`), and some records carry values that do not parse at all.
//! Such a field contributes **zero** to its total while the ride is still
//! counted. A malformed record is logged and never aborts the fold.
//!
//! Text is read by its leading number, the way the app always read it back:
//! `"2.5 mi"` is 2.5 miles, `"850.7"` is 850 feet of vertical (truncated),
//! `"n/a"` is nothing.

use serde::{Deserialize, Serialize};

use crate::record::RideRecord;

/// Anything that can be folded into [`HistoryTotals`].
pub trait HistoryEntry {
    fn ride_id(&self) -> &str;

    /// Ride distance, or `None` when the stored value is unusable.
    fn distance_miles(&self) -> Option<f64>;

    /// Ride vertical, or `None` when the stored value is unusable.
    fn vertical_drop_feet(&self) -> Option<i64>;
}

impl HistoryEntry for RideRecord {
    fn ride_id(&self) -> &str {
        &self.id
    }

    fn distance_miles(&self) -> Option<f64> {
        self.distance_miles.is_finite().then_some(self.distance_miles)
    }

    fn vertical_drop_feet(&self) -> Option<i64> {
        Some(self.vertical_drop_feet)
    }
}

/// Lifetime totals shown above the ride list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[serde(rename_all = "camelCase")]
pub struct HistoryTotals {
    pub total_rides: u32,
    #[serde(rename = "totalDistance")]
    pub total_distance_miles: f64,
    #[serde(rename = "totalVertical")]
    pub total_vertical_feet: i64,
}

impl HistoryTotals {
    /// Add one ride to the running totals.
    pub fn with_ride<E: HistoryEntry + ?Sized>(self, entry: &E) -> Self {
        let distance = entry.distance_miles().unwrap_or_else(|| {
            log::warn!("Ride {} has a malformed distance, counting 0", entry.ride_id());
            0.0
        });
        let vertical = entry.vertical_drop_feet().unwrap_or_else(|| {
            log::warn!("Ride {} has a malformed vertical, counting 0", entry.ride_id());
            0
        });

        Self {
            total_rides: self.total_rides.saturating_add(1),
            total_distance_miles: self.total_distance_miles + distance,
            total_vertical_feet: self.total_vertical_feet.saturating_add(vertical),
        }
    }

    /// Combine two partial totals.
    pub fn merge(self, other: Self) -> Self {
        Self {
            total_rides: self.total_rides.saturating_add(other.total_rides),
            total_distance_miles: self.total_distance_miles + other.total_distance_miles,
            total_vertical_feet: self.total_vertical_feet.saturating_add(other.total_vertical_feet),
        }
    }
}

/// Fold rides into lifetime totals. Empty input gives all zeros.
pub fn aggregate<'a, E, I>(records: I) -> HistoryTotals
where
    E: HistoryEntry + 'a,
    I: IntoIterator<Item = &'a E>,
{
    records
        .into_iter()
        .fold(HistoryTotals::default(), |totals, entry| totals.with_ride(entry))
}

/// Parallel version of [`aggregate`].
///
/// Ride and vertical totals are identical to the sequential fold; the distance
/// total may differ in the last bits because float addition is reordered.
#[cfg(feature = "parallel")]
pub fn aggregate_parallel<E>(records: &[E]) -> HistoryTotals
where
    E: HistoryEntry + Sync,
{
    use rayon::prelude::*;

    records
        .par_iter()
        .fold(HistoryTotals::default, |totals, entry| totals.with_ride(entry))
        .reduce(HistoryTotals::default, HistoryTotals::merge)
}

// ============================================================================
// Lenient Numbers
// ============================================================================

/// A numeric field as found in stored history: a number, a string, or junk.
///
/// Whole numbers decode as `Integer` and are written back without a decimal
/// point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LenientNumber {
    Integer(i64),
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl LenientNumber {
    /// Decimal reading (leading decimal prefix of text).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            LenientNumber::Integer(n) => Some(*n as f64),
            LenientNumber::Number(n) => n.is_finite().then_some(*n),
            LenientNumber::Text(s) => leading_decimal(s),
            LenientNumber::Other(_) => None,
        }
    }

    /// Integer reading (leading integer prefix of text, numbers truncated).
    ///
    /// Numbers outside the `i64` range have no reading.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            LenientNumber::Integer(n) => Some(*n),
            LenientNumber::Number(n) => {
                let n = n.trunc();
                (n >= i64::MIN as f64 && n < i64::MAX as f64).then(|| n as i64)
            }
            LenientNumber::Text(s) => leading_integer(s),
            LenientNumber::Other(_) => None,
        }
    }
}

impl From<i64> for LenientNumber {
    fn from(value: i64) -> Self {
        LenientNumber::Integer(value)
    }
}

impl From<f64> for LenientNumber {
    fn from(value: f64) -> Self {
        LenientNumber::Number(value)
    }
}

impl From<&str> for LenientNumber {
    fn from(value: &str) -> Self {
        LenientNumber::Text(value.to_string())
    }
}

/// Number of ASCII digits starting at `start`.
fn scan_digits(bytes: &[u8], start: usize) -> usize {
    bytes[start..].iter().take_while(|b| b.is_ascii_digit()).count()
}

fn leading_decimal(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_digits = scan_digits(bytes, end);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = scan_digits(bytes, end + 1);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_digits = scan_digits(bytes, end + 1 + sign);
        if exp_digits > 0 {
            end += 1 + sign + exp_digits;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

fn leading_integer(text: &str) -> Option<i64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();

    let sign = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let digits = scan_digits(bytes, sign);
    if digits == 0 {
        return None;
    }
    s[..sign + digits].parse::<i64>().ok()
}
