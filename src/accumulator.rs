//! # Track Accumulator
//!
//! Folds position fixes into a recording [`SessionState`], one fix at a time.
//!
//! ## Per-fix rules
//!
//! 1. Out-of-range coordinates are rejected with [`TrackerError::InvalidFix`]; the
//!    session is not touched.
//! 2. The first fix only seeds the route. There is nothing to measure from yet.
//! 3. Every later fix adds the haversine distance from the previous coordinate.
//! 4. A fix carrying speed sets the current speed (mph) and raises the max speed.
//!    A fix without speed leaves the current speed as it was.
//! 5. The first fix carrying altitude becomes the reference altitude. Later
//!    altitudes set the vertical drop, positive when below the reference.
//!
//! Fixes must arrive in non-decreasing timestamp order. Nothing here re-sorts or
//! deduplicates: a repeated or out-of-order fix is measured like any other and
//! inflates the distance.

use crate::error::{Result, TrackerError};
use crate::geo_utils::{point_distance_miles, METERS_TO_FEET, MPS_TO_MPH};
use crate::session::{SessionState, SessionStatus};
use crate::PositionFix;

/// What a successfully ingested fix did to the route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FixOutcome {
    /// First coordinate of the session
    Started,
    /// Route extended by this many miles
    Extended { segment_miles: f64 },
}

/// Apply one fix to a recording session.
///
/// Returns [`TrackerError::NotRecording`] unless the session is recording and
/// [`TrackerError::InvalidFix`] for coordinates outside WGS84 bounds. In both cases
/// the session is left exactly as it was.
pub fn ingest(session: &mut SessionState, fix: &PositionFix) -> Result<FixOutcome> {
    if session.status != SessionStatus::Recording {
        return Err(TrackerError::NotRecording { status: session.status });
    }

    let point = fix.point();
    if !point.is_valid() {
        return Err(TrackerError::InvalidFix {
            latitude: fix.latitude,
            longitude: fix.longitude,
        });
    }

    let outcome = match session.route.last() {
        None => FixOutcome::Started,
        Some(last) => {
            let segment_miles = point_distance_miles(last, &point);
            session.distance_miles += segment_miles;
            FixOutcome::Extended { segment_miles }
        }
    };
    session.route.push(point);
    session.current_position = Some(point);

    if let Some(speed_mps) = fix.valid_speed() {
        session.current_speed_mph = speed_mps * MPS_TO_MPH;
        session.max_speed_mph = session.max_speed_mph.max(session.current_speed_mph);
    }

    if let Some(altitude) = fix.valid_altitude() {
        match session.reference_altitude_m {
            Some(reference) => {
                session.vertical_drop_feet = ((reference - altitude) * METERS_TO_FEET).round();
            }
            None => {
                session.reference_altitude_m = Some(altitude);
                session.vertical_drop_feet = 0.0;
            }
        }
    }

    log::debug!(
        "Fix #{} at ({:.5}, {:.5}): {:.3} mi, {:.1} mph, {} ft",
        session.route.len(),
        point.latitude,
        point.longitude,
        session.distance_miles,
        session.current_speed_mph,
        session.vertical_drop_feet
    );

    Ok(outcome)
}

/// Feed a batch of fixes in order.
///
/// Invalid fixes are skipped with a warning. Any other error stops the batch.
/// Returns the number of fixes accepted.
pub fn ingest_all<'a, I>(session: &mut SessionState, fixes: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a PositionFix>,
{
    let mut accepted = 0;
    for fix in fixes {
        match ingest(session, fix) {
            Ok(_) => accepted += 1,
            Err(TrackerError::InvalidFix { latitude, longitude }) => {
                log::warn!("Skipping invalid fix ({}, {})", latitude, longitude);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(accepted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_utils::polyline_length_miles;
    use crate::GpsPoint;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 20, 10, 0, 0).unwrap() + Duration::seconds(secs)
    }

    fn recording() -> SessionState {
        let mut session = SessionState::new();
        session.start(t(0)).unwrap();
        session
    }

    fn descent() -> Vec<PositionFix> {
        (0..8)
            .map(|i| {
                PositionFix::new(37.6308 + i as f64 * 0.0004, -119.0326 - i as f64 * 0.0003, t(i))
            })
            .collect()
    }

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_first_fix_seeds_route_only() {
        let mut session = recording();
        let fix = PositionFix::new(37.6308, -119.0326, t(1))
            .with_speed(4.0)
            .with_altitude(3000.0);

        assert_eq!(ingest(&mut session, &fix).unwrap(), FixOutcome::Started);
        assert_eq!(session.route(), &[GpsPoint::new(37.6308, -119.0326)]);
        assert_eq!(session.distance_miles(), 0.0);
        assert_eq!(session.reference_altitude(), Some(3000.0));
        assert_eq!(session.vertical_drop_feet(), 0.0);
        assert_eq!(session.current_position(), Some(GpsPoint::new(37.6308, -119.0326)));
    }

    #[test]
    fn test_distance_is_sum_of_segments() {
        let mut session = recording();
        let fixes = descent();
        let mut previous = 0.0;

        for fix in &fixes {
            ingest(&mut session, fix).unwrap();
            assert!(session.distance_miles() >= previous);
            previous = session.distance_miles();
        }

        let points: Vec<GpsPoint> = fixes.iter().map(|f| f.point()).collect();
        assert!(approx_eq(session.distance_miles(), polyline_length_miles(&points), 1e-12));
        assert_eq!(session.route().len(), fixes.len());
    }

    #[test]
    fn test_extended_reports_segment() {
        let mut session = recording();
        ingest(&mut session, &PositionFix::new(37.6308, -119.0326, t(0))).unwrap();
        let outcome = ingest(&mut session, &PositionFix::new(37.6328, -119.0346, t(5))).unwrap();

        match outcome {
            FixOutcome::Extended { segment_miles } => {
                assert!(approx_eq(segment_miles, 0.167, 0.01));
                assert_eq!(segment_miles, session.distance_miles());
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_max_speed_never_decreases() {
        let mut session = recording();
        for (i, speed) in [2.0, 5.0, 3.0].into_iter().enumerate() {
            let fix = PositionFix::new(37.63 + i as f64 * 1e-4, -119.03, t(i as i64)).with_speed(speed);
            ingest(&mut session, &fix).unwrap();
        }

        assert!(approx_eq(session.max_speed_mph(), 5.0 * 2.237, 1e-9));
        assert!(approx_eq(session.current_speed_mph(), 3.0 * 2.237, 1e-9));
    }

    #[test]
    fn test_missing_speed_keeps_current_speed() {
        let mut session = recording();
        ingest(&mut session, &PositionFix::new(37.63, -119.03, t(0)).with_speed(4.0)).unwrap();
        ingest(&mut session, &PositionFix::new(37.6301, -119.03, t(1))).unwrap();
        assert!(approx_eq(session.current_speed_mph(), 4.0 * 2.237, 1e-9));
    }

    #[test]
    fn test_negative_or_nan_speed_is_absent() {
        let mut session = recording();
        ingest(&mut session, &PositionFix::new(37.63, -119.03, t(0)).with_speed(3.0)).unwrap();
        ingest(&mut session, &PositionFix::new(37.6301, -119.03, t(1)).with_speed(-1.0)).unwrap();
        ingest(&mut session, &PositionFix::new(37.6302, -119.03, t(2)).with_speed(f64::NAN)).unwrap();

        assert!(approx_eq(session.current_speed_mph(), 3.0 * 2.237, 1e-9));
        assert!(approx_eq(session.max_speed_mph(), 3.0 * 2.237, 1e-9));
    }

    #[test]
    fn test_zero_speed_is_a_reading() {
        let mut session = recording();
        ingest(&mut session, &PositionFix::new(37.63, -119.03, t(0)).with_speed(6.0)).unwrap();
        ingest(&mut session, &PositionFix::new(37.63, -119.03, t(1)).with_speed(0.0)).unwrap();
        assert_eq!(session.current_speed_mph(), 0.0);
        assert!(approx_eq(session.max_speed_mph(), 6.0 * 2.237, 1e-9));
    }

    #[test]
    fn test_vertical_drop_sequence() {
        let mut session = recording();
        let mut drops = Vec::new();
        for (i, altitude) in [3000.0, 2990.0, 2950.0].into_iter().enumerate() {
            let fix = PositionFix::new(37.63 + i as f64 * 1e-4, -119.03, t(i as i64))
                .with_altitude(altitude);
            ingest(&mut session, &fix).unwrap();
            drops.push(session.vertical_drop_feet());
        }

        assert_eq!(
            drops,
            vec![0.0, (10.0_f64 * 3.281).round(), (50.0_f64 * 3.281).round()]
        );
        assert_eq!(drops, vec![0.0, 33.0, 164.0]);
        assert_eq!(session.reference_altitude(), Some(3000.0));
    }

    #[test]
    fn test_reference_altitude_from_first_fix_with_altitude() {
        let mut session = recording();
        ingest(&mut session, &PositionFix::new(37.6300, -119.03, t(0))).unwrap();
        assert!(session.reference_altitude().is_none());

        ingest(&mut session, &PositionFix::new(37.6301, -119.03, t(1)).with_altitude(2800.0)).unwrap();
        ingest(&mut session, &PositionFix::new(37.6302, -119.03, t(2)).with_altitude(2700.0)).unwrap();
        ingest(&mut session, &PositionFix::new(37.6303, -119.03, t(3))).unwrap();

        assert_eq!(session.reference_altitude(), Some(2800.0));
        assert_eq!(session.vertical_drop_feet(), (100.0_f64 * 3.281).round());
    }

    #[test]
    fn test_climb_gives_negative_drop() {
        let mut session = recording();
        ingest(&mut session, &PositionFix::new(37.63, -119.03, t(0)).with_altitude(2500.0)).unwrap();
        ingest(&mut session, &PositionFix::new(37.6301, -119.03, t(1)).with_altitude(2520.0)).unwrap();
        assert_eq!(session.vertical_drop_feet(), -66.0);
    }

    #[test]
    fn test_invalid_fix_leaves_state_untouched() {
        let mut session = recording();
        ingest(&mut session, &PositionFix::new(37.63, -119.03, t(0)).with_speed(2.0)).unwrap();
        let before = session.clone();

        for bad in [
            PositionFix::new(91.0, 0.0, t(1)),
            PositionFix::new(0.0, -180.5, t(1)),
            PositionFix::new(f64::NAN, 0.0, t(1)),
        ] {
            let err = ingest(&mut session, &bad.with_speed(30.0)).unwrap_err();
            assert!(matches!(err, TrackerError::InvalidFix { .. }));
        }
        assert_eq!(session, before);
    }

    #[test]
    fn test_ingest_requires_recording() {
        let fix = PositionFix::new(37.63, -119.03, t(0));

        let mut idle = SessionState::new();
        assert_eq!(
            ingest(&mut idle, &fix).unwrap_err(),
            TrackerError::NotRecording { status: SessionStatus::Idle }
        );
        assert!(idle.route().is_empty());

        let mut stopped = recording();
        stopped.stop(t(10)).unwrap();
        assert!(matches!(
            ingest(&mut stopped, &fix),
            Err(TrackerError::NotRecording { status: SessionStatus::Stopped })
        ));
        assert!(stopped.route().is_empty());
    }

    #[test]
    fn test_ingest_all_skips_invalid() {
        let mut session = recording();
        let fixes = vec![
            PositionFix::new(37.6300, -119.03, t(0)),
            PositionFix::new(120.0, -119.03, t(1)),
            PositionFix::new(37.6302, -119.03, t(2)),
        ];

        assert_eq!(ingest_all(&mut session, &fixes).unwrap(), 2);
        assert_eq!(session.route().len(), 2);
    }

    #[test]
    fn test_ingest_all_stops_when_not_recording() {
        let mut session = SessionState::new();
        let fixes = descent();
        assert!(ingest_all(&mut session, &fixes).is_err());
    }
}
