//! End-to-end: record a ride, persist it next to legacy history, total it up.

use chrono::{DateTime, Duration, TimeZone, Utc};
use ride_tracker::geo_utils::polyline_length_miles;
use ride_tracker::{
    aggregate, ingest, MemoryRideStore, PositionFix, RideRecordBuilder, RideStore, SessionState,
    SessionStatus, TrackerError,
};

fn t(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 8, 10, 0, 0).unwrap() + Duration::seconds(secs)
}

fn run_fixes() -> Vec<PositionFix> {
    (0..12)
        .map(|i| {
            PositionFix::new(37.6308 + i as f64 * 0.0005, -119.0326 - i as f64 * 0.0003, t(i * 4))
                .with_altitude(3200.0 - i as f64 * 9.0)
                .with_speed([3.0, 6.5, 11.2, 9.0][i as usize % 4])
        })
        .collect()
}

#[test]
fn test_full_ride_lifecycle() {
    let mut session = SessionState::new();
    session.start(t(0)).unwrap();

    let fixes = run_fixes();
    for fix in &fixes {
        ingest(&mut session, fix).unwrap();
    }

    let live = session.live_stats(t(30));
    assert_eq!(live.status, SessionStatus::Recording);
    assert_eq!(live.elapsed_seconds, 30);

    let record = RideRecordBuilder::stop_and_build(&mut session, t(60)).unwrap();

    let points: Vec<_> = fixes.iter().map(|f| f.point()).collect();
    let expected_miles = (polyline_length_miles(&points) * 10.0).round() / 10.0;
    assert_eq!(record.distance_miles, expected_miles);
    assert_eq!(record.max_speed_mph, 25.1); // 11.2 m/s
    assert_eq!(record.vertical_drop_feet, (99.0_f64 * 3.281).round() as i64);
    assert_eq!(record.duration_seconds, 60);
    assert_eq!(record.route.len(), 12);

    // No more fixes once stopped
    let late = PositionFix::new(37.64, -119.04, t(61));
    assert!(matches!(ingest(&mut session, &late), Err(TrackerError::NotRecording { .. })));
    assert_eq!(session.route().len(), 12);
}

#[test]
fn test_stop_on_idle_produces_no_ride() {
    let mut session = SessionState::new();
    assert!(session.stop(t(0)).is_err());
    assert!(RideRecordBuilder::build(&session).is_err());
    assert_eq!(session.distance_miles(), 0.0);
}

#[test]
fn test_history_with_legacy_rides() {
    let legacy = r#"[
        {"id":"1709890000000","date":"2024-03-08T09:26:40.000Z","duration":540,
         "distance":"2.25","maxSpeed":"31.0","elevation":750,"coordinates":[]},
        {"id":"1709880000000","date":"2024-03-08T06:40:00.000Z","duration":300,
         "distance":"--","maxSpeed":"18.2","elevation":"500","coordinates":[]}
    ]"#;
    let mut store = MemoryRideStore::from_json(legacy).unwrap();

    let mut session = SessionState::new();
    session.start(t(0)).unwrap();
    for fix in &run_fixes() {
        ingest(&mut session, fix).unwrap();
    }
    let record = RideRecordBuilder::stop_and_build(&mut session, t(60)).unwrap();
    store.save(&record).unwrap();

    let rides = store.load_all().unwrap();
    assert_eq!(rides[0].id, record.id);

    let totals = aggregate(&rides);
    assert_eq!(totals.total_rides, 3);
    assert!((totals.total_distance_miles - (2.25 + record.distance_miles)).abs() < 1e-9);
    assert_eq!(totals.total_vertical_feet, 1250 + record.vertical_drop_feet);

    // Deleting by id and persisting again
    store.delete("1709880000000").unwrap();
    let reloaded = MemoryRideStore::from_json(&store.to_json().unwrap()).unwrap();
    assert_eq!(aggregate(&reloaded.load_all().unwrap()).total_rides, 2);
}

#[test]
fn test_two_rides_stopped_same_instant_get_distinct_ids() {
    let mut store = MemoryRideStore::new();
    let mut ids = Vec::new();
    for _ in 0..2 {
        let mut session = SessionState::new();
        session.start(t(0)).unwrap();
        let record = RideRecordBuilder::stop_and_build(&mut session, t(10)).unwrap();
        ids.push(store.save(&record).unwrap());
    }
    assert_ne!(ids[0], ids[1]);
    assert_eq!(ids[1], format!("{}-1", ids[0]));
}
