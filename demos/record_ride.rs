//! Record a short synthetic run down Mammoth and save it.
//!
//! Run with: cargo run --example record_ride

use chrono::{Duration, Utc};
use ride_tracker::format::{format_clock, format_ride_summary};
use ride_tracker::{
    aggregate, ingest_all, MemoryRideStore, PositionFix, RideRecordBuilder, RideStore,
    SessionState, TrackerConfig,
};

fn main() {
    let config = TrackerConfig::default();
    let start = Utc::now();

    // One fix every 5 seconds heading down the fall line
    let fixes: Vec<PositionFix> = (0..24)
        .map(|i| {
            PositionFix::new(
                37.6308 + i as f64 * 0.0006,
                -119.0326 - i as f64 * 0.0004,
                start + Duration::seconds(i * 5),
            )
            .with_altitude(3300.0 - i as f64 * 12.5)
            .with_speed(4.0 + (i % 6) as f64 * 1.8)
        })
        .collect();

    let mut session = SessionState::new();
    session.start(start).expect("fresh session starts");

    let accepted = ingest_all(&mut session, &fixes).expect("session is recording");
    let stats = session.live_stats(start + Duration::seconds(118));
    let region = session.map_region(&config);

    println!("Ride Recording Example\n");
    println!("Accepted {} fixes", accepted);
    println!(
        "Live: {:.1} mph, {:.2} mi, {:.0} ft, {}",
        stats.current_speed_mph,
        stats.distance_miles,
        stats.vertical_drop_feet,
        format_clock(stats.elapsed_seconds)
    );
    println!("Map centered on ({:.4}, {:.4})\n", region.latitude, region.longitude);

    let ride = RideRecordBuilder::stop_and_build(&mut session, start + Duration::seconds(120))
        .expect("recording session stops");
    println!("Ride Saved!\n{}\n", format_ride_summary(&ride));

    let mut store = MemoryRideStore::new();
    let id = store.save(&ride).expect("memory store accepts ride");
    let totals = aggregate(&store.load_all().expect("memory store loads"));
    println!("Stored as {}", id);
    println!(
        "Lifetime: {} rides, {:.1} mi, {} ft",
        totals.total_rides, totals.total_distance_miles, totals.total_vertical_feet
    );
}
