//! Lifetime totals over a large synthetic ride history.
//!
//! Run with: cargo run --example history_totals --features parallel

use std::time::Instant;

use chrono::{Duration, TimeZone, Utc};
use ride_tracker::format::format_thousands;
use ride_tracker::{aggregate, aggregate_parallel, MemoryRideStore, RideRecord, RideStore};

fn main() {
    let season_start = Utc.with_ymd_and_hms(2024, 12, 1, 9, 0, 0).unwrap();
    let mut store = MemoryRideStore::new();

    for i in 0..20_000i64 {
        let ride = RideRecord {
            id: String::new(),
            date: season_start + Duration::minutes(i * 7),
            duration_seconds: 240 + (i % 300) as u64,
            distance_miles: 0.5 + (i % 25) as f64 * 0.1,
            max_speed_mph: 15.0 + (i % 20) as f64,
            vertical_drop_feet: 600 + (i % 900),
            route: Vec::new(),
        };
        let ride = RideRecord { id: ride.date.timestamp_millis().to_string(), ..ride };
        store.save(&ride).unwrap();
    }

    let rides = store.load_all().unwrap();
    println!("History Aggregation Example\n");
    println!("{} stored rides\n", rides.len());

    let start = Instant::now();
    let sequential = aggregate(&rides);
    println!("Sequential: {:?}", start.elapsed());

    let start = Instant::now();
    let parallel = aggregate_parallel(&rides);
    println!("Parallel:   {:?}\n", start.elapsed());

    assert_eq!(sequential.total_rides, parallel.total_rides);
    assert_eq!(sequential.total_vertical_feet, parallel.total_vertical_feet);

    println!("Total rides:    {}", format_thousands(parallel.total_rides as i64));
    println!("Total miles:    {:.1}", parallel.total_distance_miles);
    println!("Total vertical: {} ft", format_thousands(parallel.total_vertical_feet));
}
