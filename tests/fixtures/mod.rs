//! Test fixtures for territory-planner.
//!
//! Provides realistic test data including:
//! - Real Lima locations (from OpenStreetMap)
//! - Builders for stops and small synthetic clusters

#![allow(dead_code)]

pub mod lima_locations;

pub use lima_locations::*;

use territory_planner::model::Stop;

/// Stops for `locations`, numbered from `first_id`, all in `group`.
pub fn stops_from(locations: &[Location], first_id: i64, group: &str) -> Vec<Stop> {
    locations
        .iter()
        .enumerate()
        .map(|(i, loc)| {
            Stop::new(first_id + i as i64, loc.lat, loc.lng)
                .with_group(group)
                .with_name(loc.name)
        })
        .collect()
}

/// `n` stops on a small grid (about 100 m spacing) around `(lat, lon)`.
pub fn tight_cluster(n: usize, lat: f64, lon: f64, group: &str) -> Vec<Stop> {
    (0..n)
        .map(|i| {
            let row = (i / 4) as f64;
            let col = (i % 4) as f64;
            Stop::new(i as i64 + 1, lat + row * 0.001, lon + col * 0.001).with_group(group)
        })
        .collect()
}
