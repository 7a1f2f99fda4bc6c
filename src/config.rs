//! Request parameters and tunable planner constants.

use serde::{Deserialize, Serialize};

/// How often each stop must be covered; drives the number of routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
}

impl Frequency {
    /// Routes per cycle, including the extra weekend routes when active.
    pub fn route_count(self, weekend_active: bool) -> usize {
        let (base, weekend) = match self {
            Frequency::Weekly => (5, 1),
            Frequency::Biweekly => (10, 2),
            Frequency::Monthly => (20, 4),
        };
        if weekend_active { base + weekend } else { base }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanMode {
    /// Each group is a salesperson with a fixed number of routes per cycle.
    Assigned,
    /// Each group is a territory sized by capacity; stops may need several visits.
    Territory,
}

/// Per-request parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    pub frequency: Frequency,
    #[serde(default)]
    pub weekend_active: bool,
    /// Allowed deviation from the average route size, in `[0, 1)`.
    pub flex_tolerance: f64,
    pub mode: PlanMode,
    /// Stops per route in territory mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_capacity: Option<i64>,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            frequency: Frequency::Weekly,
            weekend_active: false,
            flex_tolerance: 0.2,
            mode: PlanMode::Assigned,
            target_capacity: None,
        }
    }
}

impl PlanConfig {
    pub fn assigned(frequency: Frequency, weekend_active: bool, flex_tolerance: f64) -> Self {
        Self {
            frequency,
            weekend_active,
            flex_tolerance,
            mode: PlanMode::Assigned,
            target_capacity: None,
        }
    }

    pub fn territory(capacity: i64, weekend_active: bool, flex_tolerance: f64) -> Self {
        Self {
            weekend_active,
            flex_tolerance,
            mode: PlanMode::Territory,
            target_capacity: Some(capacity),
            ..Self::default()
        }
    }
}

/// Empirical constants of the heuristics.
///
/// Defaults were tuned on urban Lima; distances are in kilometres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerOptions {
    /// H3 resolution used to bucket stops.
    pub h3_resolution: u8,
    /// Maximum centroid distance for merging a small cluster into another.
    pub max_merge_distance_km: f64,
    /// Second-tier size cap during forced reduction, as a multiple of the average.
    pub reduction_overflow_factor: f64,
    /// Routes above `floor(average * rich_factor)` donate stops.
    pub rich_factor: f64,
    /// Informational lower threshold, `ceil(average * poor_factor)`.
    pub poor_factor: f64,
    /// Receiver search radius as a multiple of `max_merge_distance_km`.
    pub receiver_search_factor: f64,
    /// A stop only moves if it is this close to the receiver's centroid.
    pub max_transfer_distance_km: f64,
    /// Cap on stops moved per donor per balancing pass.
    pub max_transfer_per_pass: usize,
    pub balance_passes: usize,
    pub collision_passes: usize,
    pub kmeans_max_iterations: usize,
    /// Average travel speed between stops.
    pub speed_kmh: f64,
    /// Time spent at each stop.
    pub minutes_per_stop: f64,
    pub max_dispersion_km: f64,
    pub max_route_distance_km: f64,
    pub workday_minutes: f64,
    /// Territory capacity multiplier when weekend work is active
    /// (5.5 effective shifts spread over 6 people).
    pub weekend_capacity_factor: f64,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            h3_resolution: 9,
            max_merge_distance_km: 5.0,
            reduction_overflow_factor: 1.5,
            rich_factor: 1.1,
            poor_factor: 0.9,
            receiver_search_factor: 1.5,
            max_transfer_distance_km: 6.0,
            max_transfer_per_pass: 5,
            balance_passes: 10,
            collision_passes: 2,
            kmeans_max_iterations: 100,
            speed_kmh: 20.0,
            minutes_per_stop: 10.0,
            max_dispersion_km: 5.0,
            max_route_distance_km: 25.0,
            workday_minutes: 480.0,
            weekend_capacity_factor: 0.916,
        }
    }
}
