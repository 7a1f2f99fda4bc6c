//! Routing planner solver.
//!
//! Runs the full pipeline for every group: H3 bucketing, splitting of
//! oversized buckets, spatial fusion, forced reduction, load balancing,
//! collision resolution (territory mode), then ordering and scoring.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::balance::{BalanceSettings, balance};
use crate::collision::resolve_collisions;
use crate::config::{Frequency, PlanConfig, PlanMode, PlannerOptions};
use crate::error::{Error, Result};
use crate::kmeans::KMeans;
use crate::merge::{fuse, reduce};
use crate::metrics::{MetricsSettings, score};
use crate::model::{Route, Stop, StopId, TargetBand};
use crate::sequence::sequence;
use crate::spatial::SpatialIndexer;
use crate::subcluster::{Cluster, SubClusterer};
use crate::traits::Partitioner;
use crate::validate::{audit_routes, validate_config, validate_stops};

/// Conditions that were handled but should be surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanNotice {
    /// Fewer stops than the frequency asks routes for.
    RouteCountClamped { requested: usize, used: usize },
    /// A visit multiplier exceeded the routes available; the duplicate stayed.
    UnresolvableCollision { stop_id: StopId, route_id: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupPlan {
    pub group: String,
    /// Route occurrences planned (after visit expansion in territory mode).
    pub total_stops: usize,
    pub unique_stops: usize,
    pub route_count: usize,
    pub band: TargetBand,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_used: Option<usize>,
    pub routes: Vec<Route>,
    #[serde(default)]
    pub notices: Vec<PlanNotice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub mode: PlanMode,
    pub frequency: Frequency,
    pub weekend_active: bool,
    pub flex_tolerance: f64,
    pub groups: Vec<GroupPlan>,
}

/// Plans every group with the default k-means splitter.
pub fn solve(stops: &[Stop], config: &PlanConfig, options: &PlannerOptions) -> Result<Plan> {
    solve_with(stops, config, options, &KMeans::new(options.kmeans_max_iterations))
}

/// Plans every group, splitting oversized buckets with `partitioner`.
///
/// Groups are independent and run in parallel; output is in group-key order.
pub fn solve_with<P>(
    stops: &[Stop],
    config: &PlanConfig,
    options: &PlannerOptions,
    partitioner: &P,
) -> Result<Plan>
where
    P: Partitioner + Sync,
{
    validate_config(config, options)?;
    validate_stops(stops)?;

    let mut grouped: BTreeMap<&str, Vec<Stop>> = BTreeMap::new();
    for stop in stops {
        grouped.entry(stop.group.as_str()).or_default().push(stop.clone());
    }
    let grouped: Vec<(&str, Vec<Stop>)> = grouped.into_iter().collect();

    let groups = grouped
        .into_par_iter()
        .map(|(group, stops)| plan_group(group, stops, config, options, partitioner))
        .collect::<Result<Vec<_>>>()?;

    Ok(Plan {
        mode: config.mode,
        frequency: config.frequency,
        weekend_active: config.weekend_active,
        flex_tolerance: config.flex_tolerance,
        groups,
    })
}

/// Working set, route target and band for one group.
struct GroupSetup {
    stops: Vec<Stop>,
    desired: usize,
    band: TargetBand,
    capacity_used: Option<usize>,
    notices: Vec<PlanNotice>,
}

fn setup_assigned(group: &str, stops: Vec<Stop>, config: &PlanConfig) -> GroupSetup {
    let requested = config.frequency.route_count(config.weekend_active);
    let desired = requested.min(stops.len());
    let mut notices = Vec::new();
    if desired < requested {
        warn!(group, requested, used = desired, "fewer stops than routes; route count clamped");
        notices.push(PlanNotice::RouteCountClamped {
            requested,
            used: desired,
        });
    }

    GroupSetup {
        band: TargetBand::for_routes(stops.len(), desired, config.flex_tolerance),
        stops,
        desired,
        capacity_used: None,
        notices,
    }
}

fn setup_territory(
    group: &str,
    stops: Vec<Stop>,
    config: &PlanConfig,
    options: &PlannerOptions,
) -> Result<GroupSetup> {
    let capacity = match config.target_capacity {
        Some(capacity) if capacity > 0 => capacity,
        _ => return Err(Error::invalid_input("territory mode requires a positive target capacity")),
    };
    let effective = if config.weekend_active {
        (capacity as f64 * options.weekend_capacity_factor).floor() as i64
    } else {
        capacity
    };
    if effective < 1 {
        return Err(Error::infeasible(format!(
            "capacity {} leaves no room once adjusted for weekend work",
            capacity
        )));
    }
    let effective = effective as usize;

    let mut expanded = Vec::with_capacity(stops.len());
    for stop in stops {
        for _ in 1..stop.visits() {
            expanded.push(stop.clone());
        }
        expanded.push(stop);
    }

    let desired = expanded.len().div_ceil(effective).max(1);
    debug!(group, visits = expanded.len(), capacity = effective, desired, "territory expanded");

    Ok(GroupSetup {
        stops: expanded,
        desired,
        band: TargetBand::around(effective as f64, config.flex_tolerance),
        capacity_used: Some(effective),
        notices: Vec::new(),
    })
}

fn plan_group<P: Partitioner>(
    group: &str,
    stops: Vec<Stop>,
    config: &PlanConfig,
    options: &PlannerOptions,
    partitioner: &P,
) -> Result<GroupPlan> {
    let unique_stops = stops.len();
    let territory = config.mode == PlanMode::Territory;
    let GroupSetup {
        stops,
        desired,
        band,
        capacity_used,
        mut notices,
    } = if territory {
        setup_territory(group, stops, config, options)?
    } else {
        setup_assigned(group, stops, config)
    };

    let total_stops = stops.len();
    info!(
        group,
        total_stops,
        desired,
        min = band.min,
        max = band.max,
        average = band.average,
        "planning group"
    );

    let expected: Vec<StopId> = stops.iter().map(|s| s.id.clone()).collect();

    let buckets = SpatialIndexer::new(options.h3_resolution)?.bucket(stops)?;
    debug!(group, cells = buckets.len(), "bucketed");

    let candidates = SubClusterer::new(partitioner).split(buckets, &band);
    debug!(group, candidates = candidates.len(), "split");

    let fused = fuse(candidates, &band, options.max_merge_distance_km);
    let reduced = reduce(fused, &band, desired, options.reduction_overflow_factor);
    let balanced = balance(reduced, &band, &BalanceSettings::from(options));

    let (clusters, unresolved) = if territory {
        resolve_collisions(balanced, options.collision_passes)
    } else {
        (balanced, Vec::new())
    };

    let (routes, route_ids) = finalize(clusters, &band, &MetricsSettings::from(options));

    notices.extend(unresolved.into_iter().map(|u| PlanNotice::UnresolvableCollision {
        stop_id: u.stop_id,
        route_id: route_ids[u.route],
    }));

    let report = audit_routes(&expected, &routes);
    let expected_duplicates = notices
        .iter()
        .filter(|n| matches!(n, PlanNotice::UnresolvableCollision { .. }))
        .count();
    if !report.missing.is_empty()
        || !report.unexpected.is_empty()
        || report.duplicated.len() != expected_duplicates
    {
        warn!(group, ?report, "route assignment audit failed");
    }

    info!(group, routes = routes.len(), "group planned");

    Ok(GroupPlan {
        group: group.to_string(),
        total_stops,
        unique_stops,
        route_count: routes.len(),
        band: band.reported(),
        capacity_used,
        routes,
        notices,
    })
}

/// Numbers clusters 1..n by descending size, orders and scores them.
///
/// Also returns the new id of each input cluster, by input position.
fn finalize(clusters: Vec<Cluster>, band: &TargetBand, metrics: &MetricsSettings) -> (Vec<Route>, Vec<u32>) {
    let mut indexed: Vec<(usize, Cluster)> = clusters.into_iter().enumerate().collect();
    indexed.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    let mut route_ids = vec![0u32; indexed.len()];
    let routes = indexed
        .into_iter()
        .enumerate()
        .map(|(position, (original, stops))| {
            let id = position as u32 + 1;
            route_ids[original] = id;
            let mut route = Route::new(id, sequence(stops));
            score(&mut route, band, metrics);
            route
        })
        .collect();

    (routes, route_ids)
}
