//! Manual edits on an already planned group.
//!
//! Both operations take the route list by value and validate every lookup
//! before moving anything, so a failed call leaves the caller's data as it
//! was.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::PlannerOptions;
use crate::error::{Error, Result};
use crate::metrics::{MetricsSettings, score};
use crate::model::{Route, Stop, StopId, TargetBand};
use crate::sequence::sequence;

/// Destination of a reassignment. Serialized as the route id, or `-1` for a
/// route created on the fly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum RouteTarget {
    Existing(u32),
    CreateNew,
}

impl TryFrom<i64> for RouteTarget {
    type Error = String;

    fn try_from(value: i64) -> std::result::Result<Self, Self::Error> {
        if value < 0 {
            return Ok(RouteTarget::CreateNew);
        }
        u32::try_from(value)
            .map(RouteTarget::Existing)
            .map_err(|_| format!("route id {} out of range", value))
    }
}

impl From<RouteTarget> for i64 {
    fn from(target: RouteTarget) -> Self {
        match target {
            RouteTarget::Existing(id) => id.into(),
            RouteTarget::CreateNew => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReassignRequest {
    #[serde(default)]
    pub group: String,
    pub stop_id: StopId,
    pub from_route: u32,
    pub to_route: RouteTarget,
    pub band: TargetBand,
    pub routes: Vec<Route>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkReassignRequest {
    #[serde(default)]
    pub group: String,
    pub stop_ids: Vec<StopId>,
    pub to_route: RouteTarget,
    pub band: TargetBand,
    pub routes: Vec<Route>,
}

/// Full route list after the edit; untouched routes are returned as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReassignOutcome {
    pub group: String,
    pub routes: Vec<Route>,
}

/// Moves the first occurrence of `stop_id` in `from_route` to `to_route`.
///
/// Both routes are re-sequenced, re-scored and flagged as manually edited.
pub fn reassign_stop(request: ReassignRequest, options: &PlannerOptions) -> Result<ReassignOutcome> {
    let ReassignRequest {
        group,
        stop_id,
        from_route,
        to_route,
        band,
        mut routes,
    } = request;

    if to_route == RouteTarget::Existing(from_route) {
        return Err(Error::invalid_input(format!(
            "stop {} is already in route {}",
            stop_id, from_route
        )));
    }

    let source = route_index(&routes, from_route)?;
    let position = routes[source]
        .position_of(&stop_id)
        .ok_or_else(|| Error::not_found(format!("stop {} not in route {}", stop_id, from_route)))?;
    let destination = resolve_target(&mut routes, to_route)?;

    let stop = routes[source].stops.remove(position);
    routes[destination].stops.push(stop);

    let settings = MetricsSettings::from(options);
    for index in [source, destination] {
        refresh(&mut routes[index], &band, &settings);
    }

    info!(
        group = group.as_str(),
        stop = %stop_id,
        from = from_route,
        to = routes[destination].id,
        "stop reassigned"
    );

    Ok(ReassignOutcome { group, routes })
}

/// Moves every occurrence of the listed ids, from any other route, into
/// `to_route`.
///
/// Ids that are not found are skipped; the call fails only when none of them
/// is found. The destination and every route that lost a stop are refreshed.
pub fn reassign_bulk(request: BulkReassignRequest, options: &PlannerOptions) -> Result<ReassignOutcome> {
    let BulkReassignRequest {
        group,
        stop_ids,
        to_route,
        band,
        mut routes,
    } = request;

    if stop_ids.is_empty() {
        return Err(Error::invalid_input("no stops to reassign"));
    }

    let destination_id = match to_route {
        RouteTarget::Existing(id) => {
            route_index(&routes, id)?;
            Some(id)
        }
        RouteTarget::CreateNew => None,
    };
    let listed = |stop: &Stop| stop_ids.iter().any(|id| stop.id.matches(id));

    let touched: Vec<usize> = routes
        .iter()
        .enumerate()
        .filter(|(_, route)| Some(route.id) != destination_id)
        .filter(|(_, route)| route.stops.iter().any(listed))
        .map(|(i, _)| i)
        .collect();
    if touched.is_empty() {
        return Err(Error::not_found(format!(
            "none of the {} listed stops is outside the destination",
            stop_ids.len()
        )));
    }

    let destination = resolve_target(&mut routes, to_route)?;

    let mut moving = Vec::new();
    for &index in &touched {
        let (leaving, staying): (Vec<Stop>, Vec<Stop>) =
            std::mem::take(&mut routes[index].stops).into_iter().partition(listed);
        debug!(route = routes[index].id, moved = leaving.len(), "stops leaving route");
        routes[index].stops = staying;
        moving.extend(leaving);
    }
    let moved = moving.len();
    routes[destination].stops.extend(moving);

    let settings = MetricsSettings::from(options);
    for index in touched.into_iter().chain(std::iter::once(destination)) {
        refresh(&mut routes[index], &band, &settings);
    }

    info!(
        group = group.as_str(),
        moved,
        to = routes[destination].id,
        "bulk reassignment"
    );

    Ok(ReassignOutcome { group, routes })
}

fn route_index(routes: &[Route], id: u32) -> Result<usize> {
    routes
        .iter()
        .position(|route| route.id == id)
        .ok_or_else(|| Error::not_found(format!("route {}", id)))
}

/// Index of the destination, appending a new empty route if requested.
fn resolve_target(routes: &mut Vec<Route>, target: RouteTarget) -> Result<usize> {
    match target {
        RouteTarget::Existing(id) => route_index(routes, id),
        RouteTarget::CreateNew => {
            let id = routes.iter().map(|r| r.id).max().unwrap_or(0) + 1;
            routes.push(Route::new(id, Vec::new()));
            Ok(routes.len() - 1)
        }
    }
}

fn refresh(route: &mut Route, band: &TargetBand, settings: &MetricsSettings) {
    route.stops = sequence(std::mem::take(&mut route.stops));
    score(route, band, settings);
    route.manually_edited = true;
}
