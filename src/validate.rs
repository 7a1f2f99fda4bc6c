//! Input validation and post-hoc assignment audits.

use std::collections::{BTreeMap, HashSet};

use h3o::Resolution;

use crate::config::{PlanConfig, PlanMode, PlannerOptions};
use crate::error::{Error, Result};
use crate::model::{Route, Stop, StopId};

/// Rejects configurations the pipeline cannot run with.
pub fn validate_config(config: &PlanConfig, options: &PlannerOptions) -> Result<()> {
    let flex = config.flex_tolerance;
    if !flex.is_finite() || !(0.0..1.0).contains(&flex) {
        return Err(Error::invalid_input(format!(
            "flex tolerance must be in [0, 1), got {}",
            flex
        )));
    }

    if config.mode == PlanMode::Territory {
        match config.target_capacity {
            Some(capacity) if capacity > 0 => {}
            Some(capacity) => {
                return Err(Error::invalid_input(format!(
                    "target capacity must be positive, got {}",
                    capacity
                )));
            }
            None => return Err(Error::invalid_input("territory mode requires a target capacity")),
        }
    }

    Resolution::try_from(options.h3_resolution).map_err(|_| {
        Error::invalid_input(format!("invalid H3 resolution {}", options.h3_resolution))
    })?;

    Ok(())
}

/// Checks coordinates and per-group identity uniqueness.
pub fn validate_stops(stops: &[Stop]) -> Result<()> {
    if stops.is_empty() {
        return Err(Error::invalid_input("no stops to plan"));
    }

    let mut seen: HashSet<(&str, String)> = HashSet::new();
    for stop in stops {
        validate_coordinates(stop)?;
        if !seen.insert((stop.group.as_str(), stop.id.to_string())) {
            return Err(Error::invalid_input(format!(
                "duplicate stop id {} in group '{}'",
                stop.id, stop.group
            )));
        }
    }

    Ok(())
}

pub(crate) fn validate_coordinates(stop: &Stop) -> Result<()> {
    let lat_ok = stop.lat.is_finite() && (-90.0..=90.0).contains(&stop.lat);
    let lon_ok = stop.lon.is_finite() && (-180.0..=180.0).contains(&stop.lon);
    if lat_ok && lon_ok {
        Ok(())
    } else {
        Err(Error::invalid_input(format!(
            "stop {} has invalid coordinates ({}, {})",
            stop.id, stop.lat, stop.lon
        )))
    }
}

/// Differences between the ids a set of routes should hold and what it holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    /// Expected occurrences that no route holds.
    pub missing: Vec<StopId>,
    /// Occurrences in routes beyond what was expected.
    pub unexpected: Vec<StopId>,
    /// Ids held more than once by the same route, with the route id.
    pub duplicated: Vec<(u32, StopId)>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty() && self.duplicated.is_empty()
    }
}

/// Compares the multiset of ids across `routes` with `expected`.
pub fn audit_routes<'a, I>(expected: I, routes: &[Route]) -> AuditReport
where
    I: IntoIterator<Item = &'a StopId>,
{
    let mut balance: BTreeMap<String, (StopId, i64)> = BTreeMap::new();
    for id in expected {
        balance.entry(id.to_string()).or_insert_with(|| (id.clone(), 0)).1 += 1;
    }

    let mut report = AuditReport::default();
    for route in routes {
        let mut in_route: HashSet<String> = HashSet::new();
        for stop in &route.stops {
            let key = stop.id.to_string();
            if !in_route.insert(key.clone()) {
                report.duplicated.push((route.id, stop.id.clone()));
            }
            balance.entry(key).or_insert_with(|| (stop.id.clone(), 0)).1 -= 1;
        }
    }

    for (id, count) in balance.into_values() {
        if count > 0 {
            report.missing.extend(std::iter::repeat_n(id, count as usize));
        } else if count < 0 {
            report.unexpected.extend(std::iter::repeat_n(id, (-count) as usize));
        }
    }

    report
}
