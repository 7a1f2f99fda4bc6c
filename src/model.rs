//! Domain types: stops, routes and the target size band.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::traits::Located;

/// Externally assigned stop identity. Either a number or a string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StopId {
    Number(i64),
    Text(String),
}

impl StopId {
    /// Loose comparison used by reassignment lookups: `42` matches `"42"`.
    pub fn matches(&self, other: &StopId) -> bool {
        match (self, other) {
            (StopId::Number(a), StopId::Number(b)) => a == b,
            (StopId::Text(a), StopId::Text(b)) => a == b,
            _ => self.to_string() == other.to_string(),
        }
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopId::Number(n) => write!(f, "{}", n),
            StopId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for StopId {
    fn from(value: i64) -> Self {
        StopId::Number(value)
    }
}

impl From<i32> for StopId {
    fn from(value: i32) -> Self {
        StopId::Number(value.into())
    }
}

impl From<&str> for StopId {
    fn from(value: &str) -> Self {
        StopId::Text(value.to_string())
    }
}

impl From<String> for StopId {
    fn from(value: String) -> Self {
        StopId::Text(value)
    }
}

fn default_multiplier() -> i64 {
    1
}

/// A point of sale to be visited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: StopId,
    pub lat: f64,
    pub lon: f64,
    /// Partition key (salesperson or territory).
    #[serde(default)]
    pub group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subchannel: Option<String>,
    /// Required visits per cycle. Values below 1 count as 1.
    #[serde(default = "default_multiplier")]
    pub visit_multiplier: i64,
    /// Position in the walk, 1-based. Absent until sequenced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    /// H3 cell the stop was bucketed into.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell: Option<String>,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl Stop {
    pub fn new(id: impl Into<StopId>, lat: f64, lon: f64) -> Self {
        Self {
            id: id.into(),
            lat,
            lon,
            group: String::new(),
            name: None,
            district: None,
            subchannel: None,
            visit_multiplier: 1,
            order: None,
            cell: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_district(mut self, district: impl Into<String>) -> Self {
        self.district = Some(district.into());
        self
    }

    pub fn with_multiplier(mut self, multiplier: i64) -> Self {
        self.visit_multiplier = multiplier;
        self
    }

    /// Number of route occurrences this stop expands into.
    pub fn visits(&self) -> usize {
        self.visit_multiplier.max(1) as usize
    }
}

impl Located for Stop {
    fn lat(&self) -> f64 {
        self.lat
    }

    fn lon(&self) -> f64 {
        self.lon
    }
}

/// Target route-size window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetBand {
    pub min: usize,
    pub max: usize,
    pub average: f64,
}

impl TargetBand {
    /// Band for `total` stops spread over `routes` routes.
    pub fn for_routes(total: usize, routes: usize, flex: f64) -> Self {
        let average = if routes == 0 { 0.0 } else { total as f64 / routes as f64 };
        Self::around(average, flex)
    }

    /// Band centred on a fixed capacity.
    pub fn around(average: f64, flex: f64) -> Self {
        let min = ((average * (1.0 - flex)).floor() as usize).max(1);
        let max = ((average * (1.0 + flex)).ceil() as usize).max(min);
        Self {
            min,
            max,
            average,
        }
    }

    pub fn contains(&self, size: usize) -> bool {
        size >= self.min && size <= self.max
    }

    /// Copy with the average rounded to two decimals, as reported.
    pub fn reported(&self) -> Self {
        Self {
            average: (self.average * 100.0).round() / 100.0,
            ..*self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteStatus {
    Ok,
    Underutilized,
    Overloaded,
    /// Empty route just created by a reassignment.
    New,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteWarning {
    BelowMinimum,
    AboveMaximum,
    TooDispersed,
    TooLong,
    ExceedsWorkday,
}

impl fmt::Display for RouteWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RouteWarning::BelowMinimum => "stop count below minimum",
            RouteWarning::AboveMaximum => "stop count above maximum",
            RouteWarning::TooDispersed => "route too dispersed",
            RouteWarning::TooLong => "route too long",
            RouteWarning::ExceedsWorkday => "estimated time exceeds workday",
        };
        f.write_str(text)
    }
}

/// An ordered group of stops assigned to one person for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: u32,
    pub stops: Vec<Stop>,
    pub total_stops: usize,
    pub total_distance_km: f64,
    pub estimated_minutes: u32,
    pub dispersion_radius_km: f64,
    pub status: RouteStatus,
    #[serde(default)]
    pub warnings: Vec<RouteWarning>,
    #[serde(default)]
    pub manually_edited: bool,
}

impl Route {
    /// Unscored route holding `stops`.
    pub fn new(id: u32, stops: Vec<Stop>) -> Self {
        Self {
            id,
            total_stops: stops.len(),
            stops,
            total_distance_km: 0.0,
            estimated_minutes: 0,
            dispersion_radius_km: 0.0,
            status: RouteStatus::New,
            warnings: Vec::new(),
            manually_edited: false,
        }
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn contains(&self, id: &StopId) -> bool {
        self.stops.iter().any(|stop| stop.id.matches(id))
    }

    /// Position of the first stop whose id matches.
    pub fn position_of(&self, id: &StopId) -> Option<usize> {
        self.stops.iter().position(|stop| stop.id.matches(id))
    }
}
