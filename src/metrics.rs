//! Per-route distance, time and quality checks.

use serde::{Deserialize, Serialize};

use crate::config::PlannerOptions;
use crate::haversine::{centroid, haversine_km, path_length_km, round2};
use crate::model::{Route, RouteStatus, RouteWarning, Stop, TargetBand};
use crate::traits::Located;

#[derive(Debug, Clone)]
pub struct MetricsSettings {
    pub speed_kmh: f64,
    pub minutes_per_stop: f64,
    pub max_dispersion_km: f64,
    pub max_route_distance_km: f64,
    pub workday_minutes: f64,
}

impl From<&PlannerOptions> for MetricsSettings {
    fn from(options: &PlannerOptions) -> Self {
        Self {
            speed_kmh: options.speed_kmh,
            minutes_per_stop: options.minutes_per_stop,
            max_dispersion_km: options.max_dispersion_km,
            max_route_distance_km: options.max_route_distance_km,
            workday_minutes: options.workday_minutes,
        }
    }
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self::from(&PlannerOptions::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteMetrics {
    pub total_stops: usize,
    pub total_distance_km: f64,
    pub estimated_minutes: u32,
    pub dispersion_radius_km: f64,
    pub status: RouteStatus,
    pub warnings: Vec<RouteWarning>,
}

/// Evaluates stops in their current order.
pub fn evaluate(stops: &[Stop], band: &TargetBand, settings: &MetricsSettings) -> RouteMetrics {
    let total = stops.len();

    let radius = centroid(stops)
        .map(|center| {
            stops
                .iter()
                .map(|s| haversine_km(center, s.point()))
                .fold(0.0, f64::max)
        })
        .unwrap_or(0.0);

    let distance = round2(path_length_km(stops));
    let minutes = if total == 0 {
        0.0
    } else {
        (distance / settings.speed_kmh) * 60.0 + total as f64 * settings.minutes_per_stop
    };
    let minutes = minutes.round();

    let status = if total < band.min {
        RouteStatus::Underutilized
    } else if total > band.max {
        RouteStatus::Overloaded
    } else {
        RouteStatus::Ok
    };

    let mut warnings = Vec::new();
    if total < band.min {
        warnings.push(RouteWarning::BelowMinimum);
    }
    if total > band.max {
        warnings.push(RouteWarning::AboveMaximum);
    }
    if radius > settings.max_dispersion_km {
        warnings.push(RouteWarning::TooDispersed);
    }
    if distance > settings.max_route_distance_km {
        warnings.push(RouteWarning::TooLong);
    }
    if minutes > settings.workday_minutes {
        warnings.push(RouteWarning::ExceedsWorkday);
    }

    RouteMetrics {
        total_stops: total,
        total_distance_km: distance,
        estimated_minutes: minutes as u32,
        dispersion_radius_km: round2(radius),
        status,
        warnings,
    }
}

/// Evaluates the route and stores the result on it.
pub fn score(route: &mut Route, band: &TargetBand, settings: &MetricsSettings) {
    let metrics = evaluate(&route.stops, band, settings);
    route.total_stops = metrics.total_stops;
    route.total_distance_km = metrics.total_distance_km;
    route.estimated_minutes = metrics.estimated_minutes;
    route.dispersion_radius_km = metrics.dispersion_radius_km;
    route.status = metrics.status;
    route.warnings = metrics.warnings;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(min: usize, max: usize) -> TargetBand {
        TargetBand {
            min,
            max,
            average: (min + max) as f64 / 2.0,
        }
    }

    #[test]
    fn test_single_stop_route() {
        let stops = vec![Stop::new(1, -12.1, -77.0)];
        let m = evaluate(&stops, &band(1, 3), &MetricsSettings::default());
        assert_eq!(m.total_distance_km, 0.0);
        assert_eq!(m.dispersion_radius_km, 0.0);
        assert_eq!(m.estimated_minutes, 10);
        assert_eq!(m.status, RouteStatus::Ok);
        assert!(m.warnings.is_empty());
    }

    #[test]
    fn test_empty_route_is_underutilized() {
        let m = evaluate(&[], &band(1, 3), &MetricsSettings::default());
        assert_eq!(m.total_stops, 0);
        assert_eq!(m.estimated_minutes, 0);
        assert_eq!(m.status, RouteStatus::Underutilized);
        assert_eq!(m.warnings, vec![RouteWarning::BelowMinimum]);
    }

    #[test]
    fn test_distance_and_time() {
        // two legs of 0.1 degree of longitude at the equator
        let stops = vec![
            Stop::new(1, 0.0, 0.0),
            Stop::new(2, 0.0, 0.1),
            Stop::new(3, 0.0, 0.2),
        ];
        let m = evaluate(&stops, &band(1, 5), &MetricsSettings::default());
        assert!((m.total_distance_km - 22.24).abs() < 0.02, "got {}", m.total_distance_km);
        // 22.24 km at 20 km/h = 66.7 min, plus 3 stops * 10 min
        assert_eq!(m.estimated_minutes, 97);
        assert!((m.dispersion_radius_km - 11.12).abs() < 0.02);
        assert!(m.warnings.contains(&RouteWarning::TooDispersed));
        assert!(!m.warnings.contains(&RouteWarning::TooLong));
    }

    #[test]
    fn test_status_and_warnings_are_independent() {
        let stops: Vec<Stop> = (0..60)
            .map(|i| Stop::new(i, -12.0 - i as f64 * 0.01, -77.0))
            .collect();
        let m = evaluate(&stops, &band(10, 20), &MetricsSettings::default());
        assert_eq!(m.status, RouteStatus::Overloaded);
        assert_eq!(
            m.warnings,
            vec![
                RouteWarning::AboveMaximum,
                RouteWarning::TooDispersed,
                RouteWarning::TooLong,
                RouteWarning::ExceedsWorkday,
            ]
        );
    }

    #[test]
    fn test_score_writes_back() {
        let mut route = Route::new(3, vec![Stop::new(1, -12.1, -77.0), Stop::new(2, -12.1, -77.01)]);
        score(&mut route, &band(3, 5), &MetricsSettings::default());
        assert_eq!(route.total_stops, 2);
        assert_eq!(route.status, RouteStatus::Underutilized);
        assert!(route.total_distance_km > 1.0 && route.total_distance_km < 1.2);
    }
}
