//! Spatial fusion of small candidates and forced reduction of the route count.

use tracing::debug;

use crate::haversine::{GeoPoint, centroid, haversine_km};
use crate::model::TargetBand;
use crate::subcluster::Cluster;

/// Distance between cluster centroids. Empty clusters are treated as
/// infinitely far so they never win a nearest search.
fn centroid_distance(a: Option<GeoPoint>, b: &Cluster) -> f64 {
    match (a, centroid(b)) {
        (Some(a), Some(b)) => haversine_km(a, b),
        _ => f64::INFINITY,
    }
}

/// Merges candidates below `band.min` into the nearest adequate candidate
/// within `max_merge_distance_km` that can absorb them without exceeding
/// `band.max`. Small candidates are handled largest first; those that find
/// no partner are kept as they are.
///
/// Output order: adequate candidates (with merges) then the leftovers.
pub fn fuse(candidates: Vec<Cluster>, band: &TargetBand, max_merge_distance_km: f64) -> Vec<Cluster> {
    let (mut adequate, mut small): (Vec<Cluster>, Vec<Cluster>) =
        candidates.into_iter().partition(|c| c.len() >= band.min);

    small.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut pending = Vec::new();
    let mut merged = 0usize;

    for candidate in small {
        let origin = centroid(&candidate);
        let mut best: Option<(usize, f64)> = None;

        for (i, target) in adequate.iter().enumerate() {
            let dist = centroid_distance(origin, target);
            if dist > max_merge_distance_km || target.len() + candidate.len() > band.max {
                continue;
            }
            if best.is_none_or(|(_, best_dist)| dist < best_dist) {
                best = Some((i, dist));
            }
        }

        match best {
            Some((i, _)) => {
                adequate[i].extend(candidate);
                merged += 1;
            }
            None => pending.push(candidate),
        }
    }

    debug!(
        adequate = adequate.len(),
        merged,
        pending = pending.len(),
        "spatial fusion done"
    );

    adequate.extend(pending);
    adequate
}

/// Collapses clusters until at most `desired + 1` remain.
///
/// The smallest cluster is merged into the nearest one that stays within
/// `band.max`; failing that, within `band.average * overflow_factor`;
/// failing that, into the nearest cluster regardless of size.
pub fn reduce(mut clusters: Vec<Cluster>, band: &TargetBand, desired: usize, overflow_factor: f64) -> Vec<Cluster> {
    let limit = desired + 1;
    let hard_max = band.average * overflow_factor;
    let initial = clusters.len();

    while clusters.len() > limit {
        clusters.sort_by_key(Vec::len);
        let smallest = clusters.remove(0);
        let origin = centroid(&smallest);

        let mut ranked: Vec<(usize, f64, usize)> = clusters
            .iter()
            .enumerate()
            .map(|(i, c)| (i, centroid_distance(origin, c), c.len() + smallest.len()))
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

        let chosen = ranked
            .iter()
            .find(|(_, _, combined)| *combined <= band.max)
            .or_else(|| ranked.iter().find(|(_, _, combined)| *combined as f64 <= hard_max))
            .or_else(|| ranked.first())
            .map(|(i, _, _)| *i);

        match chosen {
            Some(i) => clusters[i].extend(smallest),
            None => {
                clusters.push(smallest);
                break;
            }
        }
    }

    debug!(from = initial, to = clusters.len(), desired, "forced reduction done");
    clusters
}
