//! Separation of repeated visits to the same stop that ended up in one route.
//!
//! Only relevant in territory mode, where a stop with a visit multiplier of
//! `n` is expanded into `n` occurrences before clustering.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::haversine::{GeoPoint, centroid, haversine_km};
use crate::model::StopId;
use crate::subcluster::Cluster;

/// A duplicate that could not be placed anywhere else and stayed in its route.
#[derive(Debug, Clone, PartialEq)]
pub struct Unresolved {
    /// Index of the route (in the slice passed to [`resolve_collisions`]).
    pub route: usize,
    pub stop_id: StopId,
}

struct Membership {
    ids: Vec<StopId>,
    members: Vec<Vec<usize>>,
    counts: Vec<HashMap<StopId, usize>>,
}

impl Membership {
    fn of(clusters: &[Cluster]) -> Self {
        let mut ids = Vec::new();
        let mut members = Vec::with_capacity(clusters.len());
        let mut counts = Vec::with_capacity(clusters.len());
        for cluster in clusters {
            let mut slots = Vec::with_capacity(cluster.len());
            let mut count: HashMap<StopId, usize> = HashMap::new();
            for stop in cluster {
                slots.push(ids.len());
                ids.push(stop.id.clone());
                *count.entry(stop.id.clone()).or_default() += 1;
            }
            members.push(slots);
            counts.push(count);
        }
        Self {
            ids,
            members,
            counts,
        }
    }

    fn holds(&self, route: usize, id: &StopId) -> bool {
        self.counts[route].get(id).copied().unwrap_or(0) > 0
    }

    fn relocate(&mut self, slot: usize, from: usize, to: usize) {
        let id = self.ids[slot].clone();
        self.members[from].retain(|&s| s != slot);
        self.members[to].push(slot);
        if let Some(count) = self.counts[from].get_mut(&id) {
            *count -= 1;
        }
        *self.counts[to].entry(id).or_default() += 1;
    }

    fn duplicates_in(&self, route: usize) -> Vec<usize> {
        let mut seen: HashSet<&StopId> = HashSet::new();
        self.members[route]
            .iter()
            .copied()
            .filter(|&slot| !seen.insert(&self.ids[slot]))
            .collect()
    }
}

/// Moves every repeated occurrence of a stop out of its route, into the
/// route whose centroid is closest to the origin's and which does not yet
/// hold that stop. Centroids are taken once, before any move.
///
/// When no such route exists the occurrence stays and is reported.
pub fn resolve_collisions(clusters: Vec<Cluster>, passes: usize) -> (Vec<Cluster>, Vec<Unresolved>) {
    let centroids: Vec<Option<GeoPoint>> = clusters.iter().map(|c| centroid(c)).collect();
    let mut clusters = clusters;
    let mut unresolved = Vec::new();

    for pass in 0..passes {
        let mut model = Membership::of(&clusters);
        let mut relocated = 0usize;
        unresolved.clear();

        for origin in 0..clusters.len() {
            for slot in model.duplicates_in(origin) {
                let id = model.ids[slot].clone();
                let destination = nearest_route_without(&model, &centroids, origin, &id);

                match destination {
                    Some(dest) => {
                        model.relocate(slot, origin, dest);
                        relocated += 1;
                    }
                    None => {
                        model.members[origin].retain(|&s| s != slot);
                        model.members[origin].push(slot);
                        unresolved.push(Unresolved {
                            route: origin,
                            stop_id: id,
                        });
                    }
                }
            }
        }

        clusters = apply(clusters, &model.members);
        debug!(pass, relocated, unresolved = unresolved.len(), "collision pass");

        if relocated == 0 {
            break;
        }
    }

    for u in &unresolved {
        warn!(stop = %u.stop_id, route = u.route, "visit multiplier exceeds available routes; duplicate kept");
    }

    (clusters, unresolved)
}

fn nearest_route_without(
    model: &Membership,
    centroids: &[Option<GeoPoint>],
    origin: usize,
    id: &StopId,
) -> Option<usize> {
    let origin_center = centroids[origin]?;
    let mut best: Option<(usize, f64)> = None;
    for (dest, center) in centroids.iter().enumerate() {
        if dest == origin || model.holds(dest, id) {
            continue;
        }
        let Some(center) = center else {
            continue;
        };
        let dist = haversine_km(origin_center, *center);
        if best.is_none_or(|(_, best_dist)| dist < best_dist) {
            best = Some((dest, dist));
        }
    }
    best.map(|(dest, _)| dest)
}

fn apply(clusters: Vec<Cluster>, members: &[Vec<usize>]) -> Vec<Cluster> {
    let mut slots: Vec<Option<_>> = clusters.into_iter().flatten().map(Some).collect();
    members
        .iter()
        .map(|route| route.iter().filter_map(|&slot| slots[slot].take()).collect())
        .collect()
}
