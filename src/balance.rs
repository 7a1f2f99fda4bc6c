//! Load balancing between neighbouring routes after forced reduction.
//!
//! Each pass plans every transfer against a model of the routes that only
//! holds stop slots (indices into a flat list), then applies the plan in one
//! write step. Stops are identified by slot, never by value, so duplicate
//! occurrences of the same stop id are moved independently.

use tracing::{debug, trace};

use crate::config::PlannerOptions;
use crate::haversine::{GeoPoint, centroid_of, haversine_km};
use crate::model::TargetBand;
use crate::subcluster::Cluster;
use crate::traits::Located;

#[derive(Debug, Clone)]
pub struct BalanceSettings {
    pub rich_factor: f64,
    /// Only logged as `ceil(average * poor_factor)`; does not affect transfers.
    pub poor_factor: f64,
    /// Donor-to-receiver centroid search radius.
    pub search_radius_km: f64,
    pub max_transfer_distance_km: f64,
    pub max_transfer_per_pass: usize,
    pub passes: usize,
}

impl From<&PlannerOptions> for BalanceSettings {
    fn from(options: &PlannerOptions) -> Self {
        Self {
            rich_factor: options.rich_factor,
            poor_factor: options.poor_factor,
            search_radius_km: options.max_merge_distance_km * options.receiver_search_factor,
            max_transfer_distance_km: options.max_transfer_distance_km,
            max_transfer_per_pass: options.max_transfer_per_pass,
            passes: options.balance_passes,
        }
    }
}

impl Default for BalanceSettings {
    fn default() -> Self {
        Self::from(&PlannerOptions::default())
    }
}

/// One planned move of stops between two routes.
#[derive(Debug, Clone, PartialEq)]
struct Transfer {
    donor: usize,
    receiver: usize,
    slots: Vec<usize>,
}

/// Slot view of the routes used while planning a pass.
struct SlotModel {
    points: Vec<GeoPoint>,
    members: Vec<Vec<usize>>,
}

impl SlotModel {
    fn of(clusters: &[Cluster]) -> Self {
        let mut points = Vec::new();
        let mut members = Vec::with_capacity(clusters.len());
        for cluster in clusters {
            let mut slots = Vec::with_capacity(cluster.len());
            for stop in cluster {
                slots.push(points.len());
                points.push(stop.point());
            }
            members.push(slots);
        }
        Self { points, members }
    }

    fn centroid(&self, route: usize) -> Option<GeoPoint> {
        centroid_of(self.members[route].iter().map(|&slot| &self.points[slot]))
    }
}

/// Moves stops from routes above `floor(average * rich_factor)` to nearby
/// routes below the average, closest-to-receiver first.
pub fn balance(mut clusters: Vec<Cluster>, band: &TargetBand, settings: &BalanceSettings) -> Vec<Cluster> {
    let average = band.average;
    let rich = (average * settings.rich_factor).floor() as usize;
    let poor = (average * settings.poor_factor).ceil() as usize;
    debug!(average, rich, poor, routes = clusters.len(), "balancing");

    for pass in 0..settings.passes {
        let (model, transfers) = plan_pass(&clusters, average, rich, settings);
        if transfers.is_empty() {
            debug!(pass, "balancing converged");
            break;
        }
        for t in &transfers {
            trace!(pass, donor = t.donor, receiver = t.receiver, moved = t.slots.len(), "transfer");
        }
        debug!(pass, transfers = transfers.len(), "balancing pass planned");
        clusters = apply(clusters, &model.members);
    }

    clusters
}

fn plan_pass(
    clusters: &[Cluster],
    average: f64,
    rich: usize,
    settings: &BalanceSettings,
) -> (SlotModel, Vec<Transfer>) {
    let mut model = SlotModel::of(clusters);
    let mut transfers = Vec::new();

    let mut order: Vec<usize> = (0..clusters.len()).collect();
    order.sort_by(|&a, &b| clusters[b].len().cmp(&clusters[a].len()));

    for donor in order {
        let donor_size = model.members[donor].len();
        if donor_size <= rich {
            continue;
        }
        let Some(donor_center) = model.centroid(donor) else {
            continue;
        };

        let mut receiver: Option<(usize, f64, GeoPoint)> = None;
        for r in 0..model.members.len() {
            if r == donor || (model.members[r].len() as f64) >= average {
                continue;
            }
            let Some(center) = model.centroid(r) else {
                continue;
            };
            let dist = haversine_km(donor_center, center);
            if dist > settings.search_radius_km {
                continue;
            }
            if receiver.is_none_or(|(_, best, _)| dist < best) {
                receiver = Some((r, dist, center));
            }
        }
        let Some((receiver, _, receiver_center)) = receiver else {
            continue;
        };

        let mut ranked: Vec<(usize, f64)> = model.members[donor]
            .iter()
            .map(|&slot| (slot, haversine_km(model.points[slot], receiver_center)))
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

        let excess = donor_size as f64 - average;
        let deficit = average - model.members[receiver].len() as f64;
        let quantity = excess
            .min(deficit)
            .min(settings.max_transfer_per_pass as f64)
            .ceil()
            .max(0.0) as usize;

        let slots: Vec<usize> = ranked
            .into_iter()
            .filter(|(_, dist)| *dist <= settings.max_transfer_distance_km)
            .take(quantity)
            .map(|(slot, _)| slot)
            .collect();

        if slots.is_empty() {
            continue;
        }

        model.members[donor].retain(|slot| !slots.contains(slot));
        model.members[receiver].extend(slots.iter().copied());
        transfers.push(Transfer {
            donor,
            receiver,
            slots,
        });
    }

    (model, transfers)
}

/// Rebuilds the clusters from the planned slot membership.
fn apply(clusters: Vec<Cluster>, members: &[Vec<usize>]) -> Vec<Cluster> {
    let mut slots: Vec<Option<_>> = clusters.into_iter().flatten().map(Some).collect();
    members
        .iter()
        .map(|route| route.iter().filter_map(|&slot| slots[slot].take()).collect())
        .collect()
}
