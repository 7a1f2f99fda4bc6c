//! Visit order inside a route.
//!
//! Nearest-neighbour walk that always starts from the northernmost stop. The
//! fixed start gives a top-to-bottom sweep instead of a spiral out of the
//! middle, and keeps the result independent of input order except for ties.
//!
//! O(n²); routes hold tens of stops.

use crate::haversine::haversine_km;
use crate::model::Stop;
use crate::traits::Located;

/// Reorders `stops` into walking order and sets `order` to 1..=n.
pub fn sequence(stops: Vec<Stop>) -> Vec<Stop> {
    if stops.len() <= 2 {
        return number(stops);
    }

    let mut start = 0;
    for (i, stop) in stops.iter().enumerate() {
        if stop.lat > stops[start].lat {
            start = i;
        }
    }

    let mut pending: Vec<Option<Stop>> = stops.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(pending.len());
    let mut current = start;

    while let Some(stop) = pending[current].take() {
        let here = stop.point();
        ordered.push(stop);

        let mut next: Option<(usize, f64)> = None;
        for (i, candidate) in pending.iter().enumerate() {
            let Some(candidate) = candidate else {
                continue;
            };
            let dist = haversine_km(here, candidate.point());
            if next.is_none_or(|(_, best)| dist < best) {
                next = Some((i, dist));
            }
        }

        match next {
            Some((i, _)) => current = i,
            None => break,
        }
    }

    number(ordered)
}

fn number(mut stops: Vec<Stop>) -> Vec<Stop> {
    for (i, stop) in stops.iter_mut().enumerate() {
        stop.order = Some(i as u32 + 1);
    }
    stops
}
