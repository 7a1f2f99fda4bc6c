//! Splitting oversized buckets into route-sized candidates.

use std::collections::BTreeMap;

use h3o::CellIndex;
use tracing::debug;

use crate::model::{Stop, TargetBand};
use crate::traits::{Located, Partitioner};

/// Unordered working route: just the stops it currently owns.
pub type Cluster = Vec<Stop>;

pub struct SubClusterer<P> {
    partitioner: P,
}

impl<P: Partitioner> SubClusterer<P> {
    pub fn new(partitioner: P) -> Self {
        Self { partitioner }
    }

    /// Turns buckets into candidates. Buckets above `band.max` are split into
    /// `ceil(size / average)` parts; everything else passes through as one
    /// candidate (the fuser picks up those below `band.min`).
    pub fn split(&self, buckets: BTreeMap<CellIndex, Vec<Stop>>, band: &TargetBand) -> Vec<Cluster> {
        let mut candidates = Vec::with_capacity(buckets.len());

        for (cell, stops) in buckets {
            if stops.len() <= band.max {
                candidates.push(stops);
                continue;
            }

            let k = (stops.len() as f64 / band.average).ceil() as usize;
            debug!(%cell, size = stops.len(), k, "splitting oversized bucket");
            candidates.extend(self.split_bucket(stops, k));
        }

        candidates
    }

    fn split_bucket(&self, stops: Vec<Stop>, k: usize) -> Vec<Cluster> {
        if stops.len() <= k {
            return stops.into_iter().map(|stop| vec![stop]).collect();
        }

        let points: Vec<_> = stops.iter().map(Located::point).collect();
        let labels = self.partitioner.partition(&points, k);

        let mut groups: Vec<Cluster> = vec![Vec::new(); k];
        for (stop, label) in stops.into_iter().zip(labels) {
            groups[label.min(k - 1)].push(stop);
        }
        groups.retain(|group| !group.is_empty());
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::haversine::GeoPoint;
    use crate::spatial::SpatialIndexer;

    /// Assigns labels round-robin, which makes expected sizes obvious.
    struct RoundRobin;

    impl Partitioner for RoundRobin {
        fn partition(&self, points: &[GeoPoint], k: usize) -> Vec<usize> {
            (0..points.len()).map(|i| i % k).collect()
        }
    }

    fn buckets_of(stops: Vec<Stop>) -> BTreeMap<CellIndex, Vec<Stop>> {
        SpatialIndexer::new(0).unwrap().bucket(stops).unwrap()
    }

    fn tight(n: i64) -> Vec<Stop> {
        (0..n)
            .map(|i| Stop::new(i, -12.05 + i as f64 * 0.0001, -77.03))
            .collect()
    }

    #[test]
    fn test_oversized_bucket_is_split_into_ceil_size_over_average() {
        let band = TargetBand::for_routes(12, 5, 0.2);
        let candidates = SubClusterer::new(RoundRobin).split(buckets_of(tight(12)), &band);

        // k = ceil(12 / 2.4) = 5 → sizes 3,3,2,2,2
        let sizes: Vec<usize> = candidates.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2, 2]);
    }

    #[test]
    fn test_in_range_bucket_passes_through() {
        let band = TargetBand::around(5.0, 0.2);
        let candidates = SubClusterer::new(RoundRobin).split(buckets_of(tight(5)), &band);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].len(), 5);
    }

    #[test]
    fn test_small_bucket_passes_through() {
        let band = TargetBand::around(10.0, 0.2);
        let candidates = SubClusterer::new(RoundRobin).split(buckets_of(tight(2)), &band);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].len(), 2);
    }

    #[test]
    fn test_degrades_to_singletons_when_k_reaches_size() {
        let band = TargetBand::around(1.0, 0.0);
        let candidates = SubClusterer::new(RoundRobin).split(buckets_of(tight(3)), &band);
        assert_eq!(candidates.len(), 3);
        assert!(candidates.iter().all(|c| c.len() == 1));
    }
}
