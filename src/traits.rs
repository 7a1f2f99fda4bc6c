//! Seams of the planner.
//!
//! The engine only needs coordinates from the things it moves around, and a
//! way to split a set of points into `k` groups. Both are expressed as traits
//! so the concrete clustering algorithm can be swapped (or stubbed in tests).

use crate::haversine::GeoPoint;

/// Anything with a (lat, lon) position.
pub trait Located {
    fn lat(&self) -> f64;
    fn lon(&self) -> f64;

    fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat(), self.lon())
    }
}

/// Splits points into `k` groups.
///
/// Returns one label per input point, each in `0..k`. Implementations must be
/// deterministic: the same points and `k` always yield the same labels.
pub trait Partitioner {
    fn partition(&self, points: &[GeoPoint], k: usize) -> Vec<usize>;
}

impl<P: Partitioner + ?Sized> Partitioner for &P {
    fn partition(&self, points: &[GeoPoint], k: usize) -> Vec<usize> {
        (**self).partition(points, k)
    }
}
