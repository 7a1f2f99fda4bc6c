//! Great-circle distances and centroids.
//!
//! Straight-line distance over the sphere; ignores the street network, which
//! is acceptable at the scale of a single route (a few kilometres).

use serde::{Deserialize, Serialize};

use crate::traits::Located;

/// Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A bare coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl Located for GeoPoint {
    fn lat(&self) -> f64 {
        self.lat
    }

    fn lon(&self) -> f64 {
        self.lon
    }
}

/// Haversine distance between two points in kilometers.
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lon = (to.lon - from.lon).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Arithmetic mean of the coordinates, or `None` for an empty slice.
pub fn centroid<T: Located>(items: &[T]) -> Option<GeoPoint> {
    centroid_of(items.iter())
}

/// Same as [`centroid`] for any iterator of located references.
pub fn centroid_of<'a, T, I>(items: I) -> Option<GeoPoint>
where
    T: Located + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut count = 0usize;
    let (mut lat, mut lon) = (0.0, 0.0);
    for item in items {
        lat += item.lat();
        lon += item.lon();
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some(GeoPoint::new(lat / count as f64, lon / count as f64))
}

/// Sum of consecutive great-circle legs along the given order.
pub fn path_length_km<T: Located>(items: &[T]) -> f64 {
    items
        .windows(2)
        .map(|pair| haversine_km(pair[0].point(), pair[1].point()))
        .sum()
}

/// Rounds to two decimals, the precision reported for kilometres.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
