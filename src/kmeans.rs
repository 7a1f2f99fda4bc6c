//! Deterministic k-means used to split oversized H3 buckets.

use crate::haversine::GeoPoint;
use crate::traits::Partitioner;

/// Lloyd's algorithm with farthest-point seeding.
///
/// Works on an equirectangular projection (longitude scaled by the cosine of
/// the mean latitude), which is accurate enough inside one H3 cell. Seeding
/// starts from the first point, so results only depend on input order.
#[derive(Debug, Clone)]
pub struct KMeans {
    pub max_iterations: usize,
}

impl Default for KMeans {
    fn default() -> Self {
        Self { max_iterations: 100 }
    }
}

impl KMeans {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }
}

impl Partitioner for KMeans {
    fn partition(&self, points: &[GeoPoint], k: usize) -> Vec<usize> {
        let n = points.len();
        if n == 0 {
            return Vec::new();
        }
        if k <= 1 {
            return vec![0; n];
        }
        if k >= n {
            return (0..n).collect();
        }

        let coords = project(points);
        let mut centers = seed_centers(&coords, k);
        let mut assignments = vec![usize::MAX; n];

        for _ in 0..self.max_iterations.max(1) {
            let mut changed = false;

            for (i, c) in coords.iter().enumerate() {
                let best = nearest_center(c, &centers);
                if assignments[i] != best {
                    assignments[i] = best;
                    changed = true;
                }
            }

            if repair_empty_clusters(&coords, &mut assignments, &mut centers) {
                changed = true;
            }

            update_centers(&coords, &assignments, &mut centers);

            if !changed {
                break;
            }
        }

        assignments
    }
}

fn project(points: &[GeoPoint]) -> Vec<[f64; 2]> {
    let mean_lat = points.iter().map(|p| p.lat).sum::<f64>() / points.len() as f64;
    let scale = mean_lat.to_radians().cos();
    points.iter().map(|p| [p.lat, p.lon * scale]).collect()
}

fn dist2(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)
}

fn seed_centers(coords: &[[f64; 2]], k: usize) -> Vec<[f64; 2]> {
    let mut centers: Vec<[f64; 2]> = Vec::with_capacity(k);
    centers.push(coords[0]);

    for _ in 1..k {
        let mut best_idx = 0;
        let mut best_dist = -1.0;
        for (i, c) in coords.iter().enumerate() {
            let min_dist = centers
                .iter()
                .map(|ctr| dist2(c, ctr))
                .fold(f64::INFINITY, f64::min);
            if min_dist > best_dist {
                best_dist = min_dist;
                best_idx = i;
            }
        }
        centers.push(coords[best_idx]);
    }

    centers
}

fn nearest_center(c: &[f64; 2], centers: &[[f64; 2]]) -> usize {
    let mut best_cluster = 0;
    let mut best_dist = f64::INFINITY;
    for (j, ctr) in centers.iter().enumerate() {
        let dist = dist2(c, ctr);
        if dist < best_dist {
            best_dist = dist;
            best_cluster = j;
        }
    }
    best_cluster
}

/// Gives every empty cluster the point farthest from the centre of the
/// currently largest cluster. Returns whether anything moved.
fn repair_empty_clusters(
    coords: &[[f64; 2]],
    assignments: &mut [usize],
    centers: &mut [[f64; 2]],
) -> bool {
    let k = centers.len();
    let mut counts = vec![0usize; k];
    for &a in assignments.iter() {
        counts[a] += 1;
    }

    let mut repaired = false;
    for empty in 0..k {
        if counts[empty] > 0 {
            continue;
        }

        let mut donor = 0;
        for j in 1..k {
            if counts[j] > counts[donor] {
                donor = j;
            }
        }
        if counts[donor] < 2 {
            break;
        }

        let mut farthest = None;
        let mut farthest_dist = -1.0;
        for (i, c) in coords.iter().enumerate() {
            if assignments[i] != donor {
                continue;
            }
            let dist = dist2(c, &centers[donor]);
            if dist > farthest_dist {
                farthest_dist = dist;
                farthest = Some(i);
            }
        }

        if let Some(i) = farthest {
            assignments[i] = empty;
            counts[donor] -= 1;
            counts[empty] += 1;
            centers[empty] = coords[i];
            repaired = true;
        }
    }

    repaired
}

fn update_centers(coords: &[[f64; 2]], assignments: &[usize], centers: &mut [[f64; 2]]) {
    let k = centers.len();
    let mut sums = vec![[0.0f64; 2]; k];
    let mut counts = vec![0usize; k];
    for (c, &a) in coords.iter().zip(assignments) {
        sums[a][0] += c[0];
        sums[a][1] += c[1];
        counts[a] += 1;
    }
    for j in 0..k {
        if counts[j] > 0 {
            centers[j] = [sums[j][0] / counts[j] as f64, sums[j][1] / counts[j] as f64];
        }
    }
}
