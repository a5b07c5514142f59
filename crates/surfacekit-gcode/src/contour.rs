//! Surface contouring
//!
//! Rewrites cutting depths so the tool follows the measured surface. The
//! height map is indexed by `(x, y)` only; for every cutting move the two
//! nearest samples are found and the surface offset is interpolated between
//! them.

use crate::moves::ToolpathMove;
use crate::program::ToolpathProgram;
use kiddo::SquaredEuclidean;
use std::collections::HashMap;
use surfacekit_core::{HeightMap, HeightMapError, HeightPoint};

/// Bucket size of the sample index
///
/// The index cannot split a bucket whose items all share one coordinate.
/// Maps with this many samples on one X or Y value are searched linearly.
pub const INDEX_BUCKET_SIZE: usize = 256;

type SampleIndex = kiddo::float::kdtree::KdTree<f64, u64, 2, INDEX_BUCKET_SIZE, u32>;

/// Normalize a target depth to a value below the surface
pub fn normalize_depth(depth: f64) -> f64 {
    -depth.abs()
}

/// Surface offset at `(x, y)` from two neighbouring samples
///
/// Interpolates along X when the samples differ in X, otherwise along Y.
/// Coincident samples yield the mean of their heights.
pub fn interpolate_offset(x: f64, y: f64, a: HeightPoint, b: HeightPoint) -> f64 {
    let along_x = (a.x != b.x).then(|| a.z + (x - a.x) * (b.z - a.z) / (b.x - a.x));
    let along_y = (a.y != b.y).then(|| a.z + (y - a.y) * (b.z - a.z) / (b.y - a.y));
    along_x.or(along_y).unwrap_or((a.z + b.z) / 2.0)
}

/// Largest number of samples sharing one value on either axis
fn max_shared_coordinate(samples: &[HeightPoint]) -> usize {
    let mut per_x: HashMap<u64, usize> = HashMap::new();
    let mut per_y: HashMap<u64, usize> = HashMap::new();
    for point in samples {
        // `+ 0.0` folds -0.0 into 0.0
        *per_x.entry((point.x + 0.0).to_bits()).or_default() += 1;
        *per_y.entry((point.y + 0.0).to_bits()).or_default() += 1;
    }
    per_x.values().chain(per_y.values()).copied().max().unwrap_or(0)
}

fn squared_distance(point: &HeightPoint, x: f64, y: f64) -> f64 {
    (point.x - x).powi(2) + (point.y - y).powi(2)
}

/// Count of moves handled by one contouring pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContourSummary {
    /// Cutting moves rewritten against the surface
    pub cuts: usize,
    /// Dive moves set to the target depth
    pub dives: usize,
    /// Moves left unchanged
    pub unchanged: usize,
}

enum SampleLookup {
    Tree(SampleIndex),
    Linear,
}

/// Nearest-neighbour contouring against a height map
pub struct Contourer {
    samples: Vec<HeightPoint>,
    lookup: SampleLookup,
}

impl Contourer {
    /// Index a height map
    ///
    /// The map must be a complete grid of at least two samples.
    pub fn new(map: &HeightMap) -> Result<Self, HeightMapError> {
        map.validate()?;

        let samples: Vec<HeightPoint> = map.points().copied().collect();
        let lookup = if max_shared_coordinate(&samples) < INDEX_BUCKET_SIZE {
            let mut index = SampleIndex::new();
            for (i, point) in samples.iter().enumerate() {
                index.add(&[point.x, point.y], i as u64);
            }
            SampleLookup::Tree(index)
        } else {
            tracing::debug!("Height map samples are collinear, using a linear search");
            SampleLookup::Linear
        };

        tracing::debug!(
            "Indexed {} height samples ({}x{})",
            samples.len(),
            map.row_count(),
            map.column_count()
        );
        Ok(Self { samples, lookup })
    }

    /// Number of indexed samples
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Whether lookups go through the kd-tree
    pub fn is_tree_indexed(&self) -> bool {
        matches!(self.lookup, SampleLookup::Tree(_))
    }

    /// The two samples closest to `(x, y)`, nearest first
    pub fn nearest_pair(&self, x: f64, y: f64) -> (HeightPoint, HeightPoint) {
        match &self.lookup {
            SampleLookup::Tree(index) => {
                let found = index.nearest_n::<SquaredEuclidean>(&[x, y], 2);
                let sample = |n: usize| self.samples[found[n].item as usize];
                (sample(0), sample(1))
            }
            SampleLookup::Linear => self.nearest_pair_linear(x, y),
        }
    }

    fn nearest_pair_linear(&self, x: f64, y: f64) -> (HeightPoint, HeightPoint) {
        // `new` guarantees at least two samples
        let (mut first, mut second) = (self.samples[0], self.samples[1]);
        if squared_distance(&second, x, y) < squared_distance(&first, x, y) {
            std::mem::swap(&mut first, &mut second);
        }
        for point in &self.samples[2..] {
            let distance = squared_distance(point, x, y);
            if distance < squared_distance(&first, x, y) {
                second = first;
                first = *point;
            } else if distance < squared_distance(&second, x, y) {
                second = *point;
            }
        }
        (first, second)
    }

    /// Measured surface height at `(x, y)`
    pub fn surface_offset(&self, x: f64, y: f64) -> f64 {
        let (a, b) = self.nearest_pair(x, y);
        interpolate_offset(x, y, a, b)
    }

    /// Contour a program and return it
    pub fn contour(&self, mut program: ToolpathProgram, target_depth: f64) -> ToolpathProgram {
        self.contour_in_place(&mut program, target_depth);
        program
    }

    /// Rewrite dive and cutting depths of `program` in place
    ///
    /// Dives go to the normalized target depth. Cuts go to the target depth
    /// plus the surface offset at their `(x, y)`. Other moves are untouched.
    pub fn contour_in_place(
        &self,
        program: &mut ToolpathProgram,
        target_depth: f64,
    ) -> ContourSummary {
        let depth = normalize_depth(target_depth);
        let mut summary = ContourSummary::default();

        for mv in program.moves_mut() {
            match mv {
                ToolpathMove::Dive { z, .. } => {
                    *z = depth;
                    summary.dives += 1;
                }
                ToolpathMove::Cut { x, y, z, .. } => {
                    *z = Some(depth + self.surface_offset(*x, *y));
                    summary.cuts += 1;
                }
                ToolpathMove::Travel { .. } | ToolpathMove::Other { .. } => {
                    summary.unchanged += 1;
                }
            }
        }

        tracing::info!(
            "Contoured {} cuts and {} dives at depth {:.3} ({} moves unchanged)",
            summary.cuts,
            summary.dives,
            depth,
            summary.unchanged
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> HeightPoint {
        HeightPoint::new(x, y, z)
    }

    #[test]
    fn test_normalize_depth() {
        assert_eq!(normalize_depth(0.1), -0.1);
        assert_eq!(normalize_depth(-0.1), -0.1);
    }

    #[test]
    fn test_interpolate_prefers_x() {
        let offset = interpolate_offset(5.0, 3.0, p(0.0, 0.0, 1.0), p(10.0, 10.0, 2.0));
        assert!((offset - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_interpolate_falls_back_to_y() {
        let offset = interpolate_offset(0.0, 2.5, p(0.0, 0.0, 1.0), p(0.0, 10.0, 2.0));
        assert!((offset - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_interpolate_coincident_uses_mean() {
        let offset = interpolate_offset(3.0, 3.0, p(3.0, 3.0, 1.0), p(3.0, 3.0, 2.0));
        assert!((offset - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_too_few_samples() {
        let map = HeightMap::from(vec![vec![(0.0, 0.0, 1.0)]]);
        assert!(matches!(
            Contourer::new(&map),
            Err(HeightMapError::TooFewSamples { count: 1 })
        ));
    }

    #[test]
    fn test_rejects_ragged_map() {
        let map = HeightMap::from(vec![
            vec![(0.0, 0.0, 1.0), (10.0, 0.0, 1.0)],
            vec![(0.0, 10.0, 1.0)],
        ]);
        assert!(matches!(
            Contourer::new(&map),
            Err(HeightMapError::RaggedRows { .. })
        ));
    }

    #[test]
    fn test_grid_with_distinct_coordinates_uses_tree() {
        let row = |y: f64| (0..200).map(|i| (i as f64, y, 0.0)).collect::<Vec<_>>();
        let map = HeightMap::from(vec![row(0.0), row(1.0), row(2.0)]);
        let contourer = Contourer::new(&map).unwrap();
        assert!(contourer.is_tree_indexed());
        assert_eq!(contourer.sample_count(), 600);
    }

    #[test]
    fn test_collinear_grid_uses_linear_search() {
        let rows: Vec<Vec<(f64, f64, f64)>> = (0..21)
            .map(|j| (0..21).map(|_| (0.0, j as f64, j as f64)).collect())
            .collect();
        let contourer = Contourer::new(&HeightMap::from(rows)).unwrap();
        assert!(!contourer.is_tree_indexed());

        let (a, b) = contourer.nearest_pair(0.0, 4.0);
        assert_eq!((a.y, b.y), (4.0, 4.0));
        assert!((contourer.surface_offset(0.0, 4.0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_linear_search_orders_nearest_first() {
        let row: Vec<(f64, f64, f64)> = (0..300).map(|i| (i as f64, 0.0, i as f64)).collect();
        let contourer = Contourer::new(&HeightMap::from(vec![row])).unwrap();
        assert!(!contourer.is_tree_indexed());

        let (a, b) = contourer.nearest_pair(10.2, 0.0);
        assert_eq!((a.x, b.x), (10.0, 11.0));
        assert!((contourer.surface_offset(10.2, 0.0) - 10.2).abs() < 1e-9);
    }
}
