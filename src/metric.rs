//! Distance kernels over embedded vectors.
//!
//! Two access paths exist, mirroring the two data layouts the engine works
//! with: [`DistanceKernel::distance`] walks two flat vector slices (the tile
//! executor's layout), while [`Metric::distance_in_series`] re-derives the
//! components from the raw series with the embedding stride (the scalar
//! baseline's layout). Both compute in `f32`.

use serde::{Deserialize, Serialize};

/// Statically dispatched distance kernel. The tile executor selects one of
/// the zero-sized implementors once per tile, so the inner loops carry no
/// branch on the metric.
pub trait DistanceKernel: Copy + Send + Sync + 'static {
    const NAME: &'static str;

    /// Distance between two embedded vectors given as `m`-element slices.
    fn distance(a: &[f32], b: &[f32]) -> f32;
}

/// Taxicab metric (L1).
#[derive(Clone, Copy, Debug)]
pub struct Taxicab;

/// Euclidean metric (L2).
#[derive(Clone, Copy, Debug)]
pub struct Euclidean;

/// Maximum metric (L∞).
#[derive(Clone, Copy, Debug)]
pub struct Maximum;

impl DistanceKernel for Taxicab {
    const NAME: &'static str = "taxicab";

    #[inline(always)]
    fn distance(a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len());
        let mut sum = 0.0f32;
        for (x, y) in a.iter().zip(b.iter()) {
            sum += (x - y).abs();
        }
        sum
    }
}

impl DistanceKernel for Euclidean {
    const NAME: &'static str = "euclidean";

    #[inline(always)]
    fn distance(a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len());
        let mut sum = 0.0f32;
        for (x, y) in a.iter().zip(b.iter()) {
            let d = x - y;
            sum += d * d;
        }
        sum.sqrt()
    }
}

impl DistanceKernel for Maximum {
    const NAME: &'static str = "maximum";

    #[inline(always)]
    fn distance(a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len());
        // Seeded with the smallest representable float so the first
        // comparison always wins.
        let mut max = f32::MIN;
        for (x, y) in a.iter().zip(b.iter()) {
            let d = (x - y).abs();
            if d > max {
                max = d;
            }
        }
        max
    }
}

/// Runtime metric selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    Taxicab,
    Euclidean,
    Maximum,
}

impl Metric {
    pub fn name(self) -> &'static str {
        match self {
            Metric::Taxicab => Taxicab::NAME,
            Metric::Euclidean => Euclidean::NAME,
            Metric::Maximum => Maximum::NAME,
        }
    }

    /// All three metrics are symmetric; the flag is still consulted wherever
    /// symmetry decides matrix layout, so an asymmetric metric slots in
    /// without touching the carryover logic.
    pub fn is_symmetric(self) -> bool {
        true
    }

    /// Distance between embedded vectors `ix` and `iy`, components derived
    /// from the raw series with stride `delay`.
    pub fn distance_in_series(
        self,
        series: &[f32],
        dimension: usize,
        delay: usize,
        ix: usize,
        iy: usize,
    ) -> f32 {
        match self {
            Metric::Taxicab => {
                let mut sum = 0.0f32;
                for dim in 0..dimension {
                    sum += (series[ix + dim * delay] - series[iy + dim * delay]).abs();
                }
                sum
            }
            Metric::Euclidean => {
                let mut sum = 0.0f32;
                for dim in 0..dimension {
                    let d = series[ix + dim * delay] - series[iy + dim * delay];
                    sum += d * d;
                }
                sum.sqrt()
            }
            Metric::Maximum => {
                let mut max = f32::MIN;
                for dim in 0..dimension {
                    let d = (series[ix + dim * delay] - series[iy + dim * delay]).abs();
                    if d > max {
                        max = d;
                    }
                }
                max
            }
        }
    }

    /// Distance between vectors `ix` and `iy` of two flat row-major buffers.
    pub fn distance_in_vectors(
        self,
        vectors_x: &[f32],
        vectors_y: &[f32],
        dimension: usize,
        ix: usize,
        iy: usize,
    ) -> f32 {
        let a = &vectors_x[ix * dimension..(ix + 1) * dimension];
        let b = &vectors_y[iy * dimension..(iy + 1) * dimension];
        match self {
            Metric::Taxicab => Taxicab::distance(a, b),
            Metric::Euclidean => Euclidean::distance(a, b),
            Metric::Maximum => Maximum::distance(a, b),
        }
    }
}
