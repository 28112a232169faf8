//! Delay embedding of a scalar time series.
//!
//! Vectors are never materialised up front. [`EmbeddingView::vectors`]
//! produces the embedded vectors of a contiguous index window as one flat
//! row-major buffer, which is what the distance kernels want to stream over;
//! [`EmbeddingView::series_window`] hands out the raw samples those vectors
//! are derived from, for kernels that re-derive components on the fly.

use crate::error::{Error, Result};

/// Read-only view deriving `m`-dimensional delay vectors from a scalar
/// series. Vector `i` is `(s[i], s[i+τ], …, s[i+(m−1)τ])`.
#[derive(Clone, Copy, Debug)]
pub struct EmbeddingView<'a> {
    series: &'a [f32],
    dimension: usize,
    delay: usize,
}

impl<'a> EmbeddingView<'a> {
    /// The caller (``Settings``) guarantees `dimension ≥ 1`, `delay ≥ 1` and
    /// a series long enough for at least one vector.
    pub(crate) fn new(series: &'a [f32], dimension: usize, delay: usize) -> Self {
        debug_assert!(dimension >= 1 && delay >= 1);
        debug_assert!(series.len() > (dimension - 1) * delay);
        Self {
            series,
            dimension,
            delay,
        }
    }

    /// Number of leading samples consumed before the first full vector,
    /// `(m−1)·τ`.
    pub fn offset(&self) -> usize {
        (self.dimension - 1) * self.delay
    }

    /// Number of embedded vectors derivable from the series.
    pub fn vector_count(&self) -> usize {
        self.series.len() - self.offset()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn delay(&self) -> usize {
        self.delay
    }

    /// The contiguous `count + offset` samples that the vectors of
    /// `[start, start + count)` are derived from.
    pub fn series_window(&self, start: usize, count: usize) -> Result<&'a [f32]> {
        self.check_range(start, count)?;
        Ok(&self.series[start..start + count + self.offset()])
    }

    /// Embedded vectors of `[start, start + count)` as a flat row-major
    /// buffer of `count·m` floats: vector `i` occupies `buf[i*m..(i+1)*m]`.
    pub fn vectors(&self, start: usize, count: usize) -> Result<Vec<f32>> {
        self.check_range(start, count)?;

        let mut buffer = Vec::with_capacity(count * self.dimension);
        for idx in start..start + count {
            for dim in 0..self.dimension {
                buffer.push(self.series[idx + dim * self.delay]);
            }
        }
        Ok(buffer)
    }

    fn check_range(&self, start: usize, count: usize) -> Result<()> {
        if start + count > self.vector_count() {
            return Err(Error::domain(format!(
                "vector range [{start}, {}) exceeds the {} available vectors",
                start + count,
                self.vector_count()
            )));
        }
        Ok(())
    }
}
