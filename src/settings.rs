//! Analysis settings.
//!
//! Everything an analysis needs up front: the series, the embedding, the
//! metric and neighbourhood, the Theiler corrector and the minimum line
//! lengths. Settings are validated at construction and immutable afterwards;
//! every derived quantity (`offset`, `N`, symmetry) is computed here so the
//! rest of the engine never re-derives it.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::metric::Metric;
use crate::neighbourhood::Neighbourhood;
use crate::series::EmbeddingView;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    series: Vec<f32>,
    embedding_dimension: usize,
    time_delay: usize,
    metric: Metric,
    neighbourhood: Neighbourhood,
    theiler_corrector: usize,
    min_diagonal_line_length: usize,
    min_vertical_line_length: usize,
    min_white_vertical_line_length: usize,
}

impl Settings {
    /// Create settings with the default Theiler corrector (1) and minimum
    /// line lengths (2). Rejects `m < 1`, `τ < 1` and series too short for a
    /// single embedded vector.
    pub fn new(
        series: Vec<f32>,
        embedding_dimension: usize,
        time_delay: usize,
        metric: Metric,
        neighbourhood: Neighbourhood,
    ) -> Result<Self> {
        if embedding_dimension < 1 {
            return Err(Error::domain("embedding dimension must be at least 1"));
        }
        if time_delay < 1 {
            return Err(Error::domain("time delay must be at least 1"));
        }
        let offset = (embedding_dimension - 1) * time_delay;
        if series.len() <= offset {
            return Err(Error::domain(format!(
                "series of length {} yields no vectors for m={embedding_dimension}, τ={time_delay}",
                series.len()
            )));
        }
        Ok(Self {
            series,
            embedding_dimension,
            time_delay,
            metric,
            neighbourhood,
            theiler_corrector: 1,
            min_diagonal_line_length: 2,
            min_vertical_line_length: 2,
            min_white_vertical_line_length: 2,
        })
    }

    pub fn with_theiler_corrector(mut self, theiler_corrector: usize) -> Self {
        self.theiler_corrector = theiler_corrector;
        self
    }

    /// Minimum run lengths for the metrics finaliser; each must be ≥ 1.
    pub fn with_min_line_lengths(
        mut self,
        diagonal: usize,
        vertical: usize,
        white_vertical: usize,
    ) -> Result<Self> {
        for (name, value) in [
            ("L_min", diagonal),
            ("V_min", vertical),
            ("W_min", white_vertical),
        ] {
            if value < 1 {
                return Err(Error::domain(format!("{name} must be at least 1, got {value}")));
            }
        }
        self.min_diagonal_line_length = diagonal;
        self.min_vertical_line_length = vertical;
        self.min_white_vertical_line_length = white_vertical;
        Ok(self)
    }

    pub fn series(&self) -> &[f32] {
        &self.series
    }

    pub fn series_length(&self) -> usize {
        self.series.len()
    }

    pub fn embedding_dimension(&self) -> usize {
        self.embedding_dimension
    }

    pub fn time_delay(&self) -> usize {
        self.time_delay
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn neighbourhood(&self) -> &Neighbourhood {
        &self.neighbourhood
    }

    pub fn theiler_corrector(&self) -> usize {
        self.theiler_corrector
    }

    pub fn min_diagonal_line_length(&self) -> usize {
        self.min_diagonal_line_length
    }

    pub fn min_vertical_line_length(&self) -> usize {
        self.min_vertical_line_length
    }

    pub fn min_white_vertical_line_length(&self) -> usize {
        self.min_white_vertical_line_length
    }

    /// `(m−1)·τ`, the leading samples consumed before the first vector.
    pub fn offset(&self) -> usize {
        (self.embedding_dimension - 1) * self.time_delay
    }

    /// `N`, the edge length of the logical recurrence matrix.
    pub fn number_of_vectors(&self) -> usize {
        self.series.len() - self.offset()
    }

    /// The recurrence matrix is symmetric when the metric is symmetric and
    /// the neighbourhood predicate is purely distance-based.
    pub fn is_matrix_symmetric(&self) -> bool {
        self.metric.is_symmetric() && self.neighbourhood.preserves_symmetry()
    }

    pub fn embedding(&self) -> EmbeddingView<'_> {
        EmbeddingView::new(&self.series, self.embedding_dimension, self.time_delay)
    }
}
