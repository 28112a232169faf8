//! Scalar full-matrix baselines.
//!
//! Straight quadratic implementations with none of the tiling machinery.
//! They exist as oracles: the integration suite and the benchmarks compare
//! the tiled engine against them. [`BaselineRqa`] deliberately sidesteps
//! matrix symmetry (its diagonal accumulator covers all `2N−1` lines and
//! every cell is visited), so any disagreement between scan layouts shows up
//! as a counter mismatch.

use std::time::Instant;

use crate::error::{Error, Result};
use crate::matrix::RecurrenceMatrix;
use crate::result::{FrequencyDistribution, RecurrencePlotResult, RqaResult};
use crate::runtimes::Runtimes;
use crate::settings::Settings;

/// Full-matrix RQA oracle.
pub struct BaselineRqa<'a> {
    settings: &'a Settings,
}

impl<'a> BaselineRqa<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    pub fn run(&self) -> Result<RqaResult> {
        let settings = self.settings;
        if !settings.neighbourhood().preserves_symmetry() {
            return Err(Error::unsupported(format!(
                "the scalar baseline has no distance predicate for the {} neighbourhood",
                settings.neighbourhood().name()
            )));
        }

        let n = settings.number_of_vectors();
        let series = settings.series();
        let dimension = settings.embedding_dimension();
        let delay = settings.time_delay();
        let metric = settings.metric();
        let neighbourhood = settings.neighbourhood();
        let theiler = settings.theiler_corrector();

        let mut recurrence_points = vec![0u32; n];
        let mut diagonal_carry = vec![0u32; 2 * n - 1];
        let mut vertical_carry = vec![0u32; n];
        let mut white_carry = vec![0u32; n];
        let mut diagonal = FrequencyDistribution::new(n);
        let mut vertical = FrequencyDistribution::new(n);
        let mut white_vertical = FrequencyDistribution::new(n);

        for index_x in 0..n {
            for index_y in 0..n {
                let diagonal_index = n - 1 + index_y - index_x;
                let distance =
                    metric.distance_in_series(series, dimension, delay, index_x, index_y);

                if neighbourhood.contains(distance) {
                    recurrence_points[index_x] += 1;

                    if index_x.abs_diff(index_y) >= theiler {
                        diagonal_carry[diagonal_index] += 1;
                    }

                    vertical_carry[index_x] += 1;

                    if white_carry[index_x] > 0 {
                        white_vertical.add(white_carry[index_x] as usize);
                        white_carry[index_x] = 0;
                    }
                } else {
                    if diagonal_carry[diagonal_index] > 0 {
                        diagonal.add(diagonal_carry[diagonal_index] as usize);
                        diagonal_carry[diagonal_index] = 0;
                    }
                    if vertical_carry[index_x] > 0 {
                        vertical.add(vertical_carry[index_x] as usize);
                        vertical_carry[index_x] = 0;
                    }
                    white_carry[index_x] += 1;
                }
            }
        }

        for &length in &diagonal_carry {
            if length > 0 {
                diagonal.add(length as usize);
            }
        }
        for &length in &vertical_carry {
            if length > 0 {
                vertical.add(length as usize);
            }
        }
        for &length in &white_carry {
            if length > 0 {
                white_vertical.add(length as usize);
            }
        }

        Ok(RqaResult::new(
            settings,
            recurrence_points,
            diagonal,
            vertical,
            white_vertical,
            Runtimes::default(),
        ))
    }
}

/// Full-matrix recurrence plot oracle.
pub struct BaselineRecurrencePlot<'a> {
    settings: &'a Settings,
}

impl<'a> BaselineRecurrencePlot<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    pub fn run(&self) -> Result<RecurrencePlotResult> {
        let settings = self.settings;
        if !settings.neighbourhood().preserves_symmetry() {
            return Err(Error::unsupported(format!(
                "the scalar baseline has no distance predicate for the {} neighbourhood",
                settings.neighbourhood().name()
            )));
        }

        let n = settings.number_of_vectors();
        let series = settings.series();
        let dimension = settings.embedding_dimension();
        let delay = settings.time_delay();
        let metric = settings.metric();
        let neighbourhood = settings.neighbourhood();

        let started = Instant::now();
        let mut matrix = RecurrenceMatrix::new(n);
        for index_x in 0..n {
            for index_y in 0..n {
                let distance =
                    metric.distance_in_series(series, dimension, delay, index_x, index_y);
                if neighbourhood.contains(distance) {
                    matrix.set(index_x, index_y);
                }
            }
        }

        let runtimes = Runtimes {
            create_matrix: started.elapsed(),
            ..Runtimes::default()
        };
        Ok(RecurrencePlotResult::new(matrix, runtimes))
    }
}
