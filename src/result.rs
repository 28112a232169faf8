//! Analysis results and the metrics finaliser.
//!
//! The engine produces three frequency distributions and the per-vector
//! recurrence point counts; every RQA measure is a pure function of those,
//! so [`RqaResult`] derives measures on demand. Minimum line lengths can be
//! changed on an existing result and all measures follow, without re-running
//! the engine.

use std::fmt;
use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::matrix::RecurrenceMatrix;
use crate::runtimes::Runtimes;
use crate::settings::Settings;

/// Counts of runs by length; index `ℓ − 1` holds the number of runs of
/// exactly length `ℓ`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyDistribution {
    counts: Vec<u64>,
}

impl FrequencyDistribution {
    /// Empty distribution for runs of length 1 to `n`.
    pub fn new(n: usize) -> Self {
        Self {
            counts: vec![0u64; n],
        }
    }

    #[inline]
    pub fn add(&mut self, length: usize) {
        debug_assert!(length >= 1);
        self.counts[length - 1] += 1;
    }

    pub fn count(&self, length: usize) -> u64 {
        self.counts[length - 1]
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn merge(&mut self, other: &FrequencyDistribution) {
        debug_assert_eq!(self.counts.len(), other.counts.len());
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts.iter()) {
            *mine += theirs;
        }
    }

    /// Double every count. A symmetric matrix is scanned on one side of the
    /// main diagonal only; each off-diagonal run has a mirror image.
    pub(crate) fn double(&mut self) {
        for count in &mut self.counts {
            *count *= 2;
        }
    }

    /// Remove one run of the given length (main-diagonal de-duplication
    /// after doubling).
    pub(crate) fn remove_one(&mut self, length: usize) {
        debug_assert!(self.counts[length - 1] > 0);
        self.counts[length - 1] -= 1;
    }

    fn tail(&self, min_length: usize) -> &[u64] {
        self.counts.get(min_length - 1..).unwrap_or(&[])
    }

    /// Number of runs of length ≥ `min_length`.
    pub fn number_of_lines(&self, min_length: usize) -> u64 {
        self.tail(min_length).iter().sum()
    }

    /// Number of recurrence points inside runs of length ≥ `min_length`,
    /// `Σ ℓ·f[ℓ−1]`.
    pub fn number_of_line_points(&self, min_length: usize) -> u64 {
        self.tail(min_length)
            .iter()
            .enumerate()
            .map(|(idx, &count)| (min_length + idx) as u64 * count)
            .sum()
    }

    /// Length of the longest run, 0 when no run was observed.
    pub fn longest_line(&self) -> usize {
        self.counts
            .iter()
            .rposition(|&count| count > 0)
            .map_or(0, |idx| idx + 1)
    }

    /// Shannon entropy (natural log) of the run length distribution over
    /// lengths ≥ `min_length`.
    pub fn entropy(&self, min_length: usize) -> f64 {
        let lines = self.number_of_lines(min_length);
        if lines == 0 {
            return 0.0;
        }
        -self.tail(min_length)
            .iter()
            .filter(|&&count| count > 0)
            .map(|&count| {
                let p = count as f64 / lines as f64;
                p * p.ln()
            })
            .sum::<f64>()
    }

    /// Write the distribution as `length: count` lines.
    pub fn persist<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for (idx, count) in self.counts.iter().enumerate() {
            writeln!(writer, "{}: {}", idx + 1, count)?;
        }
        Ok(())
    }
}

/// Result of a recurrence quantification analysis.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RqaResult {
    number_of_vectors: usize,
    theiler_corrector: usize,
    min_diagonal_line_length: usize,
    min_vertical_line_length: usize,
    min_white_vertical_line_length: usize,
    recurrence_points: Vec<u32>,
    diagonal_frequency_distribution: FrequencyDistribution,
    vertical_frequency_distribution: FrequencyDistribution,
    white_vertical_frequency_distribution: FrequencyDistribution,
    runtimes: Runtimes,
}

impl RqaResult {
    pub(crate) fn new(
        settings: &Settings,
        recurrence_points: Vec<u32>,
        diagonal_frequency_distribution: FrequencyDistribution,
        vertical_frequency_distribution: FrequencyDistribution,
        white_vertical_frequency_distribution: FrequencyDistribution,
        runtimes: Runtimes,
    ) -> Self {
        Self {
            number_of_vectors: settings.number_of_vectors(),
            theiler_corrector: settings.theiler_corrector(),
            min_diagonal_line_length: settings.min_diagonal_line_length(),
            min_vertical_line_length: settings.min_vertical_line_length(),
            min_white_vertical_line_length: settings.min_white_vertical_line_length(),
            recurrence_points,
            diagonal_frequency_distribution,
            vertical_frequency_distribution,
            white_vertical_frequency_distribution,
            runtimes,
        }
    }

    pub fn number_of_vectors(&self) -> usize {
        self.number_of_vectors
    }

    pub fn recurrence_points(&self) -> &[u32] {
        &self.recurrence_points
    }

    pub fn diagonal_frequency_distribution(&self) -> &FrequencyDistribution {
        &self.diagonal_frequency_distribution
    }

    pub fn vertical_frequency_distribution(&self) -> &FrequencyDistribution {
        &self.vertical_frequency_distribution
    }

    pub fn white_vertical_frequency_distribution(&self) -> &FrequencyDistribution {
        &self.white_vertical_frequency_distribution
    }

    pub fn runtimes(&self) -> Runtimes {
        self.runtimes
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

    /// Re-derive all diagonal measures under a different minimum length.
    pub fn set_min_diagonal_line_length(&mut self, min_length: usize) -> Result<()> {
        Self::check_min(min_length, "L_min")?;
        self.min_diagonal_line_length = min_length;
        Ok(())
    }

    pub fn set_min_vertical_line_length(&mut self, min_length: usize) -> Result<()> {
        Self::check_min(min_length, "V_min")?;
        self.min_vertical_line_length = min_length;
        Ok(())
    }

    pub fn set_min_white_vertical_line_length(&mut self, min_length: usize) -> Result<()> {
        Self::check_min(min_length, "W_min")?;
        self.min_white_vertical_line_length = min_length;
        Ok(())
    }

    fn check_min(value: usize, name: &str) -> Result<()> {
        if value < 1 {
            return Err(Error::domain(format!("{name} must be at least 1, got {value}")));
        }
        Ok(())
    }

    /// Total number of recurrence points.
    pub fn number_of_recurrence_points(&self) -> u64 {
        self.recurrence_points.iter().map(|&p| p as u64).sum()
    }

    /// Recurrence rate (RR).
    pub fn recurrence_rate(&self) -> f64 {
        let n = self.number_of_vectors as f64;
        self.number_of_recurrence_points() as f64 / (n * n)
    }

    /// Determinism (DET).
    pub fn determinism(&self) -> f64 {
        ratio(
            self.diagonal_frequency_distribution
                .number_of_line_points(self.min_diagonal_line_length),
            self.number_of_recurrence_points(),
        )
    }

    /// Average diagonal line length (L).
    pub fn average_diagonal_line(&self) -> f64 {
        ratio(
            self.diagonal_frequency_distribution
                .number_of_line_points(self.min_diagonal_line_length),
            self.diagonal_frequency_distribution
                .number_of_lines(self.min_diagonal_line_length),
        )
    }

    /// Longest diagonal line length (L_max).
    pub fn longest_diagonal_line(&self) -> usize {
        self.diagonal_frequency_distribution.longest_line()
    }

    /// Divergence (DIV), 0 when no diagonal line exists.
    pub fn divergence(&self) -> f64 {
        match self.longest_diagonal_line() {
            0 => 0.0,
            longest => 1.0 / longest as f64,
        }
    }

    /// Entropy of diagonal line lengths (L_entr).
    pub fn entropy_diagonal_lines(&self) -> f64 {
        self.diagonal_frequency_distribution
            .entropy(self.min_diagonal_line_length)
    }

    /// Laminarity (LAM).
    pub fn laminarity(&self) -> f64 {
        ratio(
            self.vertical_frequency_distribution
                .number_of_line_points(self.min_vertical_line_length),
            self.number_of_recurrence_points(),
        )
    }

    /// Trapping time (TT).
    pub fn trapping_time(&self) -> f64 {
        ratio(
            self.vertical_frequency_distribution
                .number_of_line_points(self.min_vertical_line_length),
            self.vertical_frequency_distribution
                .number_of_lines(self.min_vertical_line_length),
        )
    }

    /// Longest vertical line length (V_max).
    pub fn longest_vertical_line(&self) -> usize {
        self.vertical_frequency_distribution.longest_line()
    }

    /// Entropy of vertical line lengths (V_entr).
    pub fn entropy_vertical_lines(&self) -> f64 {
        self.vertical_frequency_distribution
            .entropy(self.min_vertical_line_length)
    }

    /// Average white vertical line length (W).
    pub fn average_white_vertical_line(&self) -> f64 {
        ratio(
            self.white_vertical_frequency_distribution
                .number_of_line_points(self.min_white_vertical_line_length),
            self.white_vertical_frequency_distribution
                .number_of_lines(self.min_white_vertical_line_length),
        )
    }

    /// Longest white vertical line length (W_max).
    pub fn longest_white_vertical_line(&self) -> usize {
        self.white_vertical_frequency_distribution.longest_line()
    }

    /// Entropy of white vertical line lengths (W_entr).
    pub fn entropy_white_vertical_lines(&self) -> f64 {
        self.white_vertical_frequency_distribution
            .entropy(self.min_white_vertical_line_length)
    }

    /// DET/RR, 0 when RR is 0.
    pub fn ratio_determinism_recurrence_rate(&self) -> f64 {
        let rr = self.recurrence_rate();
        if rr > 0.0 {
            self.determinism() / rr
        } else {
            0.0
        }
    }

    /// LAM/DET, 0 when DET is 0.
    pub fn ratio_laminarity_determinism(&self) -> f64 {
        let det = self.determinism();
        if det > 0.0 {
            self.laminarity() / det
        } else {
            0.0
        }
    }

    /// Indices of vectors whose local recurrence rate is at or below the
    /// threshold.
    pub fn indices_by_local_recurrence_rate(&self, threshold: f64) -> Vec<usize> {
        let n = self.number_of_vectors as f64;
        self.recurrence_points
            .iter()
            .enumerate()
            .filter(|(_, &points)| points as f64 / n <= threshold)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Indices of vectors with at most `threshold` local recurrence points.
    pub fn indices_by_number_of_local_recurrence_points(&self, threshold: u32) -> Vec<usize> {
        self.recurrence_points
            .iter()
            .enumerate()
            .filter(|(_, &points)| points <= threshold)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Serialize the result to any `Write` sink (file, socket, memory buffer).
    pub fn save<W: Write>(&self, writer: W) -> io::Result<()> {
        bincode::serialize_into(writer, self).map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }

    /// Deserialize a result from any `Read` source.
    pub fn load<R: Read>(reader: R) -> io::Result<Self> {
        bincode::deserialize_from(reader).map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator > 0 {
        numerator as f64 / denominator as f64
    } else {
        0.0
    }
}

impl fmt::Display for RqaResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "RQA Result")?;
        writeln!(f, "----------")?;
        writeln!(
            f,
            "Minimum diagonal line length (L_min): {}",
            self.min_diagonal_line_length
        )?;
        writeln!(
            f,
            "Minimum vertical line length (V_min): {}",
            self.min_vertical_line_length
        )?;
        writeln!(
            f,
            "Minimum white vertical line length (W_min): {}",
            self.min_white_vertical_line_length
        )?;
        writeln!(f)?;
        writeln!(f, "Recurrence rate (RR): {:.6}", self.recurrence_rate())?;
        writeln!(f, "Determinism (DET): {:.6}", self.determinism())?;
        writeln!(
            f,
            "Average diagonal line length (L): {:.6}",
            self.average_diagonal_line()
        )?;
        writeln!(
            f,
            "Longest diagonal line length (L_max): {}",
            self.longest_diagonal_line()
        )?;
        writeln!(f, "Divergence (DIV): {:.6}", self.divergence())?;
        writeln!(
            f,
            "Entropy diagonal lines (L_entr): {:.6}",
            self.entropy_diagonal_lines()
        )?;
        writeln!(f, "Laminarity (LAM): {:.6}", self.laminarity())?;
        writeln!(f, "Trapping time (TT): {:.6}", self.trapping_time())?;
        writeln!(
            f,
            "Longest vertical line length (V_max): {}",
            self.longest_vertical_line()
        )?;
        writeln!(
            f,
            "Entropy vertical lines (V_entr): {:.6}",
            self.entropy_vertical_lines()
        )?;
        writeln!(
            f,
            "Average white vertical line length (W): {:.6}",
            self.average_white_vertical_line()
        )?;
        writeln!(
            f,
            "Longest white vertical line length (W_max): {}",
            self.longest_white_vertical_line()
        )?;
        writeln!(
            f,
            "Entropy white vertical lines (W_entr): {:.6}",
            self.entropy_white_vertical_lines()
        )?;
        writeln!(
            f,
            "Ratio determinism / recurrence rate (DET/RR): {:.6}",
            self.ratio_determinism_recurrence_rate()
        )?;
        writeln!(
            f,
            "Ratio laminarity / determinism (LAM/DET): {:.6}",
            self.ratio_laminarity_determinism()
        )
    }
}

/// Result of a recurrence plot computation: the fully materialised matrix.
pub struct RecurrencePlotResult {
    matrix: RecurrenceMatrix,
    runtimes: Runtimes,
}

impl RecurrencePlotResult {
    pub(crate) fn new(matrix: RecurrenceMatrix, runtimes: Runtimes) -> Self {
        Self { matrix, runtimes }
    }

    pub fn recurrence_matrix(&self) -> &RecurrenceMatrix {
        &self.matrix
    }

    pub fn runtimes(&self) -> Runtimes {
        self.runtimes
    }
}
