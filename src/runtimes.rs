//! Per-phase wall-clock accounting.
//!
//! The five phases of tile processing form a small additive monoid: tile
//! runtimes add up into worker runtimes, worker runtimes into the analysis
//! total. Addition is associative and commutative, so the merge order across
//! workers does not matter.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Runtimes {
    /// Copying series windows into tile-local vector buffers.
    pub transfer_to_device: Duration,
    /// Writing carryover slices and recurrence point counts back.
    pub transfer_from_device: Duration,
    /// Materialising the bit-packed sub-matrix.
    pub create_matrix: Duration,
    /// Vertical and white-vertical line detection.
    pub detect_vertical_lines: Duration,
    /// Diagonal line detection.
    pub detect_diagonal_lines: Duration,
}

impl Add for Runtimes {
    type Output = Runtimes;

    fn add(self, other: Runtimes) -> Runtimes {
        Runtimes {
            transfer_to_device: self.transfer_to_device + other.transfer_to_device,
            transfer_from_device: self.transfer_from_device + other.transfer_from_device,
            create_matrix: self.create_matrix + other.create_matrix,
            detect_vertical_lines: self.detect_vertical_lines + other.detect_vertical_lines,
            detect_diagonal_lines: self.detect_diagonal_lines + other.detect_diagonal_lines,
        }
    }
}

impl AddAssign for Runtimes {
    fn add_assign(&mut self, other: Runtimes) {
        *self = *self + other;
    }
}

impl Sum for Runtimes {
    fn sum<I: Iterator<Item = Runtimes>>(iter: I) -> Runtimes {
        iter.fold(Runtimes::default(), Add::add)
    }
}

impl fmt::Display for Runtimes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Runtimes")?;
        writeln!(f, "--------")?;
        writeln!(f, "Transfer to device: {:.4}s", self.transfer_to_device.as_secs_f64())?;
        writeln!(
            f,
            "Transfer from device: {:.4}s",
            self.transfer_from_device.as_secs_f64()
        )?;
        writeln!(f, "Create matrix: {:.4}s", self.create_matrix.as_secs_f64())?;
        writeln!(
            f,
            "Detect vertical lines: {:.4}s",
            self.detect_vertical_lines.as_secs_f64()
        )?;
        writeln!(
            f,
            "Detect diagonal lines: {:.4}s",
            self.detect_diagonal_lines.as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ms: u64) -> Runtimes {
        Runtimes {
            transfer_to_device: Duration::from_millis(ms),
            create_matrix: Duration::from_millis(2 * ms),
            ..Runtimes::default()
        }
    }

    #[test]
    fn test_addition_is_commutative() {
        assert_eq!(sample(3) + sample(7), sample(7) + sample(3));
    }

    #[test]
    fn test_sum_over_workers() {
        let total: Runtimes = [sample(1), sample(2), sample(3)].into_iter().sum();
        assert_eq!(total.transfer_to_device, Duration::from_millis(6));
        assert_eq!(total.create_matrix, Duration::from_millis(12));
        assert_eq!(total.detect_diagonal_lines, Duration::ZERO);
    }
}
