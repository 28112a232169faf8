//! Recurrence plot image output.
//!
//! One pixel per matrix cell, grayscale, inverted palette (recurrent cells
//! dark on white). The Y axis is flipped so the origin sits at the bottom
//! left and time grows upward and rightward.

use std::path::Path;

use image::{GrayImage, Luma};

use crate::error::Result;
use crate::matrix::RecurrenceMatrix;

const RECURRENT: Luma<u8> = Luma([0u8]);
const EMPTY: Luma<u8> = Luma([255u8]);

/// Render the matrix into a grayscale image.
pub fn render(matrix: &RecurrenceMatrix) -> GrayImage {
    let n = matrix.size() as u32;
    GrayImage::from_fn(n, n, |x, y| {
        let j = (n - 1 - y) as usize;
        if matrix.get(x as usize, j) {
            RECURRENT
        } else {
            EMPTY
        }
    })
}

/// Render and write a PNG.
pub fn save(matrix: &RecurrenceMatrix, path: &Path) -> Result<()> {
    render(matrix).save(path)?;
    Ok(())
}
