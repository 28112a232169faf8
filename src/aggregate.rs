//! Per-tile line detection.
//!
//! The aggregators consume a tile's bit matrix and the carryover slices the
//! tile owns, emit every run that closes inside the tile into a local
//! frequency distribution, and leave still-open runs in the carry slices for
//! the next tile in scan order.
//!
//! Diagonal detection walks each tile along lines parallel to the main
//! diagonal, starting from the tile's top edge. In the symmetric layout a
//! tile left of the main diagonal (`px < py`) holds the mirror image of the
//! lines it continues; its walks start one column further right so that the
//! walked cells and the slot indices line up with the mirrored line, and
//! each line is counted exactly once before the distribution is doubled.

use crate::carryover::RunCarry;
use crate::matrix::TileBits;
use crate::result::FrequencyDistribution;
use crate::tiles::Tile;

/// Vertical and white-vertical run detection over one tile, column by
/// column, top to bottom. `vertical_carry` and `white_carry` are the slices
/// for columns `[start_x, start_x + dim_x)`; `column_points` accumulates the
/// tile's recurrence points per local column.
pub fn detect_vertical_lines(
    bits: &TileBits,
    tile: &Tile,
    vertical_carry: &mut [RunCarry],
    white_carry: &mut [RunCarry],
    vertical_freq: &mut FrequencyDistribution,
    white_freq: &mut FrequencyDistribution,
    column_points: &mut [u32],
) {
    debug_assert_eq!(vertical_carry.len(), tile.dim_x);
    debug_assert_eq!(white_carry.len(), tile.dim_x);
    debug_assert_eq!(column_points.len(), tile.dim_x);

    for i in 0..tile.dim_x {
        let mut vertical = vertical_carry[i];
        let mut white = white_carry[i];
        let mut points = 0u32;

        for j in 0..tile.dim_y {
            let row = (tile.start_y + j) as u32;
            if bits.get(i, j) {
                points += 1;
                if white.length > 0 {
                    white_freq.add(white.length as usize);
                    white.length = 0;
                }
                if vertical.length == 0 {
                    vertical.start = row;
                }
                vertical.length += 1;
            } else {
                if vertical.length > 0 {
                    vertical_freq.add(vertical.length as usize);
                    vertical.length = 0;
                }
                if white.length == 0 {
                    white.start = row;
                }
                white.length += 1;
            }
        }

        debug_assert_eq!(points, bits.count_column(i));
        vertical_carry[i] = vertical;
        white_carry[i] = white;
        column_points[i] += points;
    }
}

/// Diagonal run detection in the symmetric layout. `carry` is the tile's
/// `dim_x`-slot slice; slot `g` continues the line with `|i − j| = c` that
/// enters the tile at top-edge column `g` (mirrored for `px < py`). Cells
/// with `|i − j| < theiler` never extend a run.
pub fn detect_diagonal_lines_symmetric(
    bits: &TileBits,
    tile: &Tile,
    theiler: usize,
    carry: &mut [u32],
    freq: &mut FrequencyDistribution,
) {
    debug_assert_eq!(carry.len(), tile.dim_x);

    let mirrored = tile.px < tile.py;
    let offset = mirrored as usize;

    for g in 0..tile.dim_x {
        let start_column = g + offset;
        if start_column >= tile.dim_x {
            continue;
        }
        let (slot, separation) = if mirrored {
            (
                tile.dim_x - 1 - g,
                tile.start_y - (tile.start_x + start_column),
            )
        } else {
            (g, tile.start_x + start_column - tile.start_y)
        };

        carry[slot] = walk_diagonal(
            bits,
            tile,
            start_column,
            0,
            separation >= theiler,
            carry[slot],
            freq,
        );
    }
}

/// Diagonal run detection in the general layout: every line crossing the
/// tile is walked, entering from the top edge or the left edge. `carry` is
/// the tile's `dim_x + dim_y − 1` slot slice, slot 0 holding the line
/// through the bottom-left corner.
pub fn detect_diagonal_lines(
    bits: &TileBits,
    tile: &Tile,
    theiler: usize,
    carry: &mut [u32],
    freq: &mut FrequencyDistribution,
) {
    debug_assert_eq!(carry.len(), tile.dim_x + tile.dim_y - 1);

    for g in 0..tile.dim_x {
        let separation =
            (tile.start_x + g) as i64 - tile.start_y as i64;
        let slot = g + tile.dim_y - 1;
        carry[slot] = walk_diagonal(
            bits,
            tile,
            g,
            0,
            separation.unsigned_abs() as usize >= theiler,
            carry[slot],
            freq,
        );
    }
    for h in 1..tile.dim_y {
        let separation = tile.start_x as i64 - (tile.start_y + h) as i64;
        let slot = tile.dim_y - 1 - h;
        carry[slot] = walk_diagonal(
            bits,
            tile,
            0,
            h,
            separation.unsigned_abs() as usize >= theiler,
            carry[slot],
            freq,
        );
    }
}

/// Walk one line from `(start_column, start_row)` down-right to the tile
/// edge, extending or closing the open run. Returns the run still open at
/// the tile edge.
fn walk_diagonal(
    bits: &TileBits,
    tile: &Tile,
    start_column: usize,
    start_row: usize,
    counted: bool,
    open: u32,
    freq: &mut FrequencyDistribution,
) -> u32 {
    let steps = (tile.dim_x - start_column).min(tile.dim_y - start_row);
    let mut open = open;
    debug_assert!(counted || open == 0);

    for t in 0..steps {
        if counted && bits.get(start_column + t, start_row + t) {
            open += 1;
        } else if open > 0 {
            freq.add(open as usize);
            open = 0;
        }
    }
    open
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile_at(px: usize, py: usize, start_x: usize, start_y: usize, dx: usize, dy: usize) -> Tile {
        Tile {
            px,
            py,
            start_x,
            start_y,
            dim_x: dx,
            dim_y: dy,
        }
    }

    fn bits_from(rows: &[&[u8]]) -> TileBits {
        let dim_y = rows.len();
        let dim_x = rows[0].len();
        let mut bits = TileBits::new(dim_x, dim_y);
        for (j, row) in rows.iter().enumerate() {
            for (i, &cell) in row.iter().enumerate() {
                if cell == 1 {
                    bits.set(i, j);
                }
            }
        }
        bits
    }

    #[test]
    fn test_vertical_runs_within_one_tile() {
        let bits = bits_from(&[&[1, 0], &[1, 1], &[0, 1], &[1, 0]]);
        let tile = tile_at(0, 0, 0, 0, 2, 4);
        let mut vertical = vec![RunCarry::default(); 2];
        let mut white = vec![RunCarry::default(); 2];
        let mut fv = FrequencyDistribution::new(4);
        let mut fw = FrequencyDistribution::new(4);
        let mut points = vec![0u32; 2];

        detect_vertical_lines(&bits, &tile, &mut vertical, &mut white, &mut fv, &mut fw, &mut points);

        // Column 0: run of 2 closed at row 2, run of 1 still open at row 3.
        assert_eq!(fv.count(2), 1);
        assert_eq!(vertical[0], RunCarry { length: 1, start: 3 });
        // Column 1: white run of 1 closed, runs of 2 open.
        assert_eq!(fw.count(1), 1);
        assert_eq!(white[1], RunCarry { length: 1, start: 3 });
        assert_eq!(points, vec![3, 2]);
    }

    #[test]
    fn test_vertical_runs_continue_across_tiles() {
        let tile_top = tile_at(0, 0, 0, 0, 1, 2);
        let tile_bottom = tile_at(0, 1, 0, 2, 1, 2);
        let mut vertical = vec![RunCarry::default(); 1];
        let mut white = vec![RunCarry::default(); 1];
        let mut fv = FrequencyDistribution::new(4);
        let mut fw = FrequencyDistribution::new(4);
        let mut points = vec![0u32; 1];

        // Column recurrent at rows 0..3, empty at row 3.
        detect_vertical_lines(
            &bits_from(&[&[1], &[1]]),
            &tile_top,
            &mut vertical,
            &mut white,
            &mut fv,
            &mut fw,
            &mut points,
        );
        assert_eq!(vertical[0], RunCarry { length: 2, start: 0 });

        detect_vertical_lines(
            &bits_from(&[&[1], &[0]]),
            &tile_bottom,
            &mut vertical,
            &mut white,
            &mut fv,
            &mut fw,
            &mut points,
        );
        // The cross-boundary run of 3 closed at row 3.
        assert_eq!(fv.count(3), 1);
        assert_eq!(vertical[0].length, 0);
        assert_eq!(white[0], RunCarry { length: 1, start: 3 });
        assert_eq!(points[0], 3);
    }

    #[test]
    fn test_diagonal_symmetric_counts_main_diagonal_once() {
        // 3×3 all-ones tile on the main diagonal, no Theiler exclusion.
        let bits = bits_from(&[&[1, 1, 1], &[1, 1, 1], &[1, 1, 1]]);
        let tile = tile_at(0, 0, 0, 0, 3, 3);
        let mut carry = vec![0u32; 3];
        let mut freq = FrequencyDistribution::new(3);

        detect_diagonal_lines_symmetric(&bits, &tile, 0, &mut carry, &mut freq);

        // Upper triangle only: lines of length 3 (main), 2 and 1 stay open
        // at the tile edge as carryover.
        assert_eq!(carry, vec![3, 2, 1]);
        assert_eq!(freq.counts(), &[0, 0, 0]);
    }

    #[test]
    fn test_diagonal_theiler_excludes_near_diagonals() {
        let bits = bits_from(&[&[1, 1, 1], &[1, 1, 1], &[1, 1, 1]]);
        let tile = tile_at(0, 0, 0, 0, 3, 3);
        let mut carry = vec![0u32; 3];
        let mut freq = FrequencyDistribution::new(3);

        detect_diagonal_lines_symmetric(&bits, &tile, 2, &mut carry, &mut freq);

        // |i−j| < 2 never counts: only the separation-2 line survives.
        assert_eq!(carry, vec![0, 0, 1]);
    }

    #[test]
    fn test_diagonal_mirror_tile_walks_shifted() {
        // Tile left of the main diagonal: px < py, all cells have i < j.
        // With edge 2 at (0,1), slot 1 continues |i−j| = 1, slot 0 is |i−j| = 2.
        let bits = bits_from(&[&[1, 0], &[1, 1]]);
        let tile = tile_at(0, 1, 0, 2, 2, 2);
        let mut carry = vec![0u32; 2];
        let mut freq = FrequencyDistribution::new(4);

        detect_diagonal_lines_symmetric(&bits, &tile, 0, &mut carry, &mut freq);

        // Walk for |i−j| = 1 starts at local (1, 0): cells (1,0)=0, closes
        // nothing, then (2,1) is out of range... the walk covers (1,0) and
        // (1+1, 1) does not exist, so only one cell: bit 0 → stays closed.
        assert_eq!(carry[1], 0);
        // Walk for |i−j| = 2 would start at local (2, 0): out of range, the
        // slot is untouched.
        assert_eq!(carry[0], 0);
    }

    #[test]
    fn test_diagonal_asymmetric_covers_all_lines() {
        // 2×3 tile, every line walked once: slots 0..dim_x+dim_y-1.
        let bits = bits_from(&[&[1, 1], &[1, 1], &[1, 1]]);
        let tile = tile_at(0, 0, 0, 0, 2, 3);
        let mut carry = vec![0u32; 4];
        let mut freq = FrequencyDistribution::new(4);

        detect_diagonal_lines(&bits, &tile, 0, &mut carry, &mut freq);

        // Lines through the tile: bottom-left corner (len 1), middle-left
        // (len 2), main (len 2), top-right corner (len 1).
        assert_eq!(carry, vec![1, 2, 2, 1]);
    }

    #[test]
    fn test_diagonal_asymmetric_theiler_uses_absolute_separation() {
        let bits = bits_from(&[&[1, 1], &[1, 1]]);
        let tile = tile_at(0, 0, 0, 0, 2, 2);
        let mut carry = vec![0u32; 3];
        let mut freq = FrequencyDistribution::new(2);

        detect_diagonal_lines(&bits, &tile, 1, &mut carry, &mut freq);

        // Main diagonal excluded, both unit side lines kept.
        assert_eq!(carry, vec![1, 0, 1]);
    }

    #[test]
    fn test_diagonal_run_closes_inside_tile() {
        let bits = bits_from(&[&[1, 0, 0], &[0, 1, 0], &[0, 0, 0]]);
        let tile = tile_at(0, 0, 0, 0, 3, 3);
        let mut carry = vec![0u32; 3];
        let mut freq = FrequencyDistribution::new(3);

        detect_diagonal_lines_symmetric(&bits, &tile, 0, &mut carry, &mut freq);

        // Main diagonal run of 2 closes at cell (2,2).
        assert_eq!(freq.count(2), 1);
        assert_eq!(carry, vec![0, 0, 0]);
    }
}
