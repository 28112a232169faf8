//! # rqa: Tiled Recurrence Quantification Analysis
//!
//! ## Architecture Overview
//!
//! ### The problem with the full matrix
//!
//! A recurrence matrix over `N` embedded vectors has `N²` cells. At one byte
//! per cell, a series of 200k vectors needs 40 GB, far beyond main memory,
//! even though the quantitative measures derived from the matrix (recurrence
//! rate, determinism, laminarity, ...) only ever consume run *lengths*, never
//! the cells themselves.
//!
//! ### Tiled engine
//!
//! The engine therefore never materialises the full matrix for RQA. The
//! logical `N×N` matrix is partitioned into a `P×P` grid of sub-matrices of
//! edge length `E` (clamped to `2^16 − 1`). Tiles are scheduled in **waves**:
//! with diagonal ordering, wave `k` holds all tiles with `px + py = k`, which
//! guarantees that the tiles a given tile's line statistics depend on (same
//! column above, same diagonal to the upper-left) complete before it starts.
//!
//! ```text
//!   wave:   0    1    2
//!         ┌────┬────┬────┐           Each tile materialises its own
//!         │ 00 │ 10 │ 20 │           bit-packed sub-matrix, detects
//!         ├────┼────┼────┤           vertical / white-vertical / diagonal
//!         │ 01 │ 11 │ 21 │           runs, and persists still-open runs
//!         ├────┼────┼────┤           into shared carryover buffers that
//!         │ 02 │ 12 │ 22 │           the next wave continues from.
//!         └────┴────┴────┘
//!   wave:   2    3    4
//! ```
//!
//! ### Carryover protocol
//!
//! Runs of recurrence points cross tile boundaries. Per matrix column the
//! engine keeps the length and start row of the currently open vertical and
//! white-vertical run; per diagonal it keeps the open run length. Within one
//! wave no two tiles touch the same carryover slice, so workers synchronise
//! only at wave barriers and for brief slice copies.
//!
//! ### Memory layout
//!
//! Embedded vectors are produced on demand as flat, contiguous `f32` buffers
//! (vector `i` occupies `buf[i*m .. (i+1)*m]`). The distance loops walk two
//! such buffers sequentially, which keeps the hot path friendly to prefetch
//! and auto-vectorisation; a tile's recurrence bits are packed 64 per word,
//! column-major, so the aggregators stream whole columns out of L1.
//!
//! ### Workers and devices
//!
//! Compute devices are logical CPU workers. One rayon worker per selected
//! device pulls tiles from the current wave until it drains; waves are
//! separated by a barrier. Per-worker frequency distributions are merged at
//! wave boundaries, so the shared state touched mid-wave is limited to the
//! carryover buffers and the per-column recurrence point counts.

// Global allocator: mimalloc. Tile processing allocates short-lived vector
// and bit-matrix buffers on every tile; mimalloc's per-thread heaps keep
// those allocations contention-free across workers.
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

pub mod aggregate;
pub mod baseline;
pub mod carryover;
pub mod devices;
pub mod engine;
pub mod error;
pub mod kernels;
pub mod matrix;
pub mod metric;
pub mod neighbourhood;
pub mod plot;
pub mod reader;
pub mod result;
pub mod runtimes;
pub mod series;
pub mod settings;
pub mod tiles;

pub use devices::DeviceSet;
pub use engine::{EngineOptions, RecurrencePlotComputation, RqaComputation};
pub use error::{Error, Result};
pub use metric::Metric;
pub use neighbourhood::Neighbourhood;
pub use result::{RecurrencePlotResult, RqaResult};
pub use settings::Settings;
pub use tiles::ProcessingOrder;
