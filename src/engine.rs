//! The tiled engine.
//!
//! [`RqaComputation`] runs the full pipeline without ever holding the `N×N`
//! matrix: tiles are processed wave by wave in diagonal order, each worker
//! materialising one bit-packed sub-matrix at a time and feeding the line
//! aggregators. [`RecurrencePlotComputation`] shares the planner and kernels
//! but assembles the full matrix (bulk order, no carryover dependencies).
//!
//! Shared state during a wave is limited to the carryover buffers and the
//! recurrence point counts; the wave partition guarantees disjoint slices,
//! so a tile only takes the lock to copy its slices in and out. Frequency
//! distributions and runtimes accumulate per worker and merge at the wave
//! barrier.

use std::time::Instant;

use parking_lot::Mutex;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::aggregate;
use crate::carryover::CarryoverState;
use crate::devices::DeviceSet;
use crate::error::{Error, Result};
use crate::kernels::{self, ComputationKind, Kernel, TileInput};
use crate::matrix::{RecurrenceMatrix, TileBits};
use crate::neighbourhood::Neighbourhood;
use crate::result::{FrequencyDistribution, RecurrencePlotResult, RqaResult};
use crate::runtimes::Runtimes;
use crate::settings::Settings;
use crate::tiles::{ProcessingOrder, Tile, TilePlan};

/// Default sub-matrix edge length.
pub const DEFAULT_EDGE_LENGTH: usize = 10_240;

/// Engine tuning knobs.
#[derive(Clone, Debug)]
pub struct EngineOptions {
    /// Sub-matrix edge length, clamped by the planner.
    pub edge_length: usize,
    /// Compute devices to run workers on.
    pub devices: DeviceSet,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            edge_length: DEFAULT_EDGE_LENGTH,
            devices: DeviceSet::detect(),
        }
    }
}

/// Mid-wave shared state: written by at most one tile per slice per wave.
struct SharedState {
    recurrence_points: Vec<u32>,
    carryover: CarryoverState,
}

/// Per-worker accumulation of everything that merges associatively.
struct WorkerAccumulator {
    diagonal: FrequencyDistribution,
    vertical: FrequencyDistribution,
    white_vertical: FrequencyDistribution,
    runtimes: Runtimes,
}

impl WorkerAccumulator {
    fn new(n: usize) -> Self {
        Self {
            diagonal: FrequencyDistribution::new(n),
            vertical: FrequencyDistribution::new(n),
            white_vertical: FrequencyDistribution::new(n),
            runtimes: Runtimes::default(),
        }
    }

    fn merged(mut self, other: WorkerAccumulator) -> Self {
        self.diagonal.merge(&other.diagonal);
        self.vertical.merge(&other.vertical);
        self.white_vertical.merge(&other.white_vertical);
        self.runtimes += other.runtimes;
        self
    }
}

/// Recurrence quantification analysis over the tiled engine.
pub struct RqaComputation {
    settings: Settings,
    options: EngineOptions,
    kernel: Kernel,
    radius: f32,
}

impl RqaComputation {
    /// Resolve kernels and validate devices. Fails for neighbourhoods the
    /// optimised engine has no kernel for.
    pub fn create(settings: Settings, options: EngineOptions) -> Result<Self> {
        let kernel = kernels::select(ComputationKind::Rqa, settings.metric(), settings.neighbourhood())?;
        if options.devices.is_empty() {
            return Err(Error::device("no compute device specified"));
        }
        let Neighbourhood::FixedRadius { radius } = *settings.neighbourhood() else {
            return Err(Error::unsupported(format!(
                "the tiled engine supports only the fixed radius neighbourhood, got {}",
                settings.neighbourhood().name()
            )));
        };
        debug!(kernel = kernel.name, "kernel resolved");
        Ok(Self {
            settings,
            options,
            kernel,
            radius,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn run(&self) -> Result<RqaResult> {
        self.run_with_symmetry(self.settings.is_matrix_symmetric())
    }

    /// The symmetry flag decides the diagonal carry layout (`N` mirrored
    /// slots vs `2N−1`) and whether the diagonal distribution is doubled at
    /// the end. Split out so the general layout stays testable with the
    /// symmetric metrics.
    fn run_with_symmetry(&self, symmetric: bool) -> Result<RqaResult> {
        let n = self.settings.number_of_vectors();
        let theiler = self.settings.theiler_corrector();
        let plan = TilePlan::new(n, self.options.edge_length, ProcessingOrder::Diagonal);
        let pool = self.options.devices.build_pool()?;

        info!(
            n,
            edge_length = plan.edge_length(),
            partitions = plan.partitions(),
            workers = self.options.devices.len(),
            symmetric,
            "starting tiled RQA"
        );

        let shared = Mutex::new(SharedState {
            recurrence_points: vec![0u32; n],
            carryover: CarryoverState::new(n, symmetric),
        });

        let mut diagonal = FrequencyDistribution::new(n);
        let mut vertical = FrequencyDistribution::new(n);
        let mut white_vertical = FrequencyDistribution::new(n);
        let mut runtimes = Runtimes::default();

        for (wave_index, wave) in plan.waves().iter().enumerate() {
            let accumulator = pool.install(|| {
                wave.par_iter()
                    .try_fold(
                        || WorkerAccumulator::new(n),
                        |mut accumulator, tile| {
                            self.process_tile(tile, symmetric, theiler, &shared, &mut accumulator)?;
                            Ok::<WorkerAccumulator, Error>(accumulator)
                        },
                    )
                    .try_reduce(
                        || WorkerAccumulator::new(n),
                        |a, b| Ok::<WorkerAccumulator, Error>(a.merged(b)),
                    )
            })?;

            diagonal.merge(&accumulator.diagonal);
            vertical.merge(&accumulator.vertical);
            white_vertical.merge(&accumulator.white_vertical);
            runtimes += accumulator.runtimes;
            debug!(wave = wave_index, tiles = wave.len(), "wave drained");
        }

        let SharedState {
            recurrence_points,
            carryover,
        } = shared.into_inner();
        carryover.finalise(&mut diagonal, &mut vertical, &mut white_vertical);

        if symmetric {
            // One scan per line pair; mirror the counts, then drop the twin
            // of the main diagonal, which has none. Only a full-length run
            // can be the main diagonal; with a zero radius it never recurs
            // and there is nothing to drop.
            diagonal.double();
            if theiler == 0 && diagonal.count(n) > 0 {
                diagonal.remove_one(n);
            }
        }

        info!("tiled RQA finished");
        Ok(RqaResult::new(
            &self.settings,
            recurrence_points,
            diagonal,
            vertical,
            white_vertical,
            runtimes,
        ))
    }

    fn process_tile(
        &self,
        tile: &Tile,
        symmetric: bool,
        theiler: usize,
        shared: &Mutex<SharedState>,
        accumulator: &mut WorkerAccumulator,
    ) -> Result<()> {
        let embedding = self.settings.embedding();

        // Transfer in: tile-local vector buffers plus the carryover slices
        // this tile owns.
        let started = Instant::now();
        let vectors_x = embedding.vectors(tile.start_x, tile.dim_x)?;
        let vectors_y = embedding.vectors(tile.start_y, tile.dim_y)?;
        let column_range = CarryoverState::column_range(tile);
        let (mut vertical_carry, mut white_carry, mut diagonal_carry, diagonal_range) = {
            let state = shared.lock();
            let diagonal_range = state.carryover.diagonal_range(tile);
            (
                state.carryover.vertical_slice(column_range.clone()),
                state.carryover.white_vertical_slice(column_range.clone()),
                state.carryover.diagonal_slice(diagonal_range.clone()),
                diagonal_range,
            )
        };
        accumulator.runtimes.transfer_to_device += started.elapsed();

        let started = Instant::now();
        let mut bits = TileBits::new(tile.dim_x, tile.dim_y);
        (self.kernel.materialise)(
            &TileInput {
                vectors_x: &vectors_x,
                vectors_y: &vectors_y,
                dimension: self.settings.embedding_dimension(),
                radius: self.radius,
            },
            &mut bits,
        );
        accumulator.runtimes.create_matrix += started.elapsed();

        let started = Instant::now();
        let mut column_points = vec![0u32; tile.dim_x];
        aggregate::detect_vertical_lines(
            &bits,
            tile,
            &mut vertical_carry,
            &mut white_carry,
            &mut accumulator.vertical,
            &mut accumulator.white_vertical,
            &mut column_points,
        );
        accumulator.runtimes.detect_vertical_lines += started.elapsed();

        let started = Instant::now();
        if symmetric {
            aggregate::detect_diagonal_lines_symmetric(
                &bits,
                tile,
                theiler,
                &mut diagonal_carry,
                &mut accumulator.diagonal,
            );
        } else {
            aggregate::detect_diagonal_lines(
                &bits,
                tile,
                theiler,
                &mut diagonal_carry,
                &mut accumulator.diagonal,
            );
        }
        accumulator.runtimes.detect_diagonal_lines += started.elapsed();

        // Transfer out: write the tile's slices back.
        let started = Instant::now();
        {
            let mut state = shared.lock();
            state
                .carryover
                .store_vertical(column_range.clone(), &vertical_carry);
            state
                .carryover
                .store_white_vertical(column_range.clone(), &white_carry);
            state.carryover.store_diagonal(diagonal_range, &diagonal_carry);
            for (offset, points) in column_points.iter().enumerate() {
                state.recurrence_points[tile.start_x + offset] += points;
            }
        }
        accumulator.runtimes.transfer_from_device += started.elapsed();

        Ok(())
    }
}

/// Full recurrence matrix materialisation over the tiled engine.
pub struct RecurrencePlotComputation {
    settings: Settings,
    options: EngineOptions,
    kernel: Kernel,
    radius: f32,
}

impl RecurrencePlotComputation {
    pub fn create(settings: Settings, options: EngineOptions) -> Result<Self> {
        let kernel = kernels::select(
            ComputationKind::RecurrencePlot,
            settings.metric(),
            settings.neighbourhood(),
        )?;
        if options.devices.is_empty() {
            return Err(Error::device("no compute device specified"));
        }
        let Neighbourhood::FixedRadius { radius } = *settings.neighbourhood() else {
            return Err(Error::unsupported(format!(
                "the tiled engine supports only the fixed radius neighbourhood, got {}",
                settings.neighbourhood().name()
            )));
        };
        Ok(Self {
            settings,
            options,
            kernel,
            radius,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn run(&self) -> Result<RecurrencePlotResult> {
        let n = self.settings.number_of_vectors();
        // No line detection, no carryover dependencies: every tile may run
        // in the same wave.
        let plan = TilePlan::new(n, self.options.edge_length, ProcessingOrder::Bulk);
        let pool = self.options.devices.build_pool()?;

        info!(
            n,
            edge_length = plan.edge_length(),
            workers = self.options.devices.len(),
            "starting recurrence plot"
        );

        let embedding = self.settings.embedding();
        let matrix = Mutex::new(RecurrenceMatrix::new(n));

        let runtimes = pool.install(|| {
            plan.waves()[0]
                .par_iter()
                .try_fold(Runtimes::default, |mut runtimes: Runtimes, tile| {
                    let started = Instant::now();
                    let vectors_x = embedding.vectors(tile.start_x, tile.dim_x)?;
                    let vectors_y = embedding.vectors(tile.start_y, tile.dim_y)?;
                    runtimes.transfer_to_device += started.elapsed();

                    let started = Instant::now();
                    let mut bits = TileBits::new(tile.dim_x, tile.dim_y);
                    (self.kernel.materialise)(
                        &TileInput {
                            vectors_x: &vectors_x,
                            vectors_y: &vectors_y,
                            dimension: self.settings.embedding_dimension(),
                            radius: self.radius,
                        },
                        &mut bits,
                    );
                    runtimes.create_matrix += started.elapsed();

                    let started = Instant::now();
                    matrix.lock().insert_tile(tile, &bits);
                    runtimes.transfer_from_device += started.elapsed();
                    Ok::<Runtimes, Error>(runtimes)
                })
                .try_reduce(Runtimes::default, |a, b| Ok::<Runtimes, Error>(a + b))
        })?;

        info!("recurrence plot finished");
        Ok(RecurrencePlotResult::new(matrix.into_inner(), runtimes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::BaselineRqa;
    use crate::metric::Metric;

    fn settings(series: Vec<f32>, radius: f32) -> Settings {
        Settings::new(
            series,
            2,
            1,
            Metric::Euclidean,
            Neighbourhood::fixed_radius(radius),
        )
        .unwrap()
        .with_theiler_corrector(0)
        .with_min_line_lengths(2, 2, 2)
        .unwrap()
    }

    fn wavy_series(len: usize) -> Vec<f32> {
        (0..len).map(|i| (i as f32 * 0.7).sin()).collect()
    }

    fn options(edge_length: usize) -> EngineOptions {
        EngineOptions {
            edge_length,
            devices: DeviceSet::detect(),
        }
    }

    #[test]
    fn test_corridor_rejected_at_creation() {
        let series = wavy_series(16);
        let settings = Settings::new(
            series,
            1,
            1,
            Metric::Euclidean,
            Neighbourhood::radius_corridor(0.1, 0.5).unwrap(),
        )
        .unwrap();
        assert!(matches!(
            RqaComputation::create(settings, EngineOptions::default()),
            Err(Error::Unsupported { .. })
        ));
    }

    #[test]
    fn test_general_layout_agrees_with_oracle() {
        // The general (2N−1 slot) diagonal layout must count each line off
        // the main diagonal once, matching the oracle exactly with no
        // doubling step.
        let settings = settings(wavy_series(60), 0.4);
        let oracle = BaselineRqa::new(&settings).run().unwrap();

        let computation = RqaComputation::create(settings, options(17)).unwrap();
        let result = computation.run_with_symmetry(false).unwrap();

        assert_eq!(result.recurrence_points(), oracle.recurrence_points());
        assert_eq!(
            result.diagonal_frequency_distribution(),
            oracle.diagonal_frequency_distribution()
        );
        assert_eq!(
            result.vertical_frequency_distribution(),
            oracle.vertical_frequency_distribution()
        );
        assert_eq!(
            result.white_vertical_frequency_distribution(),
            oracle.white_vertical_frequency_distribution()
        );
    }

    #[test]
    fn test_symmetric_and_general_layouts_agree() {
        let settings = settings(wavy_series(75), 0.3);
        let computation = RqaComputation::create(settings, options(20)).unwrap();

        let symmetric = computation.run_with_symmetry(true).unwrap();
        let general = computation.run_with_symmetry(false).unwrap();

        assert_eq!(
            symmetric.diagonal_frequency_distribution(),
            general.diagonal_frequency_distribution()
        );
        assert_eq!(
            symmetric.recurrence_points(),
            general.recurrence_points()
        );
    }

    #[test]
    fn test_runs_are_deterministic() {
        let settings = settings(wavy_series(50), 0.5);
        let computation = RqaComputation::create(settings, options(13)).unwrap();
        let first = computation.run().unwrap();
        let second = computation.run().unwrap();
        assert_eq!(first.recurrence_points(), second.recurrence_points());
        assert_eq!(
            first.diagonal_frequency_distribution(),
            second.diagonal_frequency_distribution()
        );
        assert_eq!(
            first.vertical_frequency_distribution(),
            second.vertical_frequency_distribution()
        );
    }

    #[test]
    fn test_single_device_matches_many() {
        let settings = settings(wavy_series(64), 0.5);
        let single = RqaComputation::create(
            settings.clone(),
            EngineOptions {
                edge_length: 15,
                devices: DeviceSet::select(&[0]).unwrap(),
            },
        )
        .unwrap()
        .run()
        .unwrap();
        let many = RqaComputation::create(settings, options(15))
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(single.recurrence_points(), many.recurrence_points());
        assert_eq!(
            single.diagonal_frequency_distribution(),
            many.diagonal_frequency_distribution()
        );
    }
}
