//! Command line front-end for recurrence analysis.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use rqa::engine::DEFAULT_EDGE_LENGTH;
use rqa::{
    plot, reader, DeviceSet, EngineOptions, Metric, Neighbourhood, RecurrencePlotComputation,
    RqaComputation, Settings,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ComputationType {
    /// Recurrence plot: the full matrix, written as a PNG.
    Rp,
    /// Recurrence quantification analysis: the derived measures.
    Rqa,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum NeighbourhoodArg {
    /// Fixed radius.
    Fr,
    /// Radius corridor.
    Rc,
    /// Fixed amount of nearest neighbours.
    Fan,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MetricArg {
    Taxicab,
    Euclidean,
    Maximum,
}

impl From<MetricArg> for Metric {
    fn from(arg: MetricArg) -> Metric {
        match arg {
            MetricArg::Taxicab => Metric::Taxicab,
            MetricArg::Euclidean => Metric::Euclidean,
            MetricArg::Maximum => Metric::Maximum,
        }
    }
}

/// Recurrence plots and recurrence quantification analysis for long time
/// series.
#[derive(Parser, Debug)]
#[command(name = "rqa", version, about)]
struct Args {
    /// Type of computation.
    #[arg(value_enum)]
    computation: ComputationType,

    /// Input text file holding the series.
    input_file: PathBuf,

    /// Neighbourhood for detecting recurrences.
    #[arg(short = 'n', long, value_enum, default_value = "fr")]
    neighbourhood: NeighbourhoodArg,

    /// Column delimiter in the input file.
    #[arg(short = 'd', long, default_value_t = ',')]
    delimiter: char,

    /// Zero-based data column within the file.
    #[arg(short = 'c', long, default_value_t = 0)]
    column: usize,

    /// Leading input lines to skip.
    #[arg(short = 's', long, default_value_t = 0)]
    skip: usize,

    /// Output file (PNG for rp, text for rqa); stdout when omitted.
    #[arg(short = 'o', long)]
    output_file: Option<PathBuf>,

    /// Embedding dimension.
    #[arg(short = 'm', long, default_value_t = 2)]
    embedding_dimension: usize,

    /// Time delay.
    #[arg(short = 't', long, default_value_t = 2)]
    time_delay: usize,

    /// Minimum diagonal line length (L_min).
    #[arg(long = "l-min", default_value_t = 2)]
    min_diagonal_line_length: usize,

    /// Minimum vertical line length (V_min).
    #[arg(long = "v-min", default_value_t = 2)]
    min_vertical_line_length: usize,

    /// Minimum white vertical line length (W_min).
    #[arg(long = "w-min", default_value_t = 2)]
    min_white_vertical_line_length: usize,

    /// Theiler corrector.
    #[arg(short = 'w', long, default_value_t = 1)]
    theiler_corrector: usize,

    /// Edge length of the sub matrices.
    #[arg(short = 'z', long, default_value_t = DEFAULT_EDGE_LENGTH)]
    edge_length: usize,

    /// Radius of the fixed radius neighbourhood.
    #[arg(short = 'r', long, default_value_t = 1.0)]
    radius: f32,

    /// Inner radius of the radius corridor neighbourhood.
    #[arg(long, default_value_t = 0.1)]
    inner_radius: f32,

    /// Outer radius of the radius corridor neighbourhood.
    #[arg(long, default_value_t = 1.0)]
    outer_radius: f32,

    /// Amount of nearest neighbours.
    #[arg(short = 'k', long, default_value_t = 10)]
    nearest_neighbours: u32,

    /// Distance metric.
    #[arg(long, value_enum, default_value = "euclidean")]
    metric: MetricArg,

    /// Compute devices to run on, e.g. --devices 0,1. All when omitted.
    #[arg(long, value_delimiter = ',')]
    devices: Option<Vec<usize>>,

    /// Log engine progress (RUST_LOG overrides).
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let series = reader::series_from_file(&args.input_file, args.delimiter, args.column, args.skip)
        .with_context(|| format!("reading series from '{}'", args.input_file.display()))?;

    let neighbourhood = match args.neighbourhood {
        NeighbourhoodArg::Fr => Neighbourhood::fixed_radius(args.radius),
        NeighbourhoodArg::Rc => Neighbourhood::radius_corridor(args.inner_radius, args.outer_radius)?,
        NeighbourhoodArg::Fan => Neighbourhood::nearest_neighbours(args.nearest_neighbours),
    };

    let settings = Settings::new(
        series,
        args.embedding_dimension,
        args.time_delay,
        args.metric.into(),
        neighbourhood,
    )?
    .with_theiler_corrector(args.theiler_corrector)
    .with_min_line_lengths(
        args.min_diagonal_line_length,
        args.min_vertical_line_length,
        args.min_white_vertical_line_length,
    )?;

    let devices = match &args.devices {
        Some(indices) => DeviceSet::select(indices)?,
        None => DeviceSet::detect(),
    };
    let options = EngineOptions {
        edge_length: args.edge_length,
        devices,
    };

    match args.computation {
        ComputationType::Rqa => {
            let computation = RqaComputation::create(settings, options)?;
            let result = computation.run()?;
            match &args.output_file {
                Some(path) => fs::write(path, result.to_string())
                    .with_context(|| format!("writing '{}'", path.display()))?,
                None => {
                    print!("{result}");
                    println!();
                    print!("{}", result.runtimes());
                }
            }
        }
        ComputationType::Rp => {
            let computation = RecurrencePlotComputation::create(settings, options)?;
            let result = computation.run()?;
            match &args.output_file {
                Some(path) => plot::save(result.recurrence_matrix(), path)
                    .with_context(|| format!("writing '{}'", path.display()))?,
                None => {
                    let matrix = result.recurrence_matrix();
                    println!("Recurrence matrix: {0} x {0}", matrix.size());
                    println!("Recurrence points: {}", matrix.count_ones());
                    println!();
                    print!("{}", result.runtimes());
                }
            }
        }
    }

    Ok(())
}
