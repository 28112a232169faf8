//! ```bash
//! RUSTFLAGS="-C target-cpu=native" cargo run --example long_series --release
//! ```

use std::time::Instant;

use rand::{rngs::StdRng, Rng, SeedableRng};

use rqa::baseline::BaselineRqa;
use rqa::{DeviceSet, EngineOptions, Metric, Neighbourhood, RqaComputation, RqaResult, Settings};

/// Series length for the demo run.
const LEN: usize = 10_000;
/// Tile edge length; small enough that the run exercises many waves.
const EDGE_LENGTH: usize = 1_024;
/// Neighbourhood radius.
const RADIUS: f32 = 0.25;
/// Deterministic seed for reproducibility.
const SEED: u64 = 42;

/// A noisy sine: enough structure for diagonal lines, enough noise for the
/// distributions to be non-trivial.
fn generate_series(rng: &mut StdRng, len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| (i as f32 * 0.05).sin() + rng.gen::<f32>() * 0.2)
        .collect()
}

fn divider() {
    println!("{}", "─".repeat(60));
}

fn main() -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║        rqa Long Series Analysis & Oracle Verifier        ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();

    // ── Phase 1: Data Generation ─────────────────────────────────────────────
    divider();
    println!("Phase 1 — Generating series");
    println!("  Samples:  {LEN}");

    let t0 = Instant::now();
    let mut rng = StdRng::seed_from_u64(SEED);
    let series = generate_series(&mut rng, LEN);
    println!("  Generated in {:?}", t0.elapsed());

    let settings = Settings::new(
        series,
        2,
        2,
        Metric::Euclidean,
        Neighbourhood::fixed_radius(RADIUS),
    )?
    .with_theiler_corrector(1)
    .with_min_line_lengths(2, 2, 2)?;

    println!("  Vectors:  {}", settings.number_of_vectors());

    // ── Phase 2: Tiled Analysis ──────────────────────────────────────────────
    divider();
    println!("Phase 2 — Tiled RQA across {} device(s)", DeviceSet::available());

    let t0 = Instant::now();
    let computation = RqaComputation::create(
        settings.clone(),
        EngineOptions {
            edge_length: EDGE_LENGTH,
            devices: DeviceSet::detect(),
        },
    )?;
    let result = computation.run()?;
    let tiled_duration = t0.elapsed();
    println!("  Analysed in {tiled_duration:?}");
    println!(
        "  Throughput: {:.0} cells/sec",
        (settings.number_of_vectors() as f64).powi(2) / tiled_duration.as_secs_f64()
    );
    println!();
    print!("{result}");

    // ── Phase 3: Oracle Verification ─────────────────────────────────────────
    divider();
    println!("Phase 3 — Scalar oracle comparison");

    let t0 = Instant::now();
    let oracle = BaselineRqa::new(&settings).run()?;
    println!("  Oracle ran in {:?}", t0.elapsed());

    let matches = result.recurrence_points() == oracle.recurrence_points()
        && result.diagonal_frequency_distribution() == oracle.diagonal_frequency_distribution()
        && result.vertical_frequency_distribution() == oracle.vertical_frequency_distribution()
        && result.white_vertical_frequency_distribution()
            == oracle.white_vertical_frequency_distribution();
    println!(
        "  Counters match: {}",
        if matches { "yes" } else { "NO — BUG" }
    );
    assert!(matches, "tiled engine disagrees with the oracle");

    // ── Phase 4: Persistence Roundtrip ───────────────────────────────────────
    divider();
    println!("Phase 4 — Result persistence");

    let mut buffer = Vec::new();
    result.save(&mut buffer)?;
    println!("  Serialized result: {} bytes", buffer.len());

    let loaded = RqaResult::load(buffer.as_slice())?;
    println!(
        "  Reloaded, determinism drift: {:e}",
        (loaded.determinism() - result.determinism()).abs()
    );

    // ── Phase 5: Runtimes ────────────────────────────────────────────────────
    divider();
    println!("Phase 5 — Per-phase runtimes (summed over workers)");
    println!();
    print!("{}", result.runtimes());

    Ok(())
}
