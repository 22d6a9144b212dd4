use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use spin_hmc::config::{RunConfig, SamplerConfig, SamplerMethod};
use spin_hmc::model::run_heisenberg;

/// Sample a classical Heisenberg lattice with HMC or NUTS.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Run file: `n_samples d0 d1 d2 H J beta eps`.
    input: PathBuf,
    /// Output file, one `energy magnetisation` pair per line.
    output: PathBuf,
    #[arg(long, default_value_t = 1000)]
    seed: u64,
    /// Sampler: 'hmc' or 'nuts'.
    #[arg(long, default_value = "nuts")]
    method: String,
    /// Trajectory length for HMC (ignored by NUTS).
    #[arg(long, default_value_t = 10)]
    leapfrog_steps: usize,
    #[arg(long, default_value_t = 15)]
    max_tree_depth: usize,
    #[arg(long, default_value_t = 1000.0)]
    divergence_threshold: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let run = RunConfig::from_file(&args.input)
        .with_context(|| format!("reading run file {}", args.input.display()))?;
    let method = SamplerMethod::try_from(args.method.as_str()).map_err(anyhow::Error::msg)?;
    let sampler = SamplerConfig {
        method,
        leapfrog_steps: args.leapfrog_steps,
        max_tree_depth: args.max_tree_depth,
        divergence_threshold: args.divergence_threshold,
    };

    info!(
        dims = ?run.dims,
        n_samples = run.n_samples,
        beta = run.beta,
        method = %args.method,
        "starting run"
    );

    let pb = ProgressBar::new(run.n_samples as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{msg} [{bar:40}] {pos}/{len} [{elapsed_precise} < {eta_precise}, {per_sec}]",
        )?
        .progress_chars("=> "),
    );
    pb.set_message("sampling");

    let out = run_heisenberg(&run, &sampler, args.seed, &|| pb.inc(1))?;
    pb.finish();

    info!(
        accepted = out.diagnostics.accepted,
        divergences = out.diagnostics.divergences,
        depth_cap_hits = out.diagnostics.depth_cap_hits,
        "run finished"
    );

    let file = File::create(&args.output)
        .with_context(|| format!("creating output file {}", args.output.display()))?;
    let mut writer = BufWriter::new(file);
    for (e, m) in out.energies.iter().zip(out.magnetisations.iter()) {
        writeln!(writer, "{e} {m}")?;
    }
    writer.flush()?;

    Ok(())
}
