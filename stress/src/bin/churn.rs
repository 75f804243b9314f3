use clap::Parser;
use rayon::prelude::*;
use std::path::PathBuf;
use stress::{run_churn, ChurnStats, Workload};

/// A torture utility for the packtree allocator: seeded random
/// alloc/free workloads, with the tree cross-checked after every
/// single operation. One tree per trial; trials run in parallel.
#[derive(Parser, Debug)]
struct Arg {
    /// Width of the root region
    #[arg(long, default_value_t = 48)]
    width:      usize,

    /// Height of the root region
    #[arg(long, default_value_t = 24)]
    height:     usize,

    /// Operations per trial, before draining
    #[arg(long, default_value_t = 10_000)]
    ops:        usize,

    /// Number of independent trials
    #[arg(short, long, default_value_t = 8)]
    trials:     u64,

    /// Base seed; trial i runs with seed + i
    #[arg(short, long, default_value_t = 0)]
    seed:       u64,

    /// Probability that an operation allocates rather than frees
    #[arg(long, default_value_t = 0.6)]
    hold:       f64,

    /// Directory for pre-drain placement snapshots, one PNG per trial
    #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
    plot:       Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Arg::parse();
    assert!(
        (0.0..=1.0).contains(&cli.hold),
        "hold must be a probability"
    );
    if let Some(dir) = &cli.plot {
        std::fs::create_dir_all(dir)?;
    }

    let stats: Vec<(u64, ChurnStats)> = (0..cli.trials)
        .into_par_iter()
        .map(|i| {
            let w = Workload {
                width:  cli.width,
                height: cli.height,
                ops:    cli.ops,
                seed:   cli.seed + i,
                hold:   cli.hold,
            };
            let snap = cli.plot.as_ref().map(|d| d.join(format!("trial_{i}.png")));
            (w.seed, run_churn(&w, snap.as_deref()))
        })
        .collect();

    let total = (cli.width * cli.height) as f64;
    for (seed, s) in &stats {
        println!(
            "seed {}:\tallocs {}/{}\trequests {}/{}\tfrees {}\tpeak {:.1}% ({} leaves)",
            seed,
            s.allocs_ok,
            s.allocs_ok + s.allocs_failed,
            s.requests_ok,
            s.requests_ok + s.requests_failed,
            s.frees,
            s.peak_cells as f64 / total * 100.0,
            s.peak_leaves,
        );
    }

    let peak = stats.iter().map(|(_, s)| s.peak_cells).max().unwrap_or(0);
    let placed: usize = stats
        .iter()
        .map(|(_, s)| s.allocs_ok + s.requests_ok)
        .sum();
    println!(
        "{} trials done: {} placements, peak utilization {:.1}%",
        stats.len(),
        placed,
        peak as f64 / total * 100.0
    );

    Ok(())
}
