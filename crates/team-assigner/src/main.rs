// Team assigner entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Initialize tracing (stderr, so warnings reach the operator)
// 3. Load config, apply command-line overrides
// 4. Run the pipeline
// 5. Print the summary and any unsatisfied requests

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use team_assigner::app;
use team_assigner::config;

/// Split a signup roster into balanced teams and honor "play with" requests.
#[derive(Parser, Debug)]
#[command(name = "team-assigner")]
#[command(version)]
struct Args {
    /// Directory holding config/ (and defaults/); data paths resolve here
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,

    /// Override the assignment shuffle seed
    #[arg(long, env = "TEAM_ASSIGNER_SEED")]
    seed: Option<u64>,

    /// Make substitute selection reproducible with this seed
    #[arg(long, env = "TEAM_ASSIGNER_SWAP_SEED")]
    swap_seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    // 1. Parse arguments
    let args = Args::parse();

    // 2. Initialize tracing
    init_tracing()?;

    // 3. Load config
    let mut config = config::load_config(&args.base_dir).context("failed to load configuration")?;
    if let Some(seed) = args.seed {
        config.assignment.seed = seed;
    }
    if args.swap_seed.is_some() {
        config.assignment.swap_seed = args.swap_seed;
    }
    info!(
        "Config loaded: league={}, {} teams, seed {}",
        config.league.name,
        config.league.num_teams(),
        config.assignment.seed
    );

    // 4. Run
    let report = app::run(&config)?;

    // 5. Report
    println!("{}", report.summary);
    for id in &report.assignment.unassigned {
        if let Some(r) = report.roster.get(*id) {
            println!("{}: {}", config.league.unassigned_label, r.full_name());
        }
    }
    let unsatisfied = report
        .pair_outcomes
        .iter()
        .filter(|o| !o.is_satisfied())
        .count();
    if unsatisfied > 0 {
        warn!("{unsatisfied} pair requests could not be satisfied");
    }

    Ok(())
}

/// Initialize tracing to stderr, filtered by `RUST_LOG`.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("team_assigner=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
