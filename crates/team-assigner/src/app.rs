// Pipeline wiring: load -> assign -> reconcile -> summarize -> write.
//
// Each stage takes the roster by value and hands it back, so the stages can
// also be driven one at a time from tests.

use anyhow::Context;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use crate::assign::{assign_teams, category_plan, reconcile_pairs, AssignmentReport, PairOutcome};
use crate::config::Config;
use crate::loader;
use crate::pairs::{self, PairRequest};
use crate::registrant::Roster;
use crate::summary::{self, SummaryTable};
use crate::writer;

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub roster: Roster,
    pub assignment: AssignmentReport,
    pub pair_outcomes: Vec<PairOutcome>,
    pub summary: SummaryTable,
}

/// Random source for substitute selection: seeded when `swap_seed` is set,
/// otherwise drawn from OS entropy.
pub fn swap_rng(config: &Config) -> StdRng {
    match config.assignment.swap_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// The in-memory part of a run: round-robin assignment, then pair
/// reconciliation, then the summary table.
pub fn process<R: Rng + ?Sized>(
    roster: Roster,
    pair_requests: &[PairRequest],
    config: &Config,
    rng: &mut R,
) -> RunReport {
    let plan = category_plan(&config.assignment);
    let (roster, assignment) = assign_teams(
        roster,
        &config.league.teams,
        &plan,
        config.assignment.seed,
    );

    let (roster, pair_outcomes) = reconcile_pairs(
        roster,
        pair_requests,
        &config.assignment.protected,
        config.assignment.sort_mode,
        rng,
    );

    let summary = summary::summarize(
        &roster,
        &config.league.teams,
        &config.league.unassigned_label,
    );

    RunReport {
        roster,
        assignment,
        pair_outcomes,
        summary,
    }
}

/// Run the whole pipeline against the files named in `config`.
pub fn run(config: &Config) -> anyhow::Result<RunReport> {
    // 1. Load roster
    let roster_path = config.resolve(&config.data_paths.roster);
    let roster = loader::load_roster(&roster_path, &config.columns, &config.responses)
        .with_context(|| format!("failed to load roster {}", roster_path.display()))?;
    info!("Loaded {} registrants from {}", roster.len(), roster_path.display());
    if roster.is_empty() {
        warn!("roster is empty; nothing to assign");
    }

    // 2. Load pair requests (optional)
    let pair_requests = match &config.data_paths.pairs {
        Some(path) => {
            let path = config.resolve(path);
            let loaded = pairs::load_pairs(&path)
                .with_context(|| format!("failed to load pair requests {}", path.display()))?;
            info!("Loaded {} pair requests", loaded.len());
            loaded
        }
        None => Vec::new(),
    };

    // 3. Assign, reconcile, summarize
    let mut rng = swap_rng(config);
    let report = process(roster, &pair_requests, config, &mut rng);

    // 4. Write outputs
    let output_path = config.resolve(&config.data_paths.output);
    writer::write_assignments(&output_path, &report.roster, &config.league.unassigned_label)
        .with_context(|| format!("failed to write {}", output_path.display()))?;
    info!("Wrote assignments to {}", output_path.display());

    let summary_path = config.resolve(&config.data_paths.summary);
    summary::write_summary(&summary_path, &report.summary)
        .with_context(|| format!("failed to write {}", summary_path.display()))?;
    info!("Wrote summary to {}", summary_path.display());

    Ok(report)
}
