// Round-robin team assignment across category buckets.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use super::category::{bucketize, Category};
use crate::registrant::{RegistrantId, Roster};

/// Team slot counter shared by every category of a run, so balance carries
/// over from one category to the next instead of restarting at team 0.
#[derive(Debug, Clone, Default)]
pub struct TeamCursor {
    ticks: usize,
}

impl TeamCursor {
    pub fn new() -> Self {
        TeamCursor::default()
    }

    /// Return the current team and advance by one. `None` when there are no
    /// teams; the cursor does not move.
    pub fn next_team<'a>(&mut self, teams: &'a [String]) -> Option<&'a str> {
        if teams.is_empty() {
            return None;
        }
        let team = &teams[self.ticks % teams.len()];
        self.ticks += 1;
        Some(team)
    }

    /// Number of assignments handed out so far.
    pub fn ticks(&self) -> usize {
        self.ticks
    }
}

/// What happened to one category during the assignment run.
#[derive(Debug, Clone)]
pub struct CategoryAssignment {
    pub category: Category,
    /// Registrants placed by this category, in shuffled order.
    pub assigned: Vec<RegistrantId>,
    /// Matching registrants already placed by an earlier category.
    pub skipped: usize,
}

#[derive(Debug, Clone, Default)]
pub struct AssignmentReport {
    pub categories: Vec<CategoryAssignment>,
    /// Registrants that matched no category.
    pub unassigned: Vec<RegistrantId>,
}

/// Shuffle one bucket with a generator seeded from `seed` and deal it out
/// round-robin. Registrants that already have a team are dropped before the
/// shuffle and never consume a cursor tick. With no teams nobody is placed.
pub fn assign_bucket(
    roster: &mut Roster,
    bucket: &[RegistrantId],
    teams: &[String],
    cursor: &mut TeamCursor,
    seed: u64,
) -> Vec<RegistrantId> {
    if teams.is_empty() {
        return Vec::new();
    }

    let mut pending: Vec<RegistrantId> = bucket
        .iter()
        .copied()
        .filter(|id| roster.get(*id).is_some_and(|r| !r.assigned))
        .collect();

    let mut rng = StdRng::seed_from_u64(seed);
    pending.shuffle(&mut rng);

    for id in &pending {
        let Some(team) = cursor.next_team(teams) else {
            break;
        };
        if let Some(r) = roster.get_mut(*id) {
            r.assign_to(team);
            debug!("{} {} -> {}", r.id, r.full_name(), team);
        }
    }

    pending
}

/// Assign every registrant matched by `plan` to one of `teams`.
///
/// Categories are processed in plan order with one shared cursor. Each
/// category is shuffled with a fresh generator seeded from `seed`, so the
/// same roster and seed always produce the same teams.
pub fn assign_teams(
    mut roster: Roster,
    teams: &[String],
    plan: &[Category],
    seed: u64,
) -> (Roster, AssignmentReport) {
    let mut report = AssignmentReport::default();

    if teams.is_empty() {
        warn!("no teams configured; nobody can be assigned");
        report.unassigned = roster.unassigned();
        return (roster, report);
    }

    let mut cursor = TeamCursor::new();
    for category in plan {
        let bucket = bucketize(&roster, category);
        let assigned = assign_bucket(&mut roster, &bucket, teams, &mut cursor, seed);
        let skipped = bucket.len() - assigned.len();
        debug!(
            "category {}: {} assigned, {} already placed",
            category,
            assigned.len(),
            skipped
        );
        report.categories.push(CategoryAssignment {
            category: category.clone(),
            assigned,
            skipped,
        });
    }

    report.unassigned = roster.unassigned();
    for id in &report.unassigned {
        if let Some(r) = roster.get(*id) {
            warn!(
                "{} matched no category (positions {:?}/{:?}, competitive {:?}, \
                 skill {:?}); left unassigned",
                r.full_name(),
                r.position1,
                r.position2,
                r.competitive,
                r.skill
            );
        }
    }

    info!(
        "assigned {} of {} registrants across {} teams",
        cursor.ticks(),
        roster.len(),
        teams.len()
    );

    (roster, report)
}
