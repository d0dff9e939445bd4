// Pair reconciliation: best-effort swaps so requested pairs share a team.
//
// For each (mover, anchor) request, in order, find a substitute on the
// anchor's team in the mover's category and trade places with them. Anyone
// placed this way is pinned so later requests cannot undo it.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, warn};

use super::category::Criterion;
use crate::config::SortMode;
use crate::pairs::PairRequest;
use crate::registrant::{FullName, RegistrantId, Roster};

/// Result of processing one pair request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairOutcome {
    /// A name in the request matched nobody on the roster.
    Unresolved { name: FullName },
    /// One of the pair has no team to swap from or onto.
    Unassigned { name: FullName },
    /// Already on the same team; both are now pinned.
    AlreadyTogether { team: String },
    /// The mover is pinned elsewhere by an earlier request or the protected list.
    MoverPinned { team: String },
    /// Mover and substitute traded teams.
    Swapped {
        mover: RegistrantId,
        substitute: RegistrantId,
        from_team: String,
        to_team: String,
        /// The substitute was found through the mover's second position.
        relaxed: bool,
    },
    /// Nobody on the anchor's team could take the mover's place.
    NoSubstitute,
}

impl PairOutcome {
    pub fn is_satisfied(&self) -> bool {
        matches!(
            self,
            PairOutcome::AlreadyTogether { .. } | PairOutcome::Swapped { .. }
        )
    }
}

impl fmt::Display for PairOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairOutcome::Unresolved { name } => write!(f, "no registrant named {name}"),
            PairOutcome::Unassigned { name } => write!(f, "{name} has no team"),
            PairOutcome::AlreadyTogether { team } => write!(f, "already together on {team}"),
            PairOutcome::MoverPinned { team } => write!(f, "mover is pinned to {team}"),
            PairOutcome::Swapped {
                from_team,
                to_team,
                relaxed,
                ..
            } => {
                write!(f, "swapped {from_team} -> {to_team}")?;
                if *relaxed {
                    f.write_str(" (via second position)")?;
                }
                Ok(())
            }
            PairOutcome::NoSubstitute => f.write_str("no equivalent substitute"),
        }
    }
}

/// Pin every registrant named in `names`. Returns the names that matched
/// nobody.
pub fn protect(roster: &mut Roster, names: &[String]) -> Vec<String> {
    let mut missing = Vec::new();
    for raw in names {
        let name = FullName::parse(raw);
        match roster.find_by_name(&name).and_then(|id| roster.get_mut(id)) {
            Some(r) => {
                r.do_not_reassign = true;
                info!("{} is protected from reassignment", r.full_name());
            }
            None => {
                warn!("protected registrant {name} is not on the roster");
                missing.push(raw.clone());
            }
        }
    }
    missing
}

/// Candidates on `team` whose primary position is `position` and whose
/// criterion value equals `criterion`, excluding pinned registrants and the
/// anchor.
fn substitutes(
    roster: &Roster,
    team: &str,
    position: &str,
    criterion: Option<Criterion>,
    mode: SortMode,
    anchor: RegistrantId,
) -> Vec<RegistrantId> {
    roster
        .iter()
        .filter(|r| r.id != anchor)
        .filter(|r| !r.do_not_reassign)
        .filter(|r| r.team.as_deref() == Some(team))
        .filter(|r| r.position1.as_deref() == Some(position))
        .filter(|r| Criterion::of(r, mode) == criterion)
        .map(|r| r.id)
        .collect()
}

/// Process one pair request against the roster.
pub fn reconcile_pair<R: Rng + ?Sized>(
    roster: &mut Roster,
    pair: &PairRequest,
    mode: SortMode,
    rng: &mut R,
) -> PairOutcome {
    let Some(anchor_id) = roster.find_by_name(&pair.anchor) else {
        warn!("pair request skipped: no registrant named {}", pair.anchor);
        return PairOutcome::Unresolved {
            name: pair.anchor.clone(),
        };
    };
    let Some(mover_id) = roster.find_by_name(&pair.mover) else {
        warn!("pair request skipped: no registrant named {}", pair.mover);
        return PairOutcome::Unresolved {
            name: pair.mover.clone(),
        };
    };

    let (Some(anchor), Some(mover)) = (roster.get(anchor_id), roster.get(mover_id)) else {
        return PairOutcome::Unresolved {
            name: pair.mover.clone(),
        };
    };

    let Some(anchor_team) = anchor.team.clone() else {
        warn!("pair request skipped: {} has no team", pair.anchor);
        return PairOutcome::Unassigned {
            name: pair.anchor.clone(),
        };
    };
    let Some(mover_team) = mover.team.clone() else {
        warn!("pair request skipped: {} has no team", pair.mover);
        return PairOutcome::Unassigned {
            name: pair.mover.clone(),
        };
    };

    if anchor_team == mover_team {
        info!(
            "{} and {} are already on the same team ({})",
            pair.mover, pair.anchor, anchor_team
        );
        for id in [anchor_id, mover_id] {
            if let Some(r) = roster.get_mut(id) {
                r.do_not_reassign = true;
            }
        }
        return PairOutcome::AlreadyTogether { team: anchor_team };
    }

    if mover.do_not_reassign {
        warn!(
            "can't move {} onto {}: already pinned to {}",
            pair.mover, anchor_team, mover_team
        );
        return PairOutcome::MoverPinned { team: mover_team };
    }

    let criterion = Criterion::of(mover, mode);
    let mut relaxed = false;
    let mut pool = match mover.position1.as_deref() {
        Some(pos) => substitutes(roster, &anchor_team, pos, criterion, mode, anchor_id),
        None => Vec::new(),
    };
    if pool.is_empty() {
        if let Some(pos) = mover.position2.as_deref() {
            pool = substitutes(roster, &anchor_team, pos, criterion, mode, anchor_id);
            relaxed = true;
        }
    }

    let Some(&substitute_id) = pool.choose(rng) else {
        warn!(
            "can't move {} onto {} ({}): no equivalent registrant to swap with",
            pair.mover, pair.anchor, anchor_team
        );
        return PairOutcome::NoSubstitute;
    };

    if let Some(sub) = roster.get_mut(substitute_id) {
        sub.team = Some(mover_team.clone());
        info!(
            "swapping {} ({} -> {}) with {} ({} -> {})",
            pair.mover,
            mover_team,
            anchor_team,
            sub.full_name(),
            anchor_team,
            mover_team
        );
    }
    if let Some(m) = roster.get_mut(mover_id) {
        m.team = Some(anchor_team.clone());
        m.do_not_reassign = true;
    }
    if let Some(a) = roster.get_mut(anchor_id) {
        a.do_not_reassign = true;
    }

    PairOutcome::Swapped {
        mover: mover_id,
        substitute: substitute_id,
        from_team: mover_team,
        to_team: anchor_team,
        relaxed,
    }
}

/// Pin the protected registrants, then process `pairs` in order.
/// Earlier requests get first claim on substitutes.
pub fn reconcile_pairs<R: Rng + ?Sized>(
    mut roster: Roster,
    pairs: &[PairRequest],
    protected: &[String],
    mode: SortMode,
    rng: &mut R,
) -> (Roster, Vec<PairOutcome>) {
    protect(&mut roster, protected);

    let outcomes: Vec<PairOutcome> = pairs
        .iter()
        .map(|pair| reconcile_pair(&mut roster, pair, mode, rng))
        .collect();

    let satisfied = outcomes.iter().filter(|o| o.is_satisfied()).count();
    info!("{satisfied} of {} pair requests satisfied", pairs.len());

    (roster, outcomes)
}
