// Category definitions and bucketing.

use std::fmt;

use crate::config::{AssignmentConfig, SortMode};
use crate::registrant::{Competitive, Registrant, RegistrantId, Roster};

/// Which of a registrant's position preferences a category looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceSlot {
    Primary,
    Secondary,
}

/// The secondary split applied inside a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Criterion {
    Competitive(Competitive),
    Skill(u8),
}

impl Criterion {
    /// The registrant's value for the criterion selected by `mode`.
    pub fn of(registrant: &Registrant, mode: SortMode) -> Option<Criterion> {
        match mode {
            SortMode::Competitive => registrant.competitive.map(Criterion::Competitive),
            SortMode::Skill => registrant.skill.map(Criterion::Skill),
        }
    }

    pub fn matches(&self, registrant: &Registrant) -> bool {
        match self {
            Criterion::Competitive(c) => registrant.competitive == Some(*c),
            Criterion::Skill(s) => registrant.skill == Some(*s),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::Competitive(c) => write!(f, "competitive={c}"),
            Criterion::Skill(s) => write!(f, "skill={s}"),
        }
    }
}

/// One balancing group: a position (read from one preference slot),
/// optionally narrowed by a criterion value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub position: String,
    pub slot: PreferenceSlot,
    /// `None` for special positions, which take everyone regardless of
    /// competitiveness or skill.
    pub criterion: Option<Criterion>,
}

impl Category {
    pub fn matches(&self, registrant: &Registrant) -> bool {
        let pos = match self.slot {
            PreferenceSlot::Primary => registrant.position1.as_deref(),
            PreferenceSlot::Secondary => registrant.position2.as_deref(),
        };
        pos == Some(self.position.as_str())
            && self.criterion.map_or(true, |c| c.matches(registrant))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = match self.slot {
            PreferenceSlot::Primary => "1st",
            PreferenceSlot::Secondary => "2nd",
        };
        match self.criterion {
            Some(c) => write!(f, "{} ({slot} choice, {c})", self.position),
            None => write!(f, "{} ({slot} choice)", self.position),
        }
    }
}

/// Build the ordered category list for a run.
///
/// Special positions come first, each over the primary then the secondary
/// preference. Then ordinary positions in declared order, each split by the
/// criterion values of the configured sort mode in declared order.
pub fn category_plan(config: &AssignmentConfig) -> Vec<Category> {
    let mut plan = Vec::new();

    for position in &config.special_positions {
        for slot in [PreferenceSlot::Primary, PreferenceSlot::Secondary] {
            plan.push(Category {
                position: position.clone(),
                slot,
                criterion: None,
            });
        }
    }

    let criteria: Vec<Criterion> = match config.sort_mode {
        SortMode::Competitive => config
            .competitive_order
            .iter()
            .copied()
            .map(Criterion::Competitive)
            .collect(),
        SortMode::Skill => config.skill_order.iter().copied().map(Criterion::Skill).collect(),
    };

    for position in &config.positions {
        for criterion in &criteria {
            plan.push(Category {
                position: position.clone(),
                slot: PreferenceSlot::Primary,
                criterion: Some(*criterion),
            });
        }
    }

    plan
}

/// Registrants matching `category`, in load order.
pub fn bucketize(roster: &Roster, category: &Category) -> Vec<RegistrantId> {
    roster
        .iter()
        .filter(|r| category.matches(r))
        .map(|r| r.id)
        .collect()
}
