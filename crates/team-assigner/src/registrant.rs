// Registrant records and the roster table they live in.

use serde::Deserialize;
use std::fmt;

/// Stable registrant identifier: the row's position in load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrantId(pub usize);

impl fmt::Display for RegistrantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Answer to "have you played in the competitive division recently?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub enum Competitive {
    Yes,
    No,
}

impl Competitive {
    /// Parse a yes/no answer (case-insensitive). Returns None for anything else.
    pub fn from_answer(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" => Some(Competitive::Yes),
            "no" | "n" => Some(Competitive::No),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Competitive::Yes => "Yes",
            Competitive::No => "No",
        }
    }
}

impl fmt::Display for Competitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One signup row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registrant {
    pub id: RegistrantId,
    pub first_name: String,
    pub last_name: String,
    /// Short experience label ("Yes", "Yes*", "No", ...).
    pub experience: Option<String>,
    /// Self-rated skill, 1 (novice) to 5 (expert).
    pub skill: Option<u8>,
    pub competitive: Option<Competitive>,
    /// Free-text "play with" request as typed on the signup form.
    pub friend: Option<String>,
    pub position1: Option<String>,
    pub position2: Option<String>,
    /// Team name, set by the round-robin assigner.
    pub team: Option<String>,
    pub assigned: bool,
    /// Set once a registrant has been placed to satisfy (or protected by) a
    /// pair request; such registrants are never moved again.
    pub do_not_reassign: bool,
}

impl Registrant {
    /// Create an unassigned registrant with only identity fields set.
    pub fn new(id: RegistrantId, first_name: &str, last_name: &str) -> Self {
        Registrant {
            id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            experience: None,
            skill: None,
            competitive: None,
            friend: None,
            position1: None,
            position2: None,
            team: None,
            assigned: false,
            do_not_reassign: false,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_named(&self, name: &FullName) -> bool {
        self.first_name == name.first && self.last_name == name.last
    }

    /// Place the registrant on a team and mark it assigned.
    pub fn assign_to(&mut self, team: &str) {
        self.team = Some(team.to_string());
        self.assigned = true;
    }
}

/// A person's name split the way pair requests are written:
/// the first token is the first name, the rest is the last name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullName {
    pub first: String,
    pub last: String,
}

impl FullName {
    pub fn parse(s: &str) -> Self {
        let mut tokens = s.split_whitespace();
        let first = tokens.next().unwrap_or_default().to_string();
        let last = tokens.collect::<Vec<_>>().join(" ");
        FullName { first, last }
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.last.is_empty() {
            f.write_str(&self.first)
        } else {
            write!(f, "{} {}", self.first, self.last)
        }
    }
}

/// The in-memory registrant table, in load order. `RegistrantId(i)` is the
/// registrant at index `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    registrants: Vec<Registrant>,
}

impl Roster {
    /// Build a roster from registrants, renumbering ids to match load order.
    pub fn new(mut registrants: Vec<Registrant>) -> Self {
        for (idx, r) in registrants.iter_mut().enumerate() {
            r.id = RegistrantId(idx);
        }
        Roster { registrants }
    }

    pub fn len(&self) -> usize {
        self.registrants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrants.is_empty()
    }

    pub fn get(&self, id: RegistrantId) -> Option<&Registrant> {
        self.registrants.get(id.0)
    }

    pub fn get_mut(&mut self, id: RegistrantId) -> Option<&mut Registrant> {
        self.registrants.get_mut(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Registrant> {
        self.registrants.iter()
    }

    /// First registrant whose (first, last) name matches exactly.
    pub fn find_by_name(&self, name: &FullName) -> Option<RegistrantId> {
        self.registrants.iter().find(|r| r.is_named(name)).map(|r| r.id)
    }

    /// Registrants that matched no category and never got a team.
    pub fn unassigned(&self) -> Vec<RegistrantId> {
        self.registrants
            .iter()
            .filter(|r| !r.assigned)
            .map(|r| r.id)
            .collect()
    }
}
