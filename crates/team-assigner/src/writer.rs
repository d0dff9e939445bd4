// Assignment CSV output.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::registrant::{Registrant, Roster};

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to create {path}: {source}")]
    Create {
        path: String,
        source: std::io::Error,
    },
}

/// One output row. The pairing request, unique id and bookkeeping flags are
/// not written.
#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    #[serde(rename = "First Name")]
    first_name: &'a str,
    #[serde(rename = "Last Name")]
    last_name: &'a str,
    #[serde(rename = "Experience_YesNo")]
    experience: Option<&'a str>,
    #[serde(rename = "Skill_1to5")]
    skill: Option<u8>,
    #[serde(rename = "Competitive_YesNo")]
    competitive: Option<&'static str>,
    #[serde(rename = "Position1")]
    position1: Option<&'a str>,
    #[serde(rename = "Position2")]
    position2: Option<&'a str>,
    #[serde(rename = "Team")]
    team: &'a str,
}

impl<'a> OutputRow<'a> {
    fn new(r: &'a Registrant, unassigned_label: &'a str) -> Self {
        OutputRow {
            first_name: &r.first_name,
            last_name: &r.last_name,
            experience: r.experience.as_deref(),
            skill: r.skill,
            competitive: r.competitive.map(|c| c.as_str()),
            position1: r.position1.as_deref(),
            position2: r.position2.as_deref(),
            team: r.team.as_deref().unwrap_or(unassigned_label),
        }
    }
}

/// Registrants ordered by team name, load order kept within a team,
/// unassigned registrants last.
pub fn sorted_by_team(roster: &Roster) -> Vec<&Registrant> {
    let mut rows: Vec<&Registrant> = roster.iter().collect();
    rows.sort_by(|a, b| match (&a.team, &b.team) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    rows
}

pub fn write_assignments_to<W: Write>(
    out: W,
    roster: &Roster,
    unassigned_label: &str,
) -> Result<(), OutputError> {
    let mut wtr = csv::Writer::from_writer(out);
    for r in sorted_by_team(roster) {
        wtr.serialize(OutputRow::new(r, unassigned_label))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the final assignments CSV to `path`, creating parent directories.
pub fn write_assignments(
    path: &Path,
    roster: &Roster,
    unassigned_label: &str,
) -> Result<(), OutputError> {
    let file = create_output(path)?;
    write_assignments_to(std::io::BufWriter::new(file), roster, unassigned_label)
}

pub(crate) fn create_output(path: &Path) -> Result<File, OutputError> {
    let create_err = |e| OutputError::Create {
        path: path.display().to_string(),
        source: e,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(create_err)?;
    }
    File::create(path).map_err(create_err)
}
