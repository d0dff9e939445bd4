// Per-team cross-tabulation of registrant attributes.

use std::collections::BTreeSet;
use std::fmt;
use std::io::Write;
use std::path::Path;

use crate::registrant::{Registrant, Roster};
use crate::writer::{create_output, OutputError};

type Extractor = fn(&Registrant) -> Option<String>;

fn experience(r: &Registrant) -> Option<String> {
    r.experience.clone()
}

fn skill(r: &Registrant) -> Option<String> {
    r.skill.map(|s| s.to_string())
}

fn competitive(r: &Registrant) -> Option<String> {
    r.competitive.map(|c| c.to_string())
}

fn position1(r: &Registrant) -> Option<String> {
    r.position1.clone()
}

fn position2(r: &Registrant) -> Option<String> {
    r.position2.clone()
}

/// Tabulated attributes, in column-group order. Identity fields, the pairing
/// request and bookkeeping flags are not tabulated.
const ATTRIBUTES: [(&str, Extractor); 5] = [
    ("Experience_YesNo", experience),
    ("Skill_1to5", skill),
    ("Competitive_YesNo", competitive),
    ("Position1", position1),
    ("Position2", position2),
];

/// The distinct values of one attribute, one column each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnGroup {
    pub attribute: &'static str,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub team: String,
    /// One count per value column, groups concatenated in order.
    pub counts: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryTable {
    pub groups: Vec<ColumnGroup>,
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    /// Count for `team` under `attribute` = `value`, if such a cell exists.
    pub fn count(&self, team: &str, attribute: &str, value: &str) -> Option<usize> {
        let mut offset = 0;
        let mut column = None;
        for group in &self.groups {
            if group.attribute == attribute {
                column = group.values.iter().position(|v| v == value).map(|i| offset + i);
                break;
            }
            offset += group.values.len();
        }
        let column = column?;
        self.rows
            .iter()
            .find(|r| r.team == team)
            .map(|r| r.counts[column])
    }

    fn value_columns(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .flat_map(|g| g.values.iter().map(String::as_str))
    }

    /// Line naming each attribute above its column group:
    /// a tab for the team column, then each name followed by one tab per value.
    pub fn header_line(&self) -> String {
        let mut line = String::from("\t");
        for group in &self.groups {
            line.push_str(group.attribute);
            line.push_str(&"\t".repeat(group.values.len()));
        }
        line
    }

    /// Write the table tab-delimited, prefixed by `header_line()`.
    pub fn write_tsv<W: Write>(&self, mut out: W) -> Result<(), OutputError> {
        writeln!(out, "{}", self.header_line())?;

        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_writer(out);

        let mut header = vec!["Team".to_string()];
        header.extend(self.value_columns().map(str::to_string));
        wtr.write_record(&header)?;

        for row in &self.rows {
            let mut record = vec![row.team.clone()];
            record.extend(row.counts.iter().map(|c| c.to_string()));
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl fmt::Display for SummaryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let team_width = self
            .rows
            .iter()
            .map(|r| r.team.len())
            .chain(std::iter::once("Team".len()))
            .max()
            .unwrap_or(4);
        let widths: Vec<usize> = self.value_columns().map(|v| v.len().max(3)).collect();

        write!(f, "{:<team_width$}", "Team")?;
        for (value, w) in self.value_columns().zip(&widths) {
            write!(f, "  {value:>w$}")?;
        }
        writeln!(f)?;

        for row in &self.rows {
            write!(f, "{:<team_width$}", row.team)?;
            for (count, w) in row.counts.iter().zip(&widths) {
                write!(f, "  {count:>w$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Cross-tabulate the roster: one row per team (sorted by name), plus an
/// `unassigned_label` row when anybody is still without a team.
pub fn summarize(roster: &Roster, teams: &[String], unassigned_label: &str) -> SummaryTable {
    let groups: Vec<ColumnGroup> = ATTRIBUTES
        .iter()
        .map(|&(attribute, extract)| {
            let values: BTreeSet<String> = roster.iter().filter_map(|r| extract(r)).collect();
            ColumnGroup {
                attribute,
                values: values.into_iter().collect(),
            }
        })
        .collect();

    let mut team_names: Vec<&str> = teams.iter().map(String::as_str).collect();
    team_names.sort_unstable();
    if roster.iter().any(|r| r.team.is_none()) {
        team_names.push(unassigned_label);
    }

    let rows = team_names
        .into_iter()
        .map(|team| {
            let members: Vec<&Registrant> = roster
                .iter()
                .filter(|r| r.team.as_deref().unwrap_or(unassigned_label) == team)
                .collect();
            let mut counts = Vec::new();
            for (&(_, extract), group) in ATTRIBUTES.iter().zip(&groups) {
                for value in &group.values {
                    let n = members
                        .iter()
                        .filter(|&&r| extract(r).as_deref() == Some(value.as_str()))
                        .count();
                    counts.push(n);
                }
            }
            SummaryRow {
                team: team.to_string(),
                counts,
            }
        })
        .collect();

    SummaryTable { groups, rows }
}

/// Write the summary table to `path`, creating parent directories.
pub fn write_summary(path: &Path, table: &SummaryTable) -> Result<(), OutputError> {
    let file = create_output(path)?;
    table.write_tsv(std::io::BufWriter::new(file))
}
