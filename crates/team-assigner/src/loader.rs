// Roster CSV loading and normalization.
//
// Reads the signup export, picks out the mapped columns and turns each row
// into a `Registrant` with cleaned-up names and survey answers.

use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::config::{ColumnMapping, ResponseMapping};
use crate::registrant::{Competitive, Registrant, RegistrantId, Roster};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("column `{header}` (for {field}) not found in roster header")]
    MissingColumn { field: &'static str, header: String },

    #[error("row {row}: invalid {field} value `{value}`")]
    InvalidValue {
        row: usize,
        field: &'static str,
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Column lookup
// ---------------------------------------------------------------------------

/// Header indices for each registrant field.
struct ColumnIndex {
    first_name: usize,
    last_name: usize,
    experience: usize,
    skill: usize,
    competitive: usize,
    friend: usize,
    position1: usize,
    position2: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord, map: &ColumnMapping) -> Result<Self, LoadError> {
        let find = |field: &'static str, header: &str| {
            headers
                .iter()
                .position(|h| h.trim() == header.trim())
                .ok_or_else(|| LoadError::MissingColumn {
                    field,
                    header: header.to_string(),
                })
        };
        Ok(ColumnIndex {
            first_name: find("first_name", &map.first_name)?,
            last_name: find("last_name", &map.last_name)?,
            experience: find("experience", &map.experience)?,
            skill: find("skill", &map.skill)?,
            competitive: find("competitive", &map.competitive)?,
            friend: find("friend", &map.friend)?,
            position1: find("position1", &map.position1)?,
            position2: find("position2", &map.position2)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Normalization helpers
// ---------------------------------------------------------------------------

/// Upper-case the first character, lower-case the rest ("mARIA" -> "Maria").
pub fn capitalize(s: &str) -> String {
    let mut chars = s.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Title-case every word: a letter following a non-letter is upper-cased,
/// every other letter lower-cased ("o'NEIL-smith" -> "O'Neil-Smith").
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for c in s.trim().chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

/// Leading integer of a rating answer ("3 - Competent" -> 3).
fn parse_skill(s: &str) -> Option<u8> {
    let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse::<u8>().ok().filter(|n| (1..=5).contains(n))
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

// ---------------------------------------------------------------------------
// Reader-based loader (enables testing without temp files)
// ---------------------------------------------------------------------------

pub fn load_roster_from_reader<R: Read>(
    rdr: R,
    columns: &ColumnMapping,
    responses: &ResponseMapping,
) -> Result<Roster, LoadError> {
    let mut reader = csv::ReaderBuilder::new().from_reader(rdr);
    let headers = reader.headers()?.clone();
    let idx = ColumnIndex::from_headers(&headers, columns)?;

    let mut registrants = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result?;
        // Row numbers are 1-based and count the header line.
        let row = row_idx + 2;
        let cell = |i: usize| record.get(i).unwrap_or("");

        let first_name = capitalize(cell(idx.first_name));
        let last_name = title_case(cell(idx.last_name));
        if first_name.is_empty() && last_name.is_empty() {
            return Err(LoadError::InvalidValue {
                row,
                field: "first_name",
                value: String::new(),
            });
        }

        let experience = non_empty(cell(idx.experience)).map(|raw| {
            responses
                .experience
                .get(&raw)
                .cloned()
                .unwrap_or(raw)
        });

        let skill = match non_empty(cell(idx.skill)) {
            None => None,
            Some(raw) => Some(parse_skill(&raw).ok_or(LoadError::InvalidValue {
                row,
                field: "skill",
                value: raw.clone(),
            })?),
        };

        let competitive = match non_empty(cell(idx.competitive)) {
            None => None,
            Some(raw) => Some(Competitive::from_answer(&raw).ok_or(LoadError::InvalidValue {
                row,
                field: "competitive",
                value: raw.clone(),
            })?),
        };

        let mut registrant =
            Registrant::new(RegistrantId(registrants.len()), &first_name, &last_name);
        registrant.experience = experience;
        registrant.skill = skill;
        registrant.competitive = competitive;
        registrant.friend = non_empty(cell(idx.friend));
        registrant.position1 = non_empty(cell(idx.position1));
        registrant.position2 = non_empty(cell(idx.position2));

        debug!(
            "loaded {} {}: {:?}/{:?}",
            registrant.id,
            registrant.full_name(),
            registrant.position1,
            registrant.position2
        );
        registrants.push(registrant);
    }

    Ok(Roster::new(registrants))
}

// ---------------------------------------------------------------------------
// Public path-based loader
// ---------------------------------------------------------------------------

/// Load the roster CSV at `path`.
pub fn load_roster(
    path: &Path,
    columns: &ColumnMapping,
    responses: &ResponseMapping,
) -> Result<Roster, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_roster_from_reader(file, columns, responses)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
