// Pair-request loading.
//
// The pairs file is a JSON array of `[mover, anchor]` name pairs, e.g.
// `[["Ana Lopez", "Ben Okafor"]]` asks to move Ana onto Ben's team.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::registrant::FullName;

#[derive(Debug, thiserror::Error)]
pub enum PairsError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed pair-request JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A request to put `mover` on `anchor`'s team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairRequest {
    pub mover: FullName,
    pub anchor: FullName,
}

impl PairRequest {
    pub fn new(mover: &str, anchor: &str) -> Self {
        PairRequest {
            mover: FullName::parse(mover),
            anchor: FullName::parse(anchor),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawPair(String, String);

pub fn load_pairs_from_reader<R: Read>(rdr: R) -> Result<Vec<PairRequest>, PairsError> {
    let raw: Vec<RawPair> = serde_json::from_reader(rdr)?;
    Ok(raw
        .into_iter()
        .map(|RawPair(mover, anchor)| PairRequest::new(&mover, &anchor))
        .collect())
}

/// Load pair requests from a JSON file, preserving file order.
pub fn load_pairs(path: &Path) -> Result<Vec<PairRequest>, PairsError> {
    let file = std::fs::File::open(path).map_err(|e| PairsError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_pairs_from_reader(std::io::BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_pairs_in_order() {
        let json = r#"[["Ana Lopez", "Ben Okafor"], ["Cy Young Jr", "Dee Park"]]"#;
        let pairs = load_pairs_from_reader(json.as_bytes()).unwrap();

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].mover, FullName::parse("Ana Lopez"));
        assert_eq!(pairs[0].anchor, FullName::parse("Ben Okafor"));
        assert_eq!(pairs[1].mover.first, "Cy");
        assert_eq!(pairs[1].mover.last, "Young Jr");
    }

    #[test]
    fn empty_list_is_ok() {
        assert!(load_pairs_from_reader("[]".as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn three_element_entry_is_rejected() {
        let json = r#"[["Ana Lopez", "Ben Okafor", "Dee Park"]]"#;
        assert!(matches!(
            load_pairs_from_reader(json.as_bytes()),
            Err(PairsError::Json(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = std::env::temp_dir().join("team_assigner_no_such_pairs.json");
        assert!(matches!(load_pairs(&path), Err(PairsError::Io { .. })));
    }
}
