// Configuration loading and parsing (league.toml, assignment.toml).

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::registrant::Competitive;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub assignment: AssignmentConfig,
    pub columns: ColumnMapping,
    pub responses: ResponseMapping,
    pub data_paths: DataPaths,
    /// Directory the config was loaded from; relative data paths resolve here.
    pub base_dir: PathBuf,
}

impl Config {
    /// Resolve a configured data path against the config base directory.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.base_dir.join(p)
        }
    }
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire league.toml file.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
    columns: ColumnMapping,
    #[serde(default)]
    responses: ResponseMapping,
    data_paths: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    /// Ordered team names. The team count is the length of this list.
    pub teams: Vec<String>,
    /// Team label written for registrants that matched no category.
    #[serde(default = "default_unassigned_label")]
    pub unassigned_label: String,
}

impl LeagueConfig {
    pub fn num_teams(&self) -> usize {
        self.teams.len()
    }
}

fn default_unassigned_label() -> String {
    "Unassigned".into()
}

/// Source CSV header for each canonical registrant field.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnMapping {
    pub first_name: String,
    pub last_name: String,
    pub experience: String,
    pub skill: String,
    pub competitive: String,
    pub friend: String,
    pub position1: String,
    pub position2: String,
}

/// Survey-response rewrites applied while loading.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMapping {
    /// Raw experience answer -> short label (e.g. "Yes, I used to play." -> "Yes*").
    #[serde(default)]
    pub experience: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub roster: String,
    /// Pair-request JSON. Omit when there are no requests.
    #[serde(default)]
    pub pairs: Option<String>,
    pub output: String,
    pub summary: String,
}

// ---------------------------------------------------------------------------
// assignment.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct AssignmentFile {
    assignment: AssignmentConfig,
}

/// Which secondary criterion splits each position into categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    Competitive,
    Skill,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentConfig {
    /// Seed for the per-category shuffles.
    pub seed: u64,
    /// Seed for substitute selection during pair reconciliation. When absent
    /// the thread RNG is used.
    #[serde(default)]
    pub swap_seed: Option<u64>,
    pub sort_mode: SortMode,
    /// Scarce positions assigned first, matched against either preference.
    #[serde(default)]
    pub special_positions: Vec<String>,
    /// Ordinary positions, in processing order.
    pub positions: Vec<String>,
    #[serde(default = "default_competitive_order")]
    pub competitive_order: Vec<Competitive>,
    #[serde(default = "default_skill_order")]
    pub skill_order: Vec<u8>,
    /// Full names never moved or used as substitutes.
    #[serde(default)]
    pub protected: Vec<String>,
}

fn default_competitive_order() -> Vec<Competitive> {
    vec![Competitive::Yes, Competitive::No]
}

fn default_skill_order() -> Vec<u8> {
    vec![5, 4, 3, 2, 1]
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/assignment.toml`, relative to the given `base_dir`.
///
/// This does not auto-copy defaults; see `load_config()`.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- league.toml (required) ---
    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;

    // --- assignment.toml (required) ---
    let assignment_path = config_dir.join("assignment.toml");
    let assignment_text = read_file(&assignment_path)?;
    let assignment_file: AssignmentFile =
        toml::from_str(&assignment_text).map_err(|e| ConfigError::ParseError {
            path: assignment_path.clone(),
            source: e,
        })?;

    let config = Config {
        league: league_file.league,
        assignment: assignment_file.assignment,
        columns: league_file.columns,
        responses: league_file.responses,
        data_paths: league_file.data_paths,
        base_dir: base_dir.to_path_buf(),
    };

    validate(&config)?;

    Ok(config)
}

/// Files read from `config/`, each seeded from `defaults/` on first run.
const CONFIG_FILES: [&str; 2] = ["league.toml", "assignment.toml"];

/// Copy each missing config file from `defaults/`. Existing files are left
/// alone. Returns the files that were copied.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        if config_dir.is_dir() {
            return Ok(vec![]);
        }
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "neither defaults/ nor config/ directory found in {}",
                base_dir.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for name in CONFIG_FILES {
        let source = defaults_dir.join(name);
        let target = config_dir.join(name);
        if target.exists() || !source.is_file() {
            continue;
        }
        std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to copy {}: {e}", source.display()),
        })?;
        debug!("seeded {} from defaults", target.display());
        copied.push(target);
    }

    Ok(copied)
}

/// Loads config relative to `base_dir`, copying default config files first.
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_files(base_dir)?;
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub(crate) fn validate(config: &Config) -> Result<(), ConfigError> {
    let league = &config.league;
    if league.teams.is_empty() {
        return Err(invalid("league.teams", "must name at least one team"));
    }

    let mut seen = HashSet::new();
    for team in &league.teams {
        if team.trim().is_empty() {
            return Err(invalid("league.teams", "team names must not be empty"));
        }
        if !seen.insert(team.as_str()) {
            return Err(invalid("league.teams", format!("duplicate team name `{team}`")));
        }
    }

    if seen.contains(league.unassigned_label.as_str()) {
        return Err(invalid(
            "league.unassigned_label",
            format!("`{}` collides with a team name", league.unassigned_label),
        ));
    }

    let assignment = &config.assignment;
    if assignment.positions.is_empty() {
        return Err(invalid("assignment.positions", "must list at least one position"));
    }

    match assignment.sort_mode {
        SortMode::Competitive if assignment.competitive_order.is_empty() => {
            return Err(invalid(
                "assignment.competitive_order",
                "must not be empty when sort_mode = \"competitive\"",
            ));
        }
        SortMode::Skill if assignment.skill_order.is_empty() => {
            return Err(invalid(
                "assignment.skill_order",
                "must not be empty when sort_mode = \"skill\"",
            ));
        }
        _ => {}
    }

    if let Some(rank) = assignment.skill_order.iter().find(|r| !(1..=5).contains(*r)) {
        return Err(invalid(
            "assignment.skill_order",
            format!("ranks must be between 1 and 5, got {rank}"),
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
