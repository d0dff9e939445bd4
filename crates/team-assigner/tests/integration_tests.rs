// Integration tests for the team assigner.
//
// These drive the library's public API end to end: config loading from the
// shipped defaults, roster CSV loading, round-robin assignment, pair
// reconciliation and the written outputs.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;

use team_assigner::app;
use team_assigner::assign::PairOutcome;
use team_assigner::config::{load_config, Config, SortMode};
use team_assigner::loader::load_roster;
use team_assigner::pairs::{load_pairs, PairRequest};
use team_assigner::registrant::{FullName, RegistrantId, Roster};

// ===========================================================================
// Test helpers
// ===========================================================================

fn crate_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn fixture(name: &str) -> PathBuf {
    crate_root().join("tests/fixtures").join(name)
}

/// Build a Config from the shipped defaults in a scratch directory, pointed
/// at the fixture roster and pairs, writing outputs into the scratch dir.
fn scratch_config(name: &str, teams: &[&str]) -> Config {
    let tmp = std::env::temp_dir().join(name);
    let _ = fs::remove_dir_all(&tmp);
    fs::create_dir_all(tmp.join("defaults")).unwrap();
    for file in ["league.toml", "assignment.toml"] {
        fs::copy(
            crate_root().join("defaults").join(file),
            tmp.join("defaults").join(file),
        )
        .unwrap();
    }

    let mut config = load_config(&tmp).expect("defaults should load");
    if !teams.is_empty() {
        config.league.teams = teams.iter().map(|t| t.to_string()).collect();
    }
    config.data_paths.roster = fixture("roster.csv").display().to_string();
    config.data_paths.pairs = Some(fixture("pairs.json").display().to_string());
    config.data_paths.output = "out/assignments.csv".into();
    config.data_paths.summary = "out/summary.txt".into();
    config
}

fn fixture_roster(config: &Config) -> Roster {
    load_roster(&fixture("roster.csv"), &config.columns, &config.responses).unwrap()
}

fn team_of(roster: &Roster, name: &str) -> Option<String> {
    let id = roster.find_by_name(&FullName::parse(name))?;
    roster.get(id)?.team.clone()
}

fn team_sizes(roster: &Roster) -> HashMap<String, usize> {
    let mut sizes = HashMap::new();
    for r in roster.iter() {
        if let Some(team) = &r.team {
            *sizes.entry(team.clone()).or_insert(0) += 1;
        }
    }
    sizes
}

// ===========================================================================
// End-to-end run
// ===========================================================================

#[test]
fn full_run_writes_assignments_and_summary() {
    let config = scratch_config("team_assigner_it_full_run", &["Red", "Blue"]);
    let report = app::run(&config).expect("run should succeed");

    assert_eq!(report.roster.len(), 13);
    let max = report.roster.find_by_name(&FullName::parse("Max Roth")).unwrap();
    assert_eq!(report.assignment.unassigned, vec![max]);

    let output = fs::read_to_string(config.base_dir.join("out/assignments.csv")).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 14);
    assert!(lines[0].starts_with("First Name,Last Name,"));
    assert!(lines[0].ends_with(",Team"));
    assert_eq!(lines[13], "Max,Roth,No,1,No,Sweeper,,Unassigned");
    assert!(!output.contains("Ben Okafor"), "friend column must be stripped");

    // Blue sorts before Red.
    let first_red = lines.iter().position(|l| l.ends_with(",Red")).unwrap();
    assert!(lines[1..first_red].iter().all(|l| l.ends_with(",Blue")));

    let summary = fs::read_to_string(config.base_dir.join("out/summary.txt")).unwrap();
    let summary_lines: Vec<&str> = summary.lines().collect();
    assert!(summary_lines[0].starts_with("\tExperience_YesNo\t"));
    assert!(summary_lines[1].starts_with("Team\t"));
    assert!(summary_lines[2].starts_with("Blue\t"));
    assert!(summary_lines[3].starts_with("Red\t"));
    assert!(summary_lines[4].starts_with("Unassigned\t"));

    let _ = fs::remove_dir_all(&config.base_dir);
}

#[test]
fn loader_normalizes_fixture_names() {
    let config = scratch_config("team_assigner_it_names", &[]);
    let roster = fixture_roster(&config);

    let ana = roster.get(RegistrantId(0)).unwrap();
    assert_eq!(ana.full_name(), "Ana Lopez");
    assert_eq!(ana.experience.as_deref(), Some("Yes"));
    assert_eq!(ana.skill, Some(4));
    assert_eq!(ana.friend.as_deref(), Some("Ben Okafor"));
    assert_eq!(roster.get(RegistrantId(1)).unwrap().full_name(), "Ben Okafor");
    assert_eq!(roster.get(RegistrantId(3)).unwrap().full_name(), "Dev Patel");

    let _ = fs::remove_dir_all(&config.base_dir);
}

// ===========================================================================
// Assignment properties
// ===========================================================================

#[test]
fn default_six_teams_get_two_each() {
    let config = scratch_config("team_assigner_it_six_teams", &[]);
    let mut rng = StdRng::seed_from_u64(3);
    let report = app::process(fixture_roster(&config), &[], &config, &mut rng);

    let sizes = team_sizes(&report.roster);
    assert_eq!(sizes.len(), 6);
    assert!(sizes.values().all(|&n| n == 2), "sizes: {sizes:?}");
}

#[test]
fn categories_balanced_within_one() {
    let config = scratch_config("team_assigner_it_balance", &["Red", "Blue", "Gold"]);
    let mut rng = StdRng::seed_from_u64(3);
    let report = app::process(fixture_roster(&config), &[], &config, &mut rng);

    for cat in &report.assignment.categories {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for id in &cat.assigned {
            let team = report.roster.get(*id).unwrap().team.as_deref().unwrap();
            *counts.entry(team).or_insert(0) += 1;
        }
        let per_team: Vec<usize> = config
            .league
            .teams
            .iter()
            .map(|t| counts.get(t.as_str()).copied().unwrap_or(0))
            .collect();
        let max = per_team.iter().max().unwrap();
        let min = per_team.iter().min().unwrap();
        assert!(max - min <= 1, "{}: {per_team:?}", cat.category);
    }
}

#[test]
fn same_seed_same_teams() {
    let config = scratch_config("team_assigner_it_determinism", &[]);
    let pairs = load_pairs(&fixture("pairs.json")).unwrap();

    let a = app::process(
        fixture_roster(&config),
        &pairs,
        &config,
        &mut StdRng::seed_from_u64(11),
    );
    let b = app::process(
        fixture_roster(&config),
        &pairs,
        &config,
        &mut StdRng::seed_from_u64(11),
    );
    assert_eq!(a.roster, b.roster);
    assert_eq!(a.pair_outcomes, b.pair_outcomes);
}

#[test]
fn skill_mode_assigns_everyone_with_a_position() {
    let mut config = scratch_config("team_assigner_it_skill", &["Red", "Blue"]);
    config.assignment.sort_mode = SortMode::Skill;
    let mut rng = StdRng::seed_from_u64(3);
    let report = app::process(fixture_roster(&config), &[], &config, &mut rng);

    assert_eq!(report.assignment.unassigned.len(), 1);
    assert_eq!(team_of(&report.roster, "Max Roth"), None);
    assert!(team_of(&report.roster, "Eli Grant").is_some());
}

// ===========================================================================
// Pair requests
// ===========================================================================

#[test]
fn fixture_pairs_are_honored_or_reported() {
    let config = scratch_config("team_assigner_it_pairs", &["Red", "Blue"]);
    let pairs = load_pairs(&fixture("pairs.json")).unwrap();
    let mut rng = StdRng::seed_from_u64(5);
    let report = app::process(fixture_roster(&config), &pairs, &config, &mut rng);

    // Four competitive forwards over two teams: Ben's team always has
    // another one to trade with Ana.
    assert!(report.pair_outcomes[0].is_satisfied());
    assert_eq!(
        team_of(&report.roster, "Ana Lopez"),
        team_of(&report.roster, "Ben Okafor")
    );
    assert_eq!(
        report.pair_outcomes[1],
        PairOutcome::Unresolved {
            name: FullName::parse("Nobody Here")
        }
    );

    let sizes = team_sizes(&report.roster);
    assert_eq!(sizes.get("Red"), Some(&6));
    assert_eq!(sizes.get("Blue"), Some(&6));
}

#[test]
fn rerunning_pairs_is_a_no_op() {
    let config = scratch_config("team_assigner_it_pairs_rerun", &["Red", "Blue"]);
    let pairs = vec![PairRequest::new("Ana Lopez", "Ben Okafor")];
    let mut rng = StdRng::seed_from_u64(5);
    let report = app::process(fixture_roster(&config), &pairs, &config, &mut rng);

    let (again, outcomes) = team_assigner::assign::reconcile_pairs(
        report.roster.clone(),
        &pairs,
        &[],
        config.assignment.sort_mode,
        &mut rng,
    );
    assert!(matches!(outcomes[0], PairOutcome::AlreadyTogether { .. }));
    assert_eq!(again, report.roster);
}

#[test]
fn protected_registrant_is_never_moved() {
    let mut config = scratch_config("team_assigner_it_protected", &["Red", "Blue"]);
    // Ask every competitive forward to join Ana; Cara is protected.
    config.assignment.protected = vec!["Cara Diaz".into()];
    let pairs = vec![
        PairRequest::new("Ben Okafor", "Ana Lopez"),
        PairRequest::new("Lia Nunez", "Ana Lopez"),
    ];
    let before = app::process(
        fixture_roster(&config),
        &[],
        &config,
        &mut StdRng::seed_from_u64(9),
    );
    let after = app::process(
        fixture_roster(&config),
        &pairs,
        &config,
        &mut StdRng::seed_from_u64(9),
    );

    assert_eq!(
        team_of(&before.roster, "Cara Diaz"),
        team_of(&after.roster, "Cara Diaz")
    );
    let cara = after.roster.find_by_name(&FullName::parse("Cara Diaz")).unwrap();
    for outcome in &after.pair_outcomes {
        if let PairOutcome::Swapped { substitute, .. } = outcome {
            assert_ne!(*substitute, cara);
        }
    }
}
