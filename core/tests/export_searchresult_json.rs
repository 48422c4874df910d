//! Test for exporting search results and experiment reports to JSON

use std::fs;
use tot24_core::oracle::{FnOracle, OracleRequest};
use tot24_core::*;

fn four_fours(req: &OracleRequest) -> String {
    if req.terminal {
        return "Yes: 20 + 4 = 24".to_string();
    }
    let step = match req.numbers.len() {
        4 => "4 * 4 = 16",
        _ => "16 + 4 = 20",
    };
    format!("Let me think.\n{}", step)
}

fn flat(_: &NumberMultiset) -> f32 {
    0.5
}

/// Test exporting a solved search to JSON
#[test]
fn test_export_four_fours_result() {
    let solver = BeamSolver::new(BeamConfig::default());
    let mut oracle = FnOracle::new(four_fours);
    let result = solver.solve(&Puzzle::new(0, vec![4, 4, 4, 4]), &mut oracle, &flat);
    assert!(result.solved(), "Failed to solve four fours");

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output_path = dir.path().join("four_fours.searchresult.json");
    result.to_json_file(&output_path).expect("Failed to write JSON");

    let json_content = fs::read_to_string(&output_path).expect("Failed to read JSON file");
    let parsed: serde_json::Value = serde_json::from_str(&json_content).expect("Failed to parse JSON");

    assert_eq!(parsed["outcome"]["kind"], "solved_by_oracle");
    assert_eq!(parsed["start"], serde_json::json!([4.0, 4.0, 4.0, 4.0]));
    assert_eq!(
        parsed["trace"],
        serde_json::json!(["4 * 4 = 16", "16 + 4 = 20", "20 + 4 = 24"])
    );
    assert!(parsed["queries"].is_number());
    assert!(parsed["usage"]["input"].is_number());

    // Round-trips back into the typed result
    let back: SearchResult = serde_json::from_str(&json_content).unwrap();
    assert_eq!(back.outcome, Outcome::SolvedByOracle);
    assert_eq!(back.trace, result.trace);
}

/// Test exporting an experiment report
#[test]
fn test_export_experiment_report() {
    let solver = BeamSolver::new(BeamConfig {
        beam_width: 2,
        branching: 1,
        ..BeamConfig::default()
    });
    let mut oracle = FnOracle::new(four_fours);
    let puzzles = vec![
        Puzzle::new(0, vec![4, 4, 4, 4]),
        Puzzle::new(1, vec![5, 5, 5, 1]),
    ];

    let report = run_experiment(&puzzles, &solver, &mut oracle, &flat, &CostModel::default());
    assert_eq!(report.total, 2);
    assert_eq!(report.solved, 1);
    assert_eq!(report.no_candidates, 1);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    report.to_json_file(&path).unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed["total"], 2);
    assert_eq!(parsed["instances"][0]["code"], 1);
    assert_eq!(parsed["instances"][1]["code"], 0);
    assert_eq!(parsed["instances"][1]["result"]["outcome"]["kind"], "no_candidates");
    assert_eq!(parsed["instances"][1]["result"]["outcome"]["depth"], 1);
}
