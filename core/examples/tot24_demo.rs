//! Demonstration of the core pieces: states, validation, fallback, search
//!
//! Run with: cargo run --example tot24_demo

use tot24_core::equation::{apply, brute_force, check};
use tot24_core::ir::*;
use tot24_core::oracle::EnumeratingOracle;
use tot24_core::search::{BeamConfig, BeamSolver, HeuristicScorer};

fn main() {
    println!("=== Game of 24 Core Demo ===\n");

    // 1. States and traces
    println!("1. Search states:");
    let puzzle = Puzzle::new(0, vec![4, 4, 4, 4]);
    let root = puzzle.to_state();
    println!("   Puzzle {} starts from {}", puzzle.id, root.numbers);

    // 2. Validation
    println!("\n2. Validating proposals:");
    for (before, after) in [("4+4", "8"), ("4 * 4 * 4", "64"), ("5 + 4", "9"), ("4 / 4", "2")] {
        match check(&root.numbers, before, after) {
            Ok(valid) => {
                let child = root.child(apply(&root.numbers, &valid), valid.entry());
                println!("   ✓ {} = {}  ->  {} {:?}", before, after, child.numbers, child.trace.steps());
            }
            Err(rejection) => println!("   ✗ {} = {}  ({})", before, after, rejection),
        }
    }

    // 3. Fallback over the last pair
    println!("\n3. Brute-force fallback:");
    for (a, b) in [(3.0, 8.0), (5.0, 7.0)] {
        match brute_force(a, b) {
            Some(solution) => println!("   {} and {}: {}", a, b, solution.entry()),
            None => println!("   {} and {}: no way to 24", a, b),
        }
    }

    // 4. Full search with the offline oracle
    println!("\n4. Beam search (enumerating oracle, heuristic scorer):");
    let solver = BeamSolver::new(BeamConfig::default());
    let mut oracle = EnumeratingOracle::new(0);
    for numbers in [vec![4, 4, 4, 4], vec![1, 1, 4, 6], vec![1, 1, 1, 1]] {
        let puzzle = Puzzle::new(0, numbers);
        let result = solver.solve(&puzzle, &mut oracle, &HeuristicScorer);
        let trace = result.trace.map(|t| t.to_string()).unwrap_or_default();
        println!("   {} -> {:?} {}", puzzle.id, result.outcome, trace);
    }

    println!("\n=== Demo Complete ===");
}
