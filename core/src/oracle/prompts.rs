//! Prompt text sent to the oracle

use crate::ir::NumberMultiset;

/// Instruction sent with every query
pub const INSTRUCTION: &str = "You are a game of 24 grandmaster. We are going to take this problem step by step. \
At each step, you are going to pick only 2 numbers to operate on. \
Put only the mathematical expression you choose on the last line and nothing else. \
Don't put any of the math in latex or markdown formats.";

const FIRST_STEP: &str = "Numbers: ";
const LATER_STEP: &str = "Remaining numbers: ";
const PREVENT_REPETITION: &str = ". Don't pick these operations that you've already tried: ";

/// Prompt for an intermediate step
pub fn step_prompt(numbers: &NumberMultiset, first: bool, tried: &[String]) -> String {
    let lead = if first { FIRST_STEP } else { LATER_STEP };
    format!("{}{}{}{}", lead, numbers, PREVENT_REPETITION, tried_list(tried))
}

/// Prompt for the last step
pub fn terminal_prompt(numbers: &NumberMultiset) -> String {
    format!(
        "Remaining numbers: {}. This is the last step. If you cannot obtain 24, put 'No'.",
        numbers
    )
}

fn tried_list(tried: &[String]) -> String {
    let quoted: Vec<String> = tried.iter().map(|t| format!("'{}'", t)).collect();
    format!("[{}]", quoted.join(", "))
}
