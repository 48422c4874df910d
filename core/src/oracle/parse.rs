//! Extracting an equation from free-text oracle answers

use crate::equation::Equation;

const DECORATIONS: [&str; 10] = ["$$", "$", "\\(", "\\)", "\\[", "\\]", "**", "`", "{", "}"];

const MULTIPLY: [&str; 4] = ["\\times", "\\cdot", "×", "·"];
const DIVIDE: [&str; 2] = ["\\div", "÷"];

/// Pull the `before = after` pair out of an answer
///
/// Only the last non-empty line is considered. Returns `None` when the
/// oracle gave up (`No`) or the line is not a single equation.
pub fn parse_reply(text: &str) -> Option<Equation> {
    let line = text.lines().map(str::trim).filter(|l| !l.is_empty()).last()?;

    let mut cleaned = line.to_string();
    for pattern in MULTIPLY {
        cleaned = cleaned.replace(pattern, "*");
    }
    for pattern in DIVIDE {
        cleaned = cleaned.replace(pattern, "/");
    }
    for pattern in DECORATIONS {
        cleaned = cleaned.replace(pattern, "");
    }
    cleaned = cleaned.replace('−', "-");

    // Drop a leading label such as "Answer:"
    let body = match cleaned.rfind(':') {
        Some(idx) => &cleaned[idx + 1..],
        None => cleaned.as_str(),
    };
    let body = body.trim().trim_end_matches('.').trim();

    if body.eq_ignore_ascii_case("no") || body.to_ascii_lowercase().starts_with("no ") {
        return None;
    }

    let mut sides = body.split('=');
    let before = sides.next()?.trim();
    let after = sides.next()?.trim();
    if sides.next().is_some() || before.is_empty() || after.is_empty() {
        return None;
    }

    Some(Equation::new(before, after))
}
