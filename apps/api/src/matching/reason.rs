//! Rule-based reason text. Same component scores in, same sentence out.

use crate::matching::scorer::ComponentScores;
use crate::matching::weights::Factor;

/// Share of a factor's maximum at which it counts as a strength.
const STRONG_FRACTION: f64 = 0.9;
const WEAKEST_SHOWN: usize = 2;
const MISSING_SHOWN: usize = 3;

/// Builds the human-readable rationale from sub-scores and missing skills.
pub fn build_reason(components: &ComponentScores, score: f64, missing_skills: &[String]) -> String {
    let fractions: Vec<(Factor, f64)> = Factor::ALL
        .iter()
        .map(|f| (*f, components.get(*f) / f.max_points()))
        .collect();

    let strong: Vec<&str> = fractions
        .iter()
        .filter(|(_, fraction)| *fraction >= STRONG_FRACTION)
        .map(|(f, _)| f.label())
        .collect();

    let mut parts = Vec::new();

    if strong.len() == Factor::ALL.len() {
        parts.push(format!("Strong match across {}.", join_labels(&strong)));
    } else {
        parts.push(format!("Match {score:.1}/100."));
        if !strong.is_empty() {
            parts.push(format!("Strong on {}.", join_labels(&strong)));
        }

        // Stable sort keeps the fixed factor order among ties
        let mut weakest = fractions.clone();
        weakest.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        let weakest: Vec<String> = weakest
            .iter()
            .take(WEAKEST_SHOWN)
            .map(|(f, _)| {
                format!(
                    "{} ({:.1}/{:.0})",
                    f.label(),
                    components.get(*f),
                    f.max_points()
                )
            })
            .collect();
        parts.push(format!("Weakest: {}.", weakest.join(", ")));
    }

    if !missing_skills.is_empty() {
        let shown: Vec<&str> = missing_skills
            .iter()
            .take(MISSING_SHOWN)
            .map(String::as_str)
            .collect();
        let extra = missing_skills.len().saturating_sub(MISSING_SHOWN);
        if extra > 0 {
            parts.push(format!("Missing skills: {} and {extra} more.", shown.join(", ")));
        } else {
            parts.push(format!("Missing skills: {}.", shown.join(", ")));
        }
    }

    parts.join(" ")
}

/// "a", "a and b", "a, b and c".
fn join_labels(labels: &[&str]) -> String {
    match labels {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}
