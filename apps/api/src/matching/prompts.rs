// LLM prompt constants for the Matching module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::FIDELITY_INSTRUCTION;
use crate::matching::scorer::MatchResult;

/// Elaboration prompt template. Replace the `{...}` placeholders before sending.
pub const ELABORATE_PROMPT_TEMPLATE: &str = r#"You are a career coach reviewing a job match for a candidate.
Explain this job match to the candidate in two or three sentences.

Return a JSON object with this EXACT schema (no extra fields):
{
  "elaboration": "..."
}

{fidelity}

JOB: {title} at {company} ({location}, {job_type})
SCORE: {score}/100
RECOMMENDATION: {recommendation}
SUB-SCORES: {components}
MATCHING SKILLS: {matching}
MISSING SKILLS: {missing}
RULE-BASED REASON: {reason}

Mention the strongest factor, then the most useful gap to close."#;

/// Fills the elaboration template from a finished match result.
pub fn build_elaborate_prompt(result: &MatchResult) -> String {
    let c = &result.component_scores;
    let components = format!(
        "skills {:.1}/40, experience {:.1}/25, title {:.1}/15, salary {:.1}/10, location {:.1}/10",
        c.skills, c.experience, c.title, c.salary, c.location
    );

    let score = format!("{:.1}", result.score);
    let matching = list_or_none(&result.matching_skills);
    let missing = list_or_none(&result.missing_skills);

    fill_template(
        ELABORATE_PROMPT_TEMPLATE,
        &[
            ("fidelity", FIDELITY_INSTRUCTION),
            ("title", result.job.title.as_str()),
            ("company", result.job.company.as_str()),
            ("location", result.job.location.as_str()),
            ("job_type", result.job.job_type.as_str()),
            ("score", score.as_str()),
            ("recommendation", result.recommendation.as_str()),
            ("components", components.as_str()),
            ("matching", matching.as_str()),
            ("missing", missing.as_str()),
            ("reason", result.reason.as_str()),
        ],
    )
}

/// Single left-to-right pass over `template`. Substituted text is never rescanned, so
/// braces inside job data come through literally. Unknown `{...}` spans are kept as is.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let hit = tail[1..].find('}').and_then(|end| {
            let key = &tail[1..=end];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, value)| (*value, end + 2))
        });
        match hit {
            Some((value, consumed)) => {
                out.push_str(value);
                rest = &tail[consumed..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}
