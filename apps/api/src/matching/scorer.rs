//! Fit scoring: trait-based scorer that measures a résumé profile against one job.
//!
//! Default: `MultiFactorScorer` (pure-Rust, deterministic, no I/O). Five weighted factors,
//! see `weights`. Missing job-side data earns the benefit of the doubt.
//!
//! `AppState` holds an `Arc<dyn FitScorer>`; the pipeline only sees `&dyn FitScorer`.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::matching::reason::build_reason;
use crate::matching::vocabulary::{SkillMatcher, SkillVocabulary};
use crate::matching::weights::{
    Factor, Recommendation, EXPERIENCE_WEIGHT, EXPERT_BONUS, LOCATION_WEIGHT, MAX_SCORE,
    NEUTRAL_LOCATION_SCORE, NEUTRAL_TITLE_SCORE, SALARY_FLOOR_RATIO, SALARY_WEIGHT,
    SKILLS_WEIGHT, TITLE_WEIGHT,
};
use crate::models::job::Job;
use crate::models::profile::{Proficiency, ResumeProfile};

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

/// Per-factor points. Serialized as a name → sub-score map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub skills: f64,
    pub experience: f64,
    pub title: f64,
    pub salary: f64,
    pub location: f64,
}

impl ComponentScores {
    pub fn get(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Skills => self.skills,
            Factor::Experience => self.experience,
            Factor::Title => self.title,
            Factor::Salary => self.salary,
            Factor::Location => self.location,
        }
    }

    pub fn total(&self) -> f64 {
        Factor::ALL.iter().map(|f| self.get(*f)).sum()
    }
}

/// Full scoring outcome for one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub job: Job,
    pub score: f64, // 0 – 100
    pub component_scores: ComponentScores,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub recommendation: Recommendation,
    pub reason: String,
    #[serde(default)]
    pub notes: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The fit scorer trait. Implement this to swap scoring backends without touching
/// the pipeline or the handlers.
///
/// Scoring is CPU-only and runs on rayon workers, hence sync and `Send + Sync`.
pub trait FitScorer: Send + Sync {
    fn score(&self, job: &Job, profile: &ResumeProfile) -> MatchResult;

    /// Short backend label for logs.
    fn backend(&self) -> &'static str {
        "multi_factor"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MultiFactorScorer, the default implementation
// ────────────────────────────────────────────────────────────────────────────

/// Weighted five-factor scorer.
///
/// 1. Skills: share of required skills the profile holds, +1 per expert-level match
/// 2. Experience: profile years vs the job minimum
/// 3. Title: best Jaccard token overlap with a target title
/// 4. Salary: annualized job pay vs annualized desired pay
/// 5. Location: remote or a preferred location
#[derive(Clone)]
pub struct MultiFactorScorer {
    matcher: Arc<dyn SkillMatcher>,
}

impl MultiFactorScorer {
    pub fn new(matcher: Arc<dyn SkillMatcher>) -> Self {
        Self { matcher }
    }

    /// Scorer over the stock tech vocabulary.
    pub fn standard() -> Self {
        Self::new(Arc::new(SkillVocabulary::standard()))
    }

    /// Explicit job skills first, then vocabulary hits in title and description.
    fn required_skills(&self, job: &Job) -> Vec<String> {
        let mut required: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        let listed = job
            .required_skills
            .iter()
            .map(|s| self.matcher.canonicalize(s));
        let from_title = self.matcher.extract_skills(&job.title).into_iter();
        let from_description = self.matcher.extract_skills(&job.description).into_iter();

        for skill in listed.chain(from_title).chain(from_description) {
            if skill.is_empty() {
                continue;
            }
            if seen.insert(skill.to_lowercase()) {
                required.push(skill);
            }
        }
        required
    }

    fn profile_proficiency(&self, profile: &ResumeProfile, skill: &str) -> Option<Proficiency> {
        profile.proficiency_of(skill).or_else(|| {
            // Profile may spell it differently ("golang" vs "Go")
            profile
                .skills()
                .iter()
                .find(|entry| self.matcher.canonicalize(&entry.name).eq_ignore_ascii_case(skill))
                .map(|entry| entry.proficiency)
        })
    }

    fn score_skills(&self, job: &Job, profile: &ResumeProfile) -> SkillsOutcome {
        let required = self.required_skills(job);
        if required.is_empty() {
            return SkillsOutcome {
                points: SKILLS_WEIGHT,
                matching: vec![],
                missing: vec![],
            };
        }

        let mut matching = Vec::new();
        let mut missing = Vec::new();
        let mut expert_count = 0usize;

        for skill in &required {
            match self.profile_proficiency(profile, skill) {
                Some(level) => {
                    if level == Proficiency::Expert {
                        expert_count += 1;
                    }
                    matching.push(skill.clone());
                }
                None => missing.push(skill.clone()),
            }
        }

        let coverage = matching.len() as f64 / required.len() as f64;
        let points = (SKILLS_WEIGHT * coverage + EXPERT_BONUS * expert_count as f64).min(SKILLS_WEIGHT);

        SkillsOutcome {
            points,
            matching,
            missing,
        }
    }
}

impl Default for MultiFactorScorer {
    fn default() -> Self {
        Self::standard()
    }
}

impl FitScorer for MultiFactorScorer {
    fn score(&self, job: &Job, profile: &ResumeProfile) -> MatchResult {
        let mut notes = Vec::new();
        let skills = self.score_skills(job, profile);

        let component_scores = ComponentScores {
            skills: round2(skills.points),
            experience: round2(score_experience(job, profile)),
            title: round2(score_title(job, profile)),
            salary: round2(score_salary(job, profile, &mut notes)),
            location: round2(score_location(job, profile)),
        };

        let score = component_scores.total().clamp(0.0, MAX_SCORE);
        let recommendation = Recommendation::from_score(score);
        let reason = build_reason(&component_scores, score, &skills.missing);

        MatchResult {
            job: job.clone(),
            score,
            component_scores,
            matching_skills: skills.matching,
            missing_skills: skills.missing,
            recommendation,
            reason,
            notes,
        }
    }
}

struct SkillsOutcome {
    points: f64,
    matching: Vec<String>,
    missing: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Remaining factors
// ────────────────────────────────────────────────────────────────────────────

fn score_experience(job: &Job, profile: &ResumeProfile) -> f64 {
    match job.min_experience_years {
        Some(required) if required > 0.0 => {
            let ratio = (profile.experience_years() / required).clamp(0.0, 1.0);
            EXPERIENCE_WEIGHT * ratio
        }
        _ => EXPERIENCE_WEIGHT,
    }
}

fn score_title(job: &Job, profile: &ResumeProfile) -> f64 {
    if profile.target_titles().is_empty() {
        return NEUTRAL_TITLE_SCORE;
    }

    let job_tokens = title_tokens(&job.title);
    let best = profile
        .target_titles()
        .iter()
        .map(|target| jaccard(&job_tokens, &title_tokens(target)))
        .fold(0.0_f64, f64::max);

    TITLE_WEIGHT * best
}

fn score_salary(job: &Job, profile: &ResumeProfile, notes: &mut Vec<String>) -> f64 {
    let (Some(salary), Some(desired)) = (&job.salary, profile.desired_salary()) else {
        return SALARY_WEIGHT;
    };

    if let (Some(offered_currency), Some(desired_currency)) = (&salary.currency, &desired.currency) {
        if !offered_currency.eq_ignore_ascii_case(desired_currency) {
            notes.push(format!(
                "salary: currency mismatch ({offered_currency} vs {desired_currency}), not compared"
            ));
            return SALARY_WEIGHT;
        }
    }

    let Some(offered) = salary.annualized_reference() else {
        return SALARY_WEIGHT;
    };
    let wanted = desired.annualized();
    if wanted <= 0.0 {
        return SALARY_WEIGHT;
    }

    let ratio = offered / wanted;
    if ratio >= 1.0 {
        SALARY_WEIGHT
    } else if ratio <= SALARY_FLOOR_RATIO {
        0.0
    } else {
        SALARY_WEIGHT * (ratio - SALARY_FLOOR_RATIO) / (1.0 - SALARY_FLOOR_RATIO)
    }
}

fn score_location(job: &Job, profile: &ResumeProfile) -> f64 {
    let location = job.location.to_lowercase();
    if location.contains("remote") {
        return LOCATION_WEIGHT;
    }

    let preferred = profile.preferred_locations();
    if preferred.is_empty() {
        return NEUTRAL_LOCATION_SCORE;
    }

    if preferred
        .iter()
        .any(|p| location.contains(&p.to_lowercase()))
    {
        LOCATION_WEIGHT
    } else {
        0.0
    }
}

fn title_tokens(title: &str) -> HashSet<String> {
    title
        .to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
