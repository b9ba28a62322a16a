use serde::{Deserialize, Serialize};

/// Maximum points per factor. Sums to 100.
pub const SKILLS_WEIGHT: f64 = 40.0;
pub const EXPERIENCE_WEIGHT: f64 = 25.0;
pub const TITLE_WEIGHT: f64 = 15.0;
pub const SALARY_WEIGHT: f64 = 10.0;
pub const LOCATION_WEIGHT: f64 = 10.0;

pub const MAX_SCORE: f64 = 100.0;

/// Recommendation cutoffs on the total score.
pub const APPLY_NOW_THRESHOLD: f64 = 75.0;
pub const REVIEW_THRESHOLD: f64 = 50.0;

/// Points added per matched skill held at expert level (still capped by `SKILLS_WEIGHT`).
pub const EXPERT_BONUS: f64 = 1.0;

/// Title credit when the profile names no target titles.
pub const NEUTRAL_TITLE_SCORE: f64 = TITLE_WEIGHT / 2.0;

/// Location credit when the profile states no preference.
pub const NEUTRAL_LOCATION_SCORE: f64 = LOCATION_WEIGHT / 2.0;

/// Job pay at or below this share of the desired salary earns no salary points.
pub const SALARY_FLOOR_RATIO: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    Skills,
    Experience,
    Title,
    Salary,
    Location,
}

impl Factor {
    /// Fixed evaluation order, also the tie-break order in reason text.
    pub const ALL: [Factor; 5] = [
        Factor::Skills,
        Factor::Experience,
        Factor::Title,
        Factor::Salary,
        Factor::Location,
    ];

    pub fn max_points(&self) -> f64 {
        match self {
            Factor::Skills => SKILLS_WEIGHT,
            Factor::Experience => EXPERIENCE_WEIGHT,
            Factor::Title => TITLE_WEIGHT,
            Factor::Salary => SALARY_WEIGHT,
            Factor::Location => LOCATION_WEIGHT,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Factor::Skills => "skills",
            Factor::Experience => "experience",
            Factor::Title => "title",
            Factor::Salary => "salary",
            Factor::Location => "location",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    ApplyNow,
    Review,
    Skip,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::ApplyNow => "apply_now",
            Recommendation::Review => "review",
            Recommendation::Skip => "skip",
        }
    }

    pub fn from_score(score: f64) -> Self {
        if score >= APPLY_NOW_THRESHOLD {
            Recommendation::ApplyNow
        } else if score >= REVIEW_THRESHOLD {
            Recommendation::Review
        } else {
            Recommendation::Skip
        }
    }
}
