use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::MatchError;
use crate::models::job::{Job, JobType};

pub const DEFAULT_LIMIT: usize = 20;

/// Explicit region locks in a job's location text ("US only", "EMEA only").
static REGION_LOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(usa|us|uk|canada|europe|eu|india|north america|americas|emea)\s+only\b")
        .unwrap()
});

/// Names that satisfy each region lock. Compared as whole words against the requested location.
const REGION_NAMES: &[(&str, &[&str])] = &[
    ("usa", &["us", "usa", "united states", "america"]),
    ("us", &["us", "usa", "united states", "america"]),
    ("uk", &["uk", "united kingdom", "britain", "england"]),
    ("canada", &["canada"]),
    ("europe", &["europe", "eu", "european union"]),
    ("eu", &["europe", "eu", "european union"]),
    ("india", &["india"]),
    (
        "north america",
        &["north america", "america", "us", "usa", "united states", "canada"],
    ),
    (
        "americas",
        &[
            "americas",
            "america",
            "north america",
            "south america",
            "latin america",
            "us",
            "usa",
            "united states",
            "canada",
        ],
    ),
    (
        "emea",
        &["emea", "europe", "eu", "uk", "united kingdom", "middle east", "africa"],
    ),
];

static LPA_AMOUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*lpa\b").unwrap());

/// One lakh rupees.
const LAKH: f64 = 100_000.0;

/// Hard filters applied after scoring. Location is permissive, job type strict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchFilters {
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    pub min_salary: Option<f64>,
    pub limit: usize,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            location: None,
            job_type: None,
            min_salary: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl SearchFilters {
    pub fn validate(&self) -> Result<(), MatchError> {
        if self.limit == 0 {
            return Err(MatchError::InvalidArgument(
                "limit must be at least 1".to_string(),
            ));
        }
        if let Some(min) = self.min_salary {
            if !min.is_finite() || min < 0.0 {
                return Err(MatchError::InvalidArgument(format!(
                    "min_salary must be a non-negative number, got {min}"
                )));
            }
        }
        Ok(())
    }

    /// Derives filters from a free-text search such as "python intern india 5 lpa".
    pub fn from_query(query: &str) -> Self {
        let lower = query.to_lowercase();
        let mut filters = Self::default();

        if lower.contains("intern") {
            filters.job_type = Some(JobType::Internship);
        } else if lower.contains("freelance") {
            filters.job_type = Some(JobType::Freelance);
        }

        if lower.contains("india") {
            filters.location = Some("India".to_string());
        }

        if let Some(caps) = LPA_AMOUNT.captures(&lower) {
            if let Ok(lakhs) = caps[1].parse::<f64>() {
                filters.min_salary = Some(lakhs * LAKH);
            }
        }

        filters
    }

    /// Whether `job` passes every active filter.
    pub fn matches(&self, job: &Job) -> bool {
        self.location_allows(job) && self.job_type_allows(job) && self.salary_allows(job)
    }

    /// Drops a job only when it is explicitly locked to a region other than the requested one.
    fn location_allows(&self, job: &Job) -> bool {
        let Some(requested) = self.location.as_deref().map(str::trim) else {
            return true;
        };
        if requested.is_empty() {
            return true;
        }

        let requested = word_padded(requested);
        let location = job.location.to_lowercase();
        if word_padded(&location).contains(&requested) {
            return true;
        }

        REGION_LOCK
            .captures_iter(&location)
            .all(|caps| region_covers(&caps[1], &requested))
    }

    fn job_type_allows(&self, job: &Job) -> bool {
        self.job_type.map_or(true, |wanted| job.job_type == wanted)
    }

    /// Unknown salaries stay in.
    fn salary_allows(&self, job: &Job) -> bool {
        let Some(min) = self.min_salary else {
            return true;
        };
        match job.salary.as_ref().and_then(|s| s.annualized_upper()) {
            Some(upper) => upper >= min,
            None => true,
        }
    }
}

/// Whether a lock on `region` admits the requested location, given as `word_padded` text.
fn region_covers(region: &str, requested: &str) -> bool {
    let region = word_padded(region);
    let region = region.trim();
    let names = REGION_NAMES
        .iter()
        .find(|(lock, _)| *lock == region)
        .map_or(&[][..], |(_, names)| *names);

    std::iter::once(region)
        .chain(names.iter().copied())
        .any(|name| requested.contains(&format!(" {name} ")))
}

/// Lowercase words separated by single spaces, with a space at each end.
fn word_padded(text: &str) -> String {
    let words: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();
    format!(" {} ", words.join(" "))
}

/// Filters as they arrive over HTTP. Every field is optional and overrides the
/// query-derived value when present. `limit` is signed so a negative value is
/// reported rather than rejected by the JSON layer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchFiltersInput {
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    pub min_salary: Option<f64>,
    pub limit: Option<i64>,
}

impl SearchFiltersInput {
    pub fn apply_over(self, base: SearchFilters) -> Result<SearchFilters, MatchError> {
        let limit = match self.limit {
            Some(limit) => usize::try_from(limit).map_err(|_| {
                MatchError::InvalidArgument(format!("limit must be at least 1, got {limit}"))
            })?,
            None => base.limit,
        };

        let filters = SearchFilters {
            location: self.location.or(base.location),
            job_type: self.job_type.or(base.job_type),
            min_salary: self.min_salary.or(base.min_salary),
            limit,
        };
        filters.validate()?;
        Ok(filters)
    }
}
