use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A raw scraped record as handed over by a source adapter. Field names vary per source.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    #[default]
    FullTime,
    PartTime,
    Internship,
    Freelance,
    Contract,
    Unknown,
}

impl JobType {
    /// Maps an explicit employment-type label ("Full-time", "part_time", "Internship", ...).
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();

        match normalized.as_str() {
            "fulltime" | "permanent" => Some(JobType::FullTime),
            "parttime" => Some(JobType::PartTime),
            "intern" | "internship" => Some(JobType::Internship),
            "freelance" | "freelancer" => Some(JobType::Freelance),
            "contract" | "contractor" | "temporary" => Some(JobType::Contract),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "full_time",
            JobType::PartTime => "part_time",
            JobType::Internship => "internship",
            JobType::Freelance => "freelance",
            JobType::Contract => "contract",
            JobType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryPeriod {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    #[default]
    Yearly,
}

impl SalaryPeriod {
    /// Multiplier that turns one period's pay into a yearly figure.
    pub fn annual_factor(&self) -> f64 {
        match self {
            SalaryPeriod::Hourly => 2080.0,
            SalaryPeriod::Daily => 260.0,
            SalaryPeriod::Weekly => 52.0,
            SalaryPeriod::Monthly => 12.0,
            SalaryPeriod::Yearly => 1.0,
        }
    }
}

/// Structured salary range. At least one bound is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Salary {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub currency: Option<String>,
    #[serde(default)]
    pub period: SalaryPeriod,
}

impl Salary {
    /// Builds a range from optional bounds, swapping them if reversed.
    /// Returns `None` when neither bound is a positive finite number.
    pub fn from_bounds(
        min: Option<f64>,
        max: Option<f64>,
        currency: Option<String>,
        period: SalaryPeriod,
    ) -> Option<Self> {
        let valid = |v: Option<f64>| v.filter(|n| n.is_finite() && *n > 0.0);
        let (min, max) = match (valid(min), valid(max)) {
            (Some(a), Some(b)) if a > b => (Some(b), Some(a)),
            (None, None) => return None,
            other => other,
        };

        Some(Self {
            min,
            max,
            currency: currency.map(|c| c.to_uppercase()),
            period,
        })
    }

    /// Midpoint when both bounds are known, otherwise whichever bound exists.
    pub fn reference_amount(&self) -> Option<f64> {
        match (self.min, self.max) {
            (Some(min), Some(max)) => Some((min + max) / 2.0),
            (None, Some(max)) => Some(max),
            (Some(min), None) => Some(min),
            (None, None) => None,
        }
    }

    /// Reference amount scaled to a yearly figure.
    pub fn annualized_reference(&self) -> Option<f64> {
        self.reference_amount()
            .map(|amount| amount * self.period.annual_factor())
    }

    /// Highest advertised pay, scaled to a yearly figure.
    pub fn annualized_upper(&self) -> Option<f64> {
        self.max
            .or(self.min)
            .map(|amount| amount * self.period.annual_factor())
    }
}

/// Canonical job posting, independent of the source it was scraped from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: Option<Salary>,
    pub job_type: JobType,
    pub posted_date: Option<NaiveDate>,
    pub source: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub min_experience_years: Option<f64>,
}
