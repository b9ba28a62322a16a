//! Record normalizer: maps one raw scraped record onto the canonical `Job`.
//!
//! Every source names its fields differently; the alias table below is the single place
//! that knows about those spellings. Pure function of the record and the injected `now`.

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::ingest::parsing::{extract_min_experience, parse_salary_text, resolve_relative_date};
use crate::models::job::{Job, JobType, RawRecord, Salary, SalaryPeriod};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum NormalizationError {
    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("Invalid url '{0}': expected an absolute http(s) URL")]
    InvalidUrl(String),
}

/// Canonical fields a raw record can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Company,
    Location,
    Url,
    Description,
    SalaryText,
    SalaryMin,
    SalaryMax,
    SalaryCurrency,
    Posted,
    JobType,
    Skills,
    Experience,
}

impl Field {
    /// Known source spellings, in priority order.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::Title => &["title", "job_title", "position", "role", "name"],
            Field::Company => &[
                "company",
                "company_name",
                "employer",
                "organization",
                "hiring_organization",
            ],
            Field::Location => &[
                "location",
                "job_location",
                "candidate_required_location",
                "region",
                "city",
            ],
            Field::Url => &["url", "job_url", "link", "apply_url", "href", "redirect_url"],
            Field::Description => &[
                "description",
                "job_description",
                "summary",
                "snippet",
                "body",
                "details",
            ],
            Field::SalaryText => &["salary", "salary_text", "compensation", "salary_range", "pay"],
            Field::SalaryMin => &["salary_min", "min_salary"],
            Field::SalaryMax => &["salary_max", "max_salary"],
            Field::SalaryCurrency => &["salary_currency", "currency"],
            Field::Posted => &[
                "posted_date",
                "date_posted",
                "posted",
                "published_at",
                "pub_date",
                "created_at",
                "date",
            ],
            Field::JobType => &["job_type", "type", "employment_type", "contract_type"],
            Field::Skills => &["skills", "tags", "required_skills"],
            Field::Experience => &[
                "experience_required",
                "min_experience",
                "years_experience",
                "experience",
            ],
        }
    }
}

const PLACEHOLDER_VALUES: &[&str] = &["nan", "none", "null", "n/a"];
const DEFAULT_COMPANY: &str = "Unknown";
const DEFAULT_LOCATION: &str = "Remote";

/// Keyword table for job type detection. Checked in order; internship wins over freelance.
const JOB_TYPE_KEYWORDS: &[(JobType, &[&str])] = &[
    (JobType::Internship, &["intern"]),
    (JobType::Freelance, &["freelance", "contract", "project-based"]),
];

/// Normalizes a single raw record. Missing title/url is fatal for this record only.
pub fn normalize(raw: &RawRecord, source: &str, now: DateTime<Utc>) -> Result<Job, NormalizationError> {
    let title = text_field(raw, Field::Title).ok_or(NormalizationError::MissingRequiredField("title"))?;
    let raw_url = text_field(raw, Field::Url).ok_or(NormalizationError::MissingRequiredField("url"))?;
    let url = validate_url(&raw_url)?;

    let description = text_field(raw, Field::Description).unwrap_or_default();
    let company = text_field(raw, Field::Company).unwrap_or_else(|| DEFAULT_COMPANY.to_string());
    let location = text_field(raw, Field::Location).unwrap_or_else(|| DEFAULT_LOCATION.to_string());

    let salary = extract_salary(raw);
    let posted_date = text_field(raw, Field::Posted).and_then(|t| resolve_relative_date(&t, now));

    let job_type = text_field(raw, Field::JobType)
        .and_then(|label| JobType::from_label(&label))
        .unwrap_or_else(|| classify_job_type(&title, &description));

    let required_skills = list_field(raw, Field::Skills);

    let min_experience_years = experience_field(raw).or_else(|| extract_min_experience(&description));

    Ok(Job {
        title,
        company,
        location,
        salary,
        job_type,
        posted_date,
        source: source.trim().to_string(),
        url,
        description,
        required_skills,
        min_experience_years,
    })
}

/// Case-insensitive keyword heuristic over title + description.
pub fn classify_job_type(title: &str, description: &str) -> JobType {
    let haystack = format!("{} {}", title, description).to_lowercase();
    JOB_TYPE_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| haystack.contains(kw)))
        .map(|(job_type, _)| *job_type)
        .unwrap_or(JobType::FullTime)
}

fn validate_url(raw: &str) -> Result<String, NormalizationError> {
    let candidate = if raw.starts_with("//") {
        format!("https:{raw}")
    } else {
        raw.to_string()
    };

    match Url::parse(&candidate) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.host().is_some() => {
            Ok(candidate)
        }
        _ => Err(NormalizationError::InvalidUrl(raw.to_string())),
    }
}

fn first_value(raw: &RawRecord, field: Field) -> Option<&Value> {
    field
        .aliases()
        .iter()
        .filter_map(|alias| raw.get(*alias))
        .find(|value| value_as_text(value).is_some() || value.is_array())
}

fn text_field(raw: &RawRecord, field: Field) -> Option<String> {
    first_value(raw, field).and_then(value_as_text)
}

fn value_as_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    if text.is_empty() || PLACEHOLDER_VALUES.contains(&text.to_lowercase().as_str()) {
        None
    } else {
        Some(text)
    }
}

fn number_field(raw: &RawRecord, field: Field) -> Option<f64> {
    first_value(raw, field).and_then(|value| match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    })
}

fn list_field(raw: &RawRecord, field: Field) -> Vec<String> {
    let items: Vec<String> = match first_value(raw, field) {
        Some(Value::Array(values)) => values.iter().filter_map(value_as_text).collect(),
        Some(value) => value_as_text(value)
            .map(|text| {
                text.split([',', ';', '|'])
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default(),
        None => Vec::new(),
    };

    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.to_lowercase()))
        .collect()
}

fn extract_salary(raw: &RawRecord) -> Option<Salary> {
    let currency = text_field(raw, Field::SalaryCurrency);

    let bounded = Salary::from_bounds(
        number_field(raw, Field::SalaryMin),
        number_field(raw, Field::SalaryMax),
        currency.clone(),
        SalaryPeriod::Yearly,
    );
    if bounded.is_some() {
        return bounded;
    }

    let mut parsed = text_field(raw, Field::SalaryText).and_then(|t| parse_salary_text(&t))?;
    if parsed.currency.is_none() {
        parsed.currency = currency.map(|c| c.to_uppercase());
    }
    Some(parsed)
}

fn experience_field(raw: &RawRecord) -> Option<f64> {
    match first_value(raw, Field::Experience)? {
        Value::Number(n) => n.as_f64().filter(|v| *v >= 0.0),
        value => {
            let text = value_as_text(value)?;
            text.parse::<f64>()
                .ok()
                .filter(|v| *v >= 0.0)
                .or_else(|| extract_min_experience(&text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 15, 8, 0, 0).unwrap()
    }

    fn record(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be a JSON object"),
        }
    }

    #[test]
    fn test_maps_aliases_to_canonical_fields() {
        let raw = record(json!({
            "job_title": "Backend Engineer",
            "company_name": "Acme",
            "candidate_required_location": "Worldwide",
            "job_url": "https://remotive.com/jobs/123",
            "snippet": "Build APIs with 3+ years of Go.",
            "compensation": "$90k - $120k",
            "date_posted": "2 days ago",
            "tags": ["Go", "Postgres", "go"]
        }));

        let job = normalize(&raw, "remotive", now()).unwrap();
        assert_eq!(job.title, "Backend Engineer");
        assert_eq!(job.company, "Acme");
        assert_eq!(job.location, "Worldwide");
        assert_eq!(job.url, "https://remotive.com/jobs/123");
        assert_eq!(job.source, "remotive");
        assert_eq!(job.posted_date, NaiveDate::from_ymd_opt(2025, 3, 13));
        assert_eq!(job.required_skills, vec!["Go".to_string(), "Postgres".to_string()]);
        assert_eq!(job.min_experience_years, Some(3.0));
        let salary = job.salary.unwrap();
        assert_eq!(salary.min, Some(90_000.0));
        assert_eq!(salary.max, Some(120_000.0));
        assert_eq!(job.job_type, JobType::FullTime);
    }

    #[test]
    fn test_missing_title_is_fatal() {
        let raw = record(json!({"url": "https://x.com/job/1"}));
        assert_eq!(
            normalize(&raw, "x", now()).unwrap_err(),
            NormalizationError::MissingRequiredField("title")
        );
    }

    #[test]
    fn test_missing_url_is_fatal() {
        let raw = record(json!({"title": "Dev", "url": "  "}));
        assert_eq!(
            normalize(&raw, "x", now()).unwrap_err(),
            NormalizationError::MissingRequiredField("url")
        );
    }

    #[test]
    fn test_non_http_url_is_invalid() {
        let raw = record(json!({"title": "Dev", "url": "mailto:jobs@x.com"}));
        assert!(matches!(
            normalize(&raw, "x", now()),
            Err(NormalizationError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_unparseable_salary_degrades_to_none() {
        let raw = record(json!({
            "title": "Dev",
            "url": "https://x.com/job/1",
            "salary": "Competitive"
        }));
        let job = normalize(&raw, "x", now()).unwrap();
        assert!(job.salary.is_none());
    }

    #[test]
    fn test_numeric_salary_bounds_win_over_text() {
        let raw = record(json!({
            "title": "Dev",
            "url": "https://remoteok.com/remote-jobs/1",
            "salary_min": 80000,
            "salary_max": 100000,
            "salary": "Competitive"
        }));
        let salary = normalize(&raw, "remoteok", now()).unwrap().salary.unwrap();
        assert_eq!(salary.min, Some(80_000.0));
        assert_eq!(salary.max, Some(100_000.0));
    }

    #[test]
    fn test_placeholders_fall_back_to_defaults() {
        let raw = record(json!({
            "title": "Dev",
            "url": "https://x.com/job/1",
            "location": "nan",
            "company": ""
        }));
        let job = normalize(&raw, "x", now()).unwrap();
        assert_eq!(job.location, "Remote");
        assert_eq!(job.company, "Unknown");
        assert_eq!(job.description, "");
    }

    #[test]
    fn test_internship_beats_freelance() {
        assert_eq!(
            classify_job_type("Freelance Design Intern", ""),
            JobType::Internship
        );
        assert_eq!(
            classify_job_type("Designer", "This is a project-based role"),
            JobType::Freelance
        );
        assert_eq!(classify_job_type("Designer", "Permanent role"), JobType::FullTime);
    }

    #[test]
    fn test_explicit_job_type_label_wins() {
        let raw = record(json!({
            "title": "Support Agent",
            "url": "https://x.com/job/2",
            "employment_type": "Part-time"
        }));
        assert_eq!(normalize(&raw, "x", now()).unwrap().job_type, JobType::PartTime);
    }

    #[test]
    fn test_comma_separated_skills_and_numeric_experience() {
        let raw = record(json!({
            "title": "Data Engineer",
            "url": "https://x.com/job/3",
            "skills": "Python, SQL; Airflow",
            "experience_required": 4
        }));
        let job = normalize(&raw, "x", now()).unwrap();
        assert_eq!(job.required_skills, vec!["Python", "SQL", "Airflow"]);
        assert_eq!(job.min_experience_years, Some(4.0));
    }

    #[test]
    fn test_protocol_relative_url_is_accepted() {
        let raw = record(json!({"title": "Dev", "link": "//weworkremotely.com/jobs/9"}));
        let job = normalize(&raw, "wwr", now()).unwrap();
        assert_eq!(job.url, "https://weworkremotely.com/jobs/9");
    }
}
