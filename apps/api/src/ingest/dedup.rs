use std::cmp::Ordering;
use std::collections::HashMap;

use url::Url;

use crate::models::job::Job;

/// Path endings that identify a listing/search page rather than one posting.
/// For these the query string carries the job id and must stay in the key.
const GENERIC_PATH_SUFFIXES: &[&str] = &["/jobs", "/search", "/job", "/viewjob", "/careers"];

/// Query params that never identify a posting.
const TRACKING_PARAMS: &[&str] = &["ref", "source", "src", "referrer", "trk"];

/// Normalized dedup key for a posting URL. `None` for an empty url.
///
/// Scheme, host and path are lower-cased, the trailing slash and fragment dropped.
/// The query survives only when the path alone looks generic.
pub fn dedup_key(url: &str) -> Option<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = match Url::parse(trimmed) {
        Ok(parsed) => parsed,
        Err(_) => {
            let base = trimmed.split(['?', '#']).next().unwrap_or(trimmed);
            return Some(base.trim_end_matches('/').to_lowercase());
        }
    };

    let host = parsed.host_str().unwrap_or_default().to_lowercase();
    let path = parsed.path().trim_end_matches('/').to_lowercase();
    let mut key = format!("{}://{}{}", parsed.scheme(), host, path);

    if is_generic_path(&path) {
        let mut params: Vec<(String, String)> = parsed
            .query_pairs()
            .filter(|(name, _)| !is_tracking_param(name))
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();
        params.sort();

        if !params.is_empty() {
            let query: Vec<String> = params
                .into_iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect();
            key.push('?');
            key.push_str(&query.join("&"));
        }
    }

    Some(key)
}

fn is_generic_path(path: &str) -> bool {
    path.is_empty() || GENERIC_PATH_SUFFIXES.iter().any(|suffix| path.ends_with(suffix))
}

fn is_tracking_param(name: &str) -> bool {
    let name = name.to_lowercase();
    name.starts_with("utm_") || TRACKING_PARAMS.contains(&name.as_str())
}

/// Orders two postings sharing a key: salary present first, then longer description.
/// `Ordering::Greater` means `candidate` should replace `incumbent`.
fn completeness_order(candidate: &Job, incumbent: &Job) -> Ordering {
    candidate
        .salary
        .is_some()
        .cmp(&incumbent.salary.is_some())
        .then_with(|| {
            candidate
                .description
                .chars()
                .count()
                .cmp(&incumbent.description.chars().count())
        })
}

/// Collapses postings with the same normalized URL.
///
/// Survivor per key: non-null salary, then longer description, then earliest seen.
/// The survivor takes the position where its key first appeared, so the output keeps
/// first-seen order. Jobs with an empty url are never merged.
pub fn deduplicate(jobs: Vec<Job>) -> Vec<Job> {
    let mut kept: Vec<Job> = Vec::with_capacity(jobs.len());
    let mut slot_by_key: HashMap<String, usize> = HashMap::new();

    for job in jobs {
        let Some(key) = dedup_key(&job.url) else {
            kept.push(job);
            continue;
        };

        match slot_by_key.get(&key) {
            Some(&slot) => {
                // Strictly better only; equal candidates lose to the earlier one
                if completeness_order(&job, &kept[slot]) == Ordering::Greater {
                    kept[slot] = job;
                }
            }
            None => {
                slot_by_key.insert(key, kept.len());
                kept.push(job);
            }
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::{JobType, Salary, SalaryPeriod};

    fn make_job(url: &str, description: &str, salary: Option<f64>) -> Job {
        Job {
            title: "Python Developer".to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            salary: salary.and_then(|s| Salary::from_bounds(Some(s), None, None, SalaryPeriod::Yearly)),
            job_type: JobType::FullTime,
            posted_date: None,
            source: "test".to_string(),
            url: url.to_string(),
            description: description.to_string(),
            required_skills: vec![],
            min_experience_years: None,
        }
    }

    #[test]
    fn test_key_strips_tracking_query_on_specific_path() {
        assert_eq!(
            dedup_key("https://x.com/job/1?ref=abc"),
            dedup_key("https://x.com/job/1?ref=xyz")
        );
        assert_eq!(
            dedup_key("HTTPS://X.com/Job/1/").as_deref(),
            Some("https://x.com/job/1")
        );
    }

    #[test]
    fn test_key_keeps_query_on_generic_path() {
        let a = dedup_key("https://board.com/jobs?id=1").unwrap();
        let b = dedup_key("https://board.com/jobs?id=2").unwrap();
        assert_ne!(a, b);
        assert_eq!(a, "https://board.com/jobs?id=1");
    }

    #[test]
    fn test_key_generic_path_drops_tracking_and_sorts() {
        assert_eq!(
            dedup_key("https://board.com/search?q=rust&utm_source=tw&id=7"),
            dedup_key("https://board.com/search?id=7&q=rust")
        );
    }

    #[test]
    fn test_key_empty_url_is_none() {
        assert_eq!(dedup_key("   "), None);
    }

    #[test]
    fn test_ref_variants_collapse_to_one() {
        let jobs = vec![
            make_job("https://x.com/job/1?ref=abc", "short", None),
            make_job("https://x.com/job/1?ref=xyz", "short", None),
        ];
        let out = deduplicate(jobs);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].url, "https://x.com/job/1?ref=abc");
    }

    #[test]
    fn test_salary_beats_longer_description() {
        let jobs = vec![
            make_job("https://x.com/job/1", "a much longer description here", None),
            make_job("https://x.com/job/1/", "short", Some(100_000.0)),
        ];
        let out = deduplicate(jobs);
        assert_eq!(out.len(), 1);
        assert!(out[0].salary.is_some());
    }

    #[test]
    fn test_longer_description_wins_when_salary_equal() {
        let jobs = vec![
            make_job("https://x.com/job/1", "short", None),
            make_job("https://x.com/job/1", "longer description", None),
        ];
        let out = deduplicate(jobs);
        assert_eq!(out[0].description, "longer description");
    }

    #[test]
    fn test_order_stable_and_survivor_takes_first_slot() {
        let jobs = vec![
            make_job("https://a.com/job/1", "a", None),
            make_job("https://b.com/job/2", "b", None),
            make_job("https://a.com/job/1", "a but longer", None),
            make_job("https://c.com/job/3", "c", None),
        ];
        let out = deduplicate(jobs);
        let urls: Vec<&str> = out.iter().map(|j| j.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://a.com/job/1", "https://b.com/job/2", "https://c.com/job/3"]
        );
        assert_eq!(out[0].description, "a but longer");
    }

    #[test]
    fn test_empty_urls_never_merge() {
        let jobs = vec![make_job("", "a", None), make_job("", "b", None)];
        assert_eq!(deduplicate(jobs).len(), 2);
    }

    #[test]
    fn test_deduplicate_is_idempotent() {
        let jobs = vec![
            make_job("https://x.com/job/1?ref=a", "one", None),
            make_job("https://x.com/job/1?ref=b", "one plus", Some(1.0)),
            make_job("https://board.com/jobs?id=1", "two", None),
            make_job("https://board.com/jobs?id=2", "three", None),
            make_job("https://x.com/job/1", "one plus more", None),
        ];
        let once = deduplicate(jobs);
        let twice = deduplicate(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }

    #[test]
    fn test_empty_input() {
        assert!(deduplicate(vec![]).is_empty());
    }
}
