use std::cmp::Ordering;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::MatchError;
use crate::matching::filters::SearchFilters;
use crate::matching::scorer::{FitScorer, MatchResult};
use crate::models::job::Job;
use crate::models::profile::ResumeProfile;

#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    /// Every job, scored, in rank order.
    pub scored: Vec<MatchResult>,
    /// Jobs passing the filters, in rank order, at most `limit`.
    pub ranked: Vec<MatchResult>,
}

/// Scores every job, ranks them, then applies the hard filters and the limit.
///
/// Ranking: score desc, posted date desc (undated last), source asc, input order.
pub fn filter_and_rank(
    jobs: &[Job],
    profile: &ResumeProfile,
    filters: &SearchFilters,
    scorer: &dyn FitScorer,
) -> Result<PipelineOutput, MatchError> {
    filters.validate()?;

    let mut scored: Vec<(usize, MatchResult)> = jobs
        .par_iter()
        .enumerate()
        .map(|(index, job)| (index, scorer.score(job, profile)))
        .collect();

    scored.sort_by(|(ia, a), (ib, b)| rank_order(a, b).then_with(|| ia.cmp(ib)));
    let scored: Vec<MatchResult> = scored.into_iter().map(|(_, result)| result).collect();

    let ranked: Vec<MatchResult> = scored
        .iter()
        .filter(|result| filters.matches(&result.job))
        .take(filters.limit)
        .cloned()
        .collect();

    debug!(backend = scorer.backend(), ?filters, "Applied search filters");
    info!(
        "Scored {} jobs, {} passed filters (limit {})",
        scored.len(),
        ranked.len(),
        filters.limit
    );

    Ok(PipelineOutput { scored, ranked })
}

fn rank_order(a: &MatchResult, b: &MatchResult) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| match (a.job.posted_date, b.job.posted_date) {
            (Some(da), Some(db)) => db.cmp(&da),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.job.source.cmp(&b.job.source))
}
