// Ingest: raw scraper output → canonical, deduplicated jobs.
// Pure CPU work; the scraping itself happens in the source adapters.

pub mod dedup;
pub mod normalizer;
pub mod parsing;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::ingest::dedup::deduplicate;
use crate::ingest::normalizer::{normalize, NormalizationError};
use crate::models::job::{Job, RawRecord};

/// All records one source adapter returned for a search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceBatch {
    pub source: String,
    #[serde(default)]
    pub records: Vec<RawRecord>,
}

/// A record dropped during normalization.
#[derive(Debug, Clone, Serialize)]
pub struct RejectedRecord {
    pub source: String,
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NormalizedBatch {
    pub jobs: Vec<Job>,
    pub rejected: Vec<RejectedRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub jobs: Vec<Job>,
    pub received: usize,
    pub dropped: usize,
    pub duplicates_removed: usize,
    pub rejected: Vec<RejectedRecord>,
}

/// Normalizes one source's records in parallel. Bad records are dropped and reported,
/// never propagated. Output keeps the input order.
pub fn normalize_batch(batch: &SourceBatch, now: DateTime<Utc>) -> NormalizedBatch {
    let results: Vec<(usize, Result<Job, NormalizationError>)> = batch
        .records
        .par_iter()
        .enumerate()
        .map(|(index, record)| (index, normalize(record, &batch.source, now)))
        .collect();

    let mut jobs = Vec::with_capacity(results.len());
    let mut rejected = Vec::new();

    for (index, result) in results {
        match result {
            Ok(job) => jobs.push(job),
            Err(e) => {
                warn!(source = %batch.source, index, "Dropping raw record: {e}");
                rejected.push(RejectedRecord {
                    source: batch.source.clone(),
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }

    NormalizedBatch { jobs, rejected }
}

/// Normalizes every batch, then deduplicates across sources in one pass.
pub fn aggregate(batches: &[SourceBatch], now: DateTime<Utc>) -> AggregateReport {
    let received: usize = batches.iter().map(|b| b.records.len()).sum();

    let mut normalized = Vec::with_capacity(received);
    let mut rejected = Vec::new();
    for batch in batches {
        let result = normalize_batch(batch, now);
        normalized.extend(result.jobs);
        rejected.extend(result.rejected);
    }

    let before_dedup = normalized.len();
    let jobs = deduplicate(normalized);
    let duplicates_removed = before_dedup - jobs.len();

    info!(
        "Aggregated {} sources: {} received, {} dropped, {} duplicates removed, {} unique jobs",
        batches.len(),
        received,
        rejected.len(),
        duplicates_removed,
        jobs.len()
    );

    AggregateReport {
        jobs,
        received,
        dropped: rejected.len(),
        duplicates_removed,
        rejected,
    }
}
