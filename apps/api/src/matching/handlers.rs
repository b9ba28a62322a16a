use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::{AppError, MatchError};
use crate::ingest::{aggregate, AggregateReport, SourceBatch};
use crate::matching::filters::{SearchFilters, SearchFiltersInput};
use crate::matching::pipeline::filter_and_rank;
use crate::matching::scorer::MatchResult;
use crate::models::job::Job;
use crate::models::profile::ResumeProfile;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct NormalizeRequest {
    pub batches: Vec<SourceBatch>,
    /// Reference time for relative dates. Defaults to the server clock.
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct MatchRequest {
    pub batches: Vec<SourceBatch>,
    pub profile: ResumeProfile,
    #[serde(default)]
    pub filters: Option<SearchFiltersInput>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct MatchStats {
    pub received: usize,
    pub dropped: usize,
    pub duplicates_removed: usize,
    pub scored: usize,
    pub returned: usize,
}

#[derive(Serialize)]
pub struct MatchResponse {
    pub search_id: Uuid,
    pub ranked: Vec<MatchResult>,
    pub scored: Vec<MatchResult>,
    pub stats: MatchStats,
}

#[derive(Deserialize)]
pub struct ExplainRequest {
    pub job: Job,
    pub profile: ResumeProfile,
}

#[derive(Serialize)]
pub struct ExplainResponse {
    pub result: MatchResult,
    pub elaboration: Option<String>,
}

/// POST /api/v1/jobs/normalize
pub async fn handle_normalize(
    Json(req): Json<NormalizeRequest>,
) -> Result<Json<AggregateReport>, AppError> {
    let now = req.now.unwrap_or_else(Utc::now);

    // CPU-bound pass, run via spawn_blocking to avoid blocking the async executor.
    let report = tokio::task::spawn_blocking(move || aggregate(&req.batches, now))
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!("spawn_blocking failed in normalize: {e}"))
        })?;

    Ok(Json(report))
}

/// POST /api/v1/match
pub async fn handle_match(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let base = req
        .query
        .as_deref()
        .map(SearchFilters::from_query)
        .unwrap_or_default();
    let filters = req.filters.unwrap_or_default().apply_over(base)?;
    let now = req.now.unwrap_or_else(Utc::now);
    let batches = req.batches;
    let profile = req.profile;
    let scorer = state.scorer.clone();
    let search_id = Uuid::new_v4();

    let (report, output) = tokio::task::spawn_blocking(move || {
        let report = aggregate(&batches, now);
        let output = filter_and_rank(&report.jobs, &profile, &filters, scorer.as_ref())?;
        Ok::<_, MatchError>((report, output))
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in match: {e}")))??;

    let stats = MatchStats {
        received: report.received,
        dropped: report.dropped,
        duplicates_removed: report.duplicates_removed,
        scored: output.scored.len(),
        returned: output.ranked.len(),
    };
    info!(%search_id, ?stats, "Match search complete");

    Ok(Json(MatchResponse {
        search_id,
        ranked: output.ranked,
        scored: output.scored,
        stats,
    }))
}

/// POST /api/v1/match/explain
pub async fn handle_explain(
    State(state): State<AppState>,
    Json(req): Json<ExplainRequest>,
) -> Result<Json<ExplainResponse>, AppError> {
    let result = state.scorer.score(&req.job, &req.profile);

    let elaboration = match &state.enricher {
        Some(enricher) => {
            match tokio::time::timeout(state.config.llm_timeout, enricher.elaborate(&result)).await
            {
                Ok(Ok(text)) => Some(text),
                Ok(Err(e)) => {
                    warn!("Reason elaboration failed, returning rule-based reason only: {e}");
                    None
                }
                Err(_) => {
                    warn!(
                        "Reason elaboration timed out after {}s",
                        state.config.llm_timeout.as_secs()
                    );
                    None
                }
            }
        }
        None => None,
    };

    Ok(Json(ExplainResponse {
        result,
        elaboration,
    }))
}
