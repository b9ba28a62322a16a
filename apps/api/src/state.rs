use std::sync::Arc;

use crate::config::Config;
use crate::matching::enrichment::ReasonEnricher;
use crate::matching::scorer::{FitScorer, MultiFactorScorer};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable fit scorer. Default: MultiFactorScorer over the stock vocabulary.
    pub scorer: Arc<dyn FitScorer>,
    /// Reason elaboration. `None` when no LLM server is configured.
    pub enricher: Option<Arc<dyn ReasonEnricher>>,
}

impl AppState {
    /// Deterministic-only state: default scorer, no elaboration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            scorer: Arc::new(MultiFactorScorer::standard()),
            enricher: None,
        }
    }

    pub fn with_enricher(mut self, enricher: Arc<dyn ReasonEnricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }
}
