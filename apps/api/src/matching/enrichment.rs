//! Reason elaboration: optional LLM rewrite of the rule-based reason.
//!
//! Presentation only. Scores and recommendations are never sent back through here,
//! and a failed or slow call leaves the deterministic result untouched.

use async_trait::async_trait;
use serde::Deserialize;

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::matching::prompts::build_elaborate_prompt;
use crate::matching::scorer::MatchResult;

/// Implement this to swap elaboration backends without touching the handler.
///
/// Carried in `AppState` as `Option<Arc<dyn ReasonEnricher>>`.
#[async_trait]
pub trait ReasonEnricher: Send + Sync {
    async fn elaborate(&self, result: &MatchResult) -> Result<String, AppError>;
}

#[derive(Debug, Deserialize)]
struct Elaboration {
    elaboration: String,
}

/// Elaborates through the configured LLM server.
pub struct LlmReasonEnricher(pub LlmClient);

#[async_trait]
impl ReasonEnricher for LlmReasonEnricher {
    async fn elaborate(&self, result: &MatchResult) -> Result<String, AppError> {
        let prompt = build_elaborate_prompt(result);
        let parsed: Elaboration = self
            .0
            .call_json(&prompt, JSON_ONLY_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(e.to_string()))?;

        let text = parsed.elaboration.trim();
        if text.is_empty() {
            return Err(AppError::Llm("LLM returned an empty elaboration".to_string()));
        }
        Ok(text.to_string())
    }
}
