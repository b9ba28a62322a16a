// Matching: score canonical jobs against a résumé profile, filter, rank.
// The scorer and pipeline are pure; only the handlers and enrichment touch async.

pub mod enrichment;
pub mod filters;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod reason;
pub mod scorer;
pub mod vocabulary;
pub mod weights;
