// Shared prompt fragments. Feature-specific prompts live next to the feature
// (see matching/prompts.rs).

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Stops the model from contradicting the numbers it is given.
pub const FIDELITY_INSTRUCTION: &str = "\
    CRITICAL: The scores, skills and recommendation below are final. \
    Do NOT change, re-estimate or dispute them. \
    Only explain them in friendlier words, using facts present in the input.";
