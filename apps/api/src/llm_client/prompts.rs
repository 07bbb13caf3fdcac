// Shared prompt constants used across generation tasks.
// Task-specific templates live in generation/prompts.rs.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Corrective turn appended once after an unparsable response.
pub const JSON_RETRY_REMINDER: &str = "Please return only valid JSON.";

/// Language rules every vision-facing generation must follow.
pub const VIBRATIONAL_GRAMMAR: &str = "\
    VOICE RULES: \
    - Present tense, first person (I choose / I enjoy / I notice / I experience). \
    - Positive framing: describe what IS, never what is absent or avoided. \
    - Believability over bravado: prefer micro-behaviors and rhythms to grand claims. \
    - Include a simple ritual or rhythm where natural (for example a Sunday check-in). \
    - Avoid negating constructions entirely.";
