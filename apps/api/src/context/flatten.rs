//! Context Flattener: compacts structured records and Q/A lists into short,
//! token-bounded text blocks for inclusion in a generation prompt.
//!
//! Flattening never fails. Missing, null or malformed fields are omitted, and
//! every emitted value is capped in length. The line/pair limits are a token
//! budget safety valve: anything past them is dropped silently.

use serde_json::Value;

use crate::context::models::{ProfileRecord, QaPair};

/// Appended to any value that was cut at its cap.
pub const TRUNCATION_MARKER: char = '…';

/// System/bookkeeping fields that never belong in a prompt.
pub const DEFAULT_DENY_LIST: &[&str] = &[
    "id",
    "user_id",
    "created_at",
    "updated_at",
    "completion_percentage",
    "profile_picture_url",
    "ai_tags",
    "story_recordings",
    "version_number",
    "is_draft",
    "is_active",
];

#[derive(Debug, Clone)]
pub struct FlattenOptions<'a> {
    pub deny_list: &'a [&'a str],
    pub max_fields: usize,
    pub value_cap: usize,
}

impl Default for FlattenOptions<'static> {
    fn default() -> Self {
        Self {
            deny_list: DEFAULT_DENY_LIST,
            max_fields: 200,
            value_cap: 220,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QaFlattenOptions {
    pub max_pairs: usize,
    pub question_cap: usize,
    pub answer_cap: usize,
    /// Append the `[category | score | status]` tag line when any of them is present.
    pub include_tags: bool,
}

impl Default for QaFlattenOptions {
    fn default() -> Self {
        Self {
            max_pairs: 300,
            question_cap: 240,
            answer_cap: 280,
            include_tags: true,
        }
    }
}

const STATUS_CAP: usize = 40;
const SCORE_LIMIT: f64 = 1_000_000.0;

/// Cuts `text` to at most `cap` chars, appending [`TRUNCATION_MARKER`] when cut.
pub fn truncate_chars(text: &str, cap: usize) -> String {
    match text.char_indices().nth(cap) {
        Some((byte_idx, _)) => {
            let mut out = text[..byte_idx].trim_end().to_string();
            out.push(TRUNCATION_MARKER);
            out
        }
        None => text.to_string(),
    }
}

/// Renders a JSON value as prompt text, or `None` when it carries nothing.
fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Bool(b) => Some(if *b { "Yes" } else { "No" }.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(render_value).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Object(map) if map.is_empty() => None,
        Value::Object(map) => serde_json::to_string(map).ok(),
    }
}

/// Flattens a record into `- key: value` lines in insertion order.
pub fn flatten_structured(record: &ProfileRecord, options: &FlattenOptions<'_>) -> String {
    record
        .iter()
        .filter(|(key, _)| {
            !key.trim().is_empty()
                && !options
                    .deny_list
                    .iter()
                    .any(|denied| denied.eq_ignore_ascii_case(key))
        })
        .filter_map(|(key, value)| {
            render_value(value)
                .map(|rendered| format!("- {key}: {}", truncate_chars(&rendered, options.value_cap)))
        })
        .take(options.max_fields)
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_score(score: f64) -> Option<String> {
    if !score.is_finite() {
        return None;
    }
    let score = score.clamp(-SCORE_LIMIT, SCORE_LIMIT);
    if score.fract() == 0.0 {
        Some(format!("{}", score as i64))
    } else {
        Some(format!("{score:.2}"))
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Renders Q/A pairs as numbered blocks.
///
/// Only the first `max_pairs` input pairs are considered, so which pairs
/// survive is decided by source order. Pairs with neither question nor answer
/// are skipped and do not consume a number.
pub fn flatten_qa_pairs(pairs: &[QaPair], options: &QaFlattenOptions) -> String {
    pairs
        .iter()
        .take(options.max_pairs)
        .filter(|pair| !pair.is_blank())
        .enumerate()
        .map(|(idx, pair)| {
            let mut lines = Vec::with_capacity(3);
            let number = idx + 1;

            match non_blank(pair.question.as_deref()) {
                Some(q) => lines.push(format!("{number}. Q: {}", truncate_chars(q, options.question_cap))),
                None => lines.push(format!("{number}.")),
            }
            if let Some(a) = non_blank(pair.answer.as_deref()) {
                lines.push(format!("   A: {}", truncate_chars(a, options.answer_cap)));
            }

            if options.include_tags {
                let tags: Vec<String> = [
                    non_blank(pair.category.as_deref()).map(|c| format!("category: {c}")),
                    pair.score.and_then(format_score).map(|s| format!("score: {s}")),
                    non_blank(pair.status.as_deref())
                        .map(|s| format!("status: {}", truncate_chars(s, STATUS_CAP))),
                ]
                .into_iter()
                .flatten()
                .collect();
                if !tags.is_empty() {
                    lines.push(format!("   [{}]", tags.join(" | ")));
                }
            }

            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Answer texts of the first `max_pairs` pairs, each capped, blanks dropped.
/// Used as assessment snippets when sizing scene requests.
pub fn qa_answer_snippets(pairs: &[QaPair], options: &QaFlattenOptions) -> Vec<String> {
    pairs
        .iter()
        .take(options.max_pairs)
        .filter_map(|pair| non_blank(pair.answer.as_deref()))
        .map(|a| truncate_chars(a, options.answer_cap))
        .collect()
}
