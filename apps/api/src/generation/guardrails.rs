//! Deterministic post-processing applied to generated text.
//!
//! Three guardrails run in a fixed order: negation scrub, motif insertion,
//! length clamp. Each is idempotent and the chain as a whole is a fixed point:
//! `apply(apply(x)) == apply(x)`. Which ones run is chosen per task through
//! [`GuardrailConfig`].

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::text::metrics::estimate_word_count;

macro_rules! guard_pattern {
    ($name:ident, $regex_str:expr) => {
        static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

guard_pattern!(
    RE_NEGATION,
    r"(?i)\b(?:don['’]t|do\s+not|not|no|never)\b"
);
guard_pattern!(RE_MULTI_SPACE, r"\s{2,}");
guard_pattern!(RE_SPACE_BEFORE_PUNCT, r"\s+([.,;:!?])");
guard_pattern!(
    RE_RITUAL_MARKER,
    r"(?i)\b(?:daily|weekly|morning|evening|sunday|ritual|check-?in|each\s+(?:day|week)|i\s+start|i\s+end)\b"
);

/// Appended when the text has no ritual or rhythm anchor.
pub const MOTIF_SENTENCE: &str = "I enjoy a simple weekly check-in to keep this feeling alive.";

/// Appended once when the text falls short of the minimum length.
pub const LENGTH_FILLER: &str = "I notice how this feels in daily life.";

pub const NEGATION_SCRUB: &str = "negation_scrub";
pub const MOTIF_INSERTION: &str = "motif_insertion";
pub const LENGTH_TRUNCATE: &str = "length_truncate";
pub const LENGTH_PAD: &str = "length_pad";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WordBounds {
    pub min: usize,
    pub max: usize,
}

/// Which guardrails a task runs.
///
/// When both `ensure_motif` and `length` are set, `length.max` must be larger
/// than the motif sentence, otherwise truncation cannot keep it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GuardrailConfig {
    pub scrub_negations: bool,
    pub ensure_motif: bool,
    pub length: Option<WordBounds>,
}

impl GuardrailConfig {
    /// Vision paragraph: every guardrail, 80–160 words.
    pub const fn narrative() -> Self {
        Self {
            scrub_negations: true,
            ensure_motif: true,
            length: Some(WordBounds { min: 80, max: 160 }),
        }
    }

    /// Scene texts keep their own length and rhythm, only negations are removed.
    pub const fn scenes() -> Self {
        Self {
            scrub_negations: true,
            ensure_motif: false,
            length: None,
        }
    }

    pub const fn none() -> Self {
        Self {
            scrub_negations: false,
            ensure_motif: false,
            length: None,
        }
    }

    pub fn is_noop(&self) -> bool {
        !self.scrub_negations && !self.ensure_motif && self.length.is_none()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Individual guardrails
// ────────────────────────────────────────────────────────────────────────────

/// Removes negation words and tidies the whitespace they leave behind.
pub fn scrub_negations(text: &str) -> String {
    let mut out = text.to_string();
    if let Some(re) = RE_NEGATION.as_ref() {
        out = re.replace_all(&out, "").into_owned();
    }
    if let Some(re) = RE_MULTI_SPACE.as_ref() {
        out = re.replace_all(&out, " ").into_owned();
    }
    if let Some(re) = RE_SPACE_BEFORE_PUNCT.as_ref() {
        out = re.replace_all(&out, "$1").into_owned();
    }
    out.trim().to_string()
}

pub fn has_ritual_marker(text: &str) -> bool {
    RE_RITUAL_MARKER
        .as_ref()
        .is_some_and(|re| re.is_match(text))
}

pub fn contains_negation(text: &str) -> bool {
    RE_NEGATION.as_ref().is_some_and(|re| re.is_match(text))
}

/// Appends [`MOTIF_SENTENCE`] unless a ritual/rhythm marker is already present.
pub fn ensure_motif(text: &str) -> String {
    if has_ritual_marker(text) {
        return text.to_string();
    }
    append_sentence(text, MOTIF_SENTENCE)
}

/// Clamps `text` to `bounds` words.
///
/// Over the maximum, the text is cut to `max` words; with `keep_motif` set and
/// the cut having dropped the only ritual marker, the motif is re-seated at the
/// end inside the same budget. Under the minimum, [`LENGTH_FILLER`] is
/// appended once.
pub fn enforce_length(text: &str, bounds: WordBounds, keep_motif: bool) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();

    if words.len() > bounds.max {
        let truncated = terminate(&words[..bounds.max].join(" "));
        if !keep_motif || has_ritual_marker(&truncated) {
            return truncated;
        }
        let budget = bounds.max.saturating_sub(estimate_word_count(MOTIF_SENTENCE));
        return append_sentence(&words[..budget].join(" "), MOTIF_SENTENCE);
    }

    let padded_fits = words.len() + estimate_word_count(LENGTH_FILLER) <= bounds.max;
    if words.len() < bounds.min && padded_fits && !text.trim_end().ends_with(LENGTH_FILLER) {
        return append_sentence(text, LENGTH_FILLER);
    }

    text.to_string()
}

fn append_sentence(text: &str, sentence: &str) -> String {
    let text = text.trim_end();
    if text.is_empty() {
        sentence.to_string()
    } else {
        format!("{} {sentence}", terminate(text))
    }
}

/// Ends the text with sentence punctuation if it has none.
fn terminate(text: &str) -> String {
    let text = text.trim_end();
    match text.chars().last() {
        None => String::new(),
        Some('.' | '!' | '?') => text.to_string(),
        Some(_) => format!("{}.", text.trim_end_matches([',', ';', ':'])),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Chain
// ────────────────────────────────────────────────────────────────────────────

/// Runs the configured guardrails in order. Returns the repaired text and the
/// names of the guardrails that actually changed it.
pub fn apply(text: &str, config: &GuardrailConfig) -> (String, Vec<&'static str>) {
    let mut applied = Vec::new();
    let mut current = text.to_string();

    if config.scrub_negations {
        let next = scrub_negations(&current);
        if next != current {
            applied.push(NEGATION_SCRUB);
        }
        current = next;
    }

    if config.ensure_motif {
        let next = ensure_motif(&current);
        if next != current {
            applied.push(MOTIF_INSERTION);
        }
        current = next;
    }

    if let Some(bounds) = config.length {
        let before = estimate_word_count(&current);
        let next = enforce_length(&current, bounds, config.ensure_motif);
        if next != current {
            applied.push(if before > bounds.max {
                LENGTH_TRUNCATE
            } else {
                LENGTH_PAD
            });
        }
        current = next;
    }

    (current, applied)
}

/// Post-conditions of [`apply`]. An empty list means the text is compliant.
pub fn check(text: &str, config: &GuardrailConfig) -> Vec<&'static str> {
    let mut violations = Vec::new();

    if config.scrub_negations && contains_negation(text) {
        violations.push(NEGATION_SCRUB);
    }
    if config.ensure_motif && !has_ritual_marker(text) {
        violations.push(MOTIF_INSERTION);
    }
    if let Some(bounds) = config.length {
        let words = estimate_word_count(text);
        if words > bounds.max {
            violations.push(LENGTH_TRUNCATE);
        }
        let padded_fits = words + estimate_word_count(LENGTH_FILLER) <= bounds.max;
        if words < bounds.min && padded_fits && !text.trim_end().ends_with(LENGTH_FILLER) {
            violations.push(LENGTH_PAD);
        }
    }

    violations
}
