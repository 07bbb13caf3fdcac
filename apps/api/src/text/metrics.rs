//! Text Metrics: word/char counts and the distinct-idea heuristic.
//!
//! `count_distinct_ideas` is an intentional approximation. It adds up several
//! independent structural and lexical signals and will double-count (a bulleted
//! line scores once as a line and once as a bullet). It is a *relative* density
//! signal used to size generation requests, not an NLP ground truth.

use std::sync::LazyLock;

use regex::Regex;

macro_rules! idea_pattern {
    ($name:ident, $regex_str:expr) => {
        static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

idea_pattern!(RE_BULLET, r"(?m)^[ \t]*[-*•][ \t]+");
idea_pattern!(RE_NUMBERED, r"(?m)^[ \t]*\d+[.)][ \t]+");
idea_pattern!(
    RE_CONJUNCTION,
    r"(?i)\b(?:and|also|plus|additionally|furthermore)\s+"
);
idea_pattern!(
    RE_CONTEXTUAL_START,
    r"(?i)\b(?:when|where|what|with|while|during|after|before)\s+\w+"
);

fn count_matches(pattern: &LazyLock<Option<Regex>>, text: &str) -> usize {
    pattern
        .as_ref()
        .map_or(0, |re| re.find_iter(text).count())
}

/// Number of whitespace-separated words. Empty or whitespace-only input is 0.
pub fn estimate_word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Number of characters after trimming leading/trailing whitespace.
pub fn estimate_char_count(text: &str) -> usize {
    text.trim().chars().count()
}

/// One unit per line that has any non-whitespace content.
pub fn count_nonempty_lines(text: &str) -> usize {
    text.lines().filter(|line| !line.trim().is_empty()).count()
}

/// Bullet (`-`, `*`, `•`) and numbered (`1.`, `2)`) list markers at line start.
pub fn count_list_markers(text: &str) -> usize {
    count_matches(&RE_BULLET, text) + count_matches(&RE_NUMBERED, text)
}

/// Coordinating conjunctions that usually join two separate thoughts.
pub fn count_conjunctions(text: &str) -> usize {
    count_matches(&RE_CONJUNCTION, text)
}

/// Contextual words (`when`, `while`, `after`, ...) followed by another word.
pub fn count_contextual_starts(text: &str) -> usize {
    count_matches(&RE_CONTEXTUAL_START, text)
}

/// Heuristic count of separable ideas in a block of text.
///
/// Sum of [`count_nonempty_lines`], [`count_list_markers`], [`count_conjunctions`]
/// and [`count_contextual_starts`]. Floored at 1 for any non-empty input and 0
/// for empty input.
pub fn count_distinct_ideas(text: &str) -> usize {
    if text.trim().is_empty() {
        return 0;
    }

    let ideas = count_nonempty_lines(text)
        + count_list_markers(text)
        + count_conjunctions(text)
        + count_contextual_starts(text);

    ideas.max(1)
}

/// Joins the non-empty sources with a blank line, preserving their order.
pub fn combine_text_sources(sources: &[Option<&str>]) -> String {
    sources
        .iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n\n")
}
