//! Density Classifier: target length ranges and idea-density buckets.
//!
//! The density thresholds are a design choice, not derived from data. They live
//! in [`DensityBands`] so they can be recalibrated against sample inputs without
//! touching the four-level contract.

use serde::{Deserialize, Serialize};

use crate::text::metrics::{
    combine_text_sources, count_distinct_ideas, estimate_char_count, estimate_word_count,
};

/// Output/input length ratio window used when asking the generator for length.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LengthRatios {
    pub min_ratio: f64,
    pub max_ratio: f64,
}

impl Default for LengthRatios {
    fn default() -> Self {
        Self {
            min_ratio: 0.9,
            max_ratio: 1.1,
        }
    }
}

/// Requested output length, derived from the size of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetLengthRange {
    pub min_chars: usize,
    pub max_chars: usize,
    pub min_words: usize,
    pub max_words: usize,
    pub input_chars: usize,
    pub input_words: usize,
}

impl TargetLengthRange {
    /// True when there was no input to calibrate against. Callers must fall back
    /// to a fixed default length instead of asking for zero-length output.
    pub fn is_degenerate(&self) -> bool {
        self.input_chars == 0
    }

    /// Fits the word range into `[floor, ceiling]`.
    ///
    /// A range cut at the ceiling keeps its min/max proportion. Char figures
    /// for any moved bound are re-derived from the input's chars per word.
    /// `None` when there was no input or the range ends below `floor`.
    pub fn clamp_words(&self, floor: usize, ceiling: usize) -> Option<Self> {
        if self.is_degenerate() || floor > ceiling || self.max_words < floor {
            return None;
        }

        let max_words = self.max_words.min(ceiling);
        let min_words = if max_words < self.max_words {
            self.min_words * max_words / self.max_words
        } else {
            self.min_words
        }
        .clamp(floor, max_words);

        let chars_per_word = self.input_chars as f64 / self.input_words.max(1) as f64;
        let min_chars = if min_words == self.min_words {
            self.min_chars
        } else {
            (min_words as f64 * chars_per_word).floor() as usize
        };
        let max_chars = if max_words == self.max_words {
            self.max_chars
        } else {
            (max_words as f64 * chars_per_word).ceil() as usize
        };

        Some(Self {
            min_chars,
            max_chars: max_chars.max(min_chars),
            min_words,
            max_words,
            ..*self
        })
    }
}

/// Scales the input's char/word counts by `ratios`. Minimums are floored,
/// maximums ceiled. Empty input yields a zero-width range at zero.
pub fn compute_target_length_range(source_text: &str, ratios: LengthRatios) -> TargetLengthRange {
    let input_chars = estimate_char_count(source_text);
    let input_words = estimate_word_count(source_text);

    // Inverted or negative ratios would break min <= max
    let min_ratio = ratios.min_ratio.max(0.0);
    let max_ratio = ratios.max_ratio.max(min_ratio);

    // Epsilon absorbs float noise such as 10.0 * 1.1 = 11.000000000000002
    let scale_floor = |n: usize, r: f64| (n as f64 * r + 1e-9).floor() as usize;
    let scale_ceil = |n: usize, r: f64| (n as f64 * r - 1e-9).ceil().max(0.0) as usize;

    TargetLengthRange {
        min_chars: scale_floor(input_chars, min_ratio),
        max_chars: scale_ceil(input_chars, max_ratio),
        min_words: scale_floor(input_words, min_ratio),
        max_words: scale_ceil(input_words, max_ratio),
        input_chars,
        input_words,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DensityLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

/// Upper bounds (exclusive) in ideas per 100 characters for the first three levels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DensityBands {
    pub low_below: f64,
    pub medium_below: f64,
    pub high_below: f64,
}

impl Default for DensityBands {
    fn default() -> Self {
        Self {
            low_below: 0.5,
            medium_below: 1.0,
            high_below: 2.0,
        }
    }
}

impl DensityBands {
    pub fn classify(&self, ideas_per_100_chars: f64) -> DensityLevel {
        match ideas_per_100_chars {
            d if d < self.low_below => DensityLevel::Low,
            d if d < self.medium_below => DensityLevel::Medium,
            d if d < self.high_below => DensityLevel::High,
            _ => DensityLevel::VeryHigh,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DensityMetrics {
    pub chars: usize,
    pub words: usize,
    pub ideas: usize,
    pub ideas_per_char: f64,
    pub ideas_per_word: f64,
    pub words_per_idea: f64,
    pub density: DensityLevel,
}

pub fn analyze_density(text: &str) -> DensityMetrics {
    analyze_density_with(text, &DensityBands::default())
}

/// Computes counts and buckets ideas-per-100-chars into a [`DensityLevel`].
pub fn analyze_density_with(text: &str, bands: &DensityBands) -> DensityMetrics {
    let chars = estimate_char_count(text);
    let words = estimate_word_count(text);
    let ideas = count_distinct_ideas(text);

    let ratio = |num: usize, den: usize| {
        if den > 0 {
            num as f64 / den as f64
        } else {
            0.0
        }
    };

    let ideas_per_char = ratio(ideas, chars);

    DensityMetrics {
        chars,
        words,
        ideas,
        ideas_per_char,
        ideas_per_word: ratio(ideas, words),
        words_per_idea: ratio(words, ideas),
        density: bands.classify(ideas_per_char * 100.0),
    }
}

pub fn format_density_for_prompt(metrics: &DensityMetrics) -> String {
    format!(
        "Input richness: ~{} characters, {} distinct ideas ({} density)",
        metrics.chars,
        metrics.ideas,
        density_label(metrics.density)
    )
}

fn density_label(level: DensityLevel) -> &'static str {
    match level {
        DensityLevel::Low => "low",
        DensityLevel::Medium => "medium",
        DensityLevel::High => "high",
        DensityLevel::VeryHigh => "very_high",
    }
}

/// Per-category richness summary injected into multi-category prompts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRichness {
    pub input_chars: usize,
    pub min_chars: usize,
    pub max_chars: usize,
    pub idea_count: usize,
    pub density: DensityLevel,
}

pub fn compute_category_richness(sources: &[Option<&str>]) -> CategoryRichness {
    let combined = combine_text_sources(sources);
    let range = compute_target_length_range(&combined, LengthRatios::default());
    let density = analyze_density(&combined);

    CategoryRichness {
        input_chars: range.input_chars,
        min_chars: range.min_chars,
        max_chars: range.max_chars,
        idea_count: density.ideas,
        density: density.density,
    }
}

pub fn format_category_richness_for_prompt(category_label: &str, richness: &CategoryRichness) -> String {
    format!(
        "Category: {category_label}\n\
         - Input richness: ~{} characters, {} distinct ideas\n\
         - Target output: {}-{} characters\n\
         - Density: {}\n\
         - Required coverage: include ALL major ideas and themes mentioned",
        richness.input_chars,
        richness.idea_count,
        richness.min_chars,
        richness.max_chars,
        density_label(richness.density)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_default_ratios() {
        // 10 chars, 2 words
        let range = compute_target_length_range("hello worl", LengthRatios::default());
        assert_eq!(range.input_chars, 10);
        assert_eq!(range.input_words, 2);
        assert_eq!(range.min_chars, 9);
        assert_eq!(range.max_chars, 11);
        assert_eq!(range.min_words, 1);
        assert_eq!(range.max_words, 3);
    }

    #[test]
    fn test_range_empty_is_degenerate() {
        let range = compute_target_length_range("   ", LengthRatios::default());
        assert!(range.is_degenerate());
        assert_eq!((range.min_chars, range.max_chars), (0, 0));
        assert_eq!((range.min_words, range.max_words), (0, 0));
    }

    #[test]
    fn test_range_is_monotonic_when_input_doubles() {
        let mut text = String::from("I walk by the lake every morning. ");
        let mut prev = compute_target_length_range(&text, LengthRatios::default());
        for _ in 0..6 {
            text = format!("{text}{text}");
            let next = compute_target_length_range(&text, LengthRatios::default());
            assert!(next.min_chars >= prev.min_chars);
            assert!(next.max_chars >= prev.max_chars);
            assert!(next.min_chars <= next.max_chars);
            prev = next;
        }
    }

    #[test]
    fn test_range_inverted_ratios_keep_min_le_max() {
        let ratios = LengthRatios {
            min_ratio: 1.5,
            max_ratio: 0.5,
        };
        let range = compute_target_length_range("some words here", ratios);
        assert!(range.min_chars <= range.max_chars);
        assert!(range.min_words <= range.max_words);
    }

    #[test]
    fn test_clamp_words_caps_long_input() {
        let text = "word ".repeat(400);
        let range = compute_target_length_range(&text, LengthRatios::default());
        assert_eq!((range.min_words, range.max_words), (360, 440));

        let clamped = range.clamp_words(80, 160).unwrap();
        assert_eq!((clamped.min_words, clamped.max_words), (130, 160));
        assert_eq!((clamped.min_chars, clamped.max_chars), (649, 800));
        assert_eq!(clamped.input_words, 400);
    }

    #[test]
    fn test_clamp_words_keeps_range_inside_window() {
        let text = "word ".repeat(100);
        let range = compute_target_length_range(&text, LengthRatios::default());
        assert_eq!(range.clamp_words(80, 160), Some(range));
    }

    #[test]
    fn test_clamp_words_rejects_short_or_empty_input() {
        let short = compute_target_length_range("a few words only", LengthRatios::default());
        assert_eq!(short.clamp_words(80, 160), None);
        let empty = compute_target_length_range("", LengthRatios::default());
        assert_eq!(empty.clamp_words(0, 160), None);
    }

    #[test]
    fn test_density_bands_thresholds() {
        let bands = DensityBands::default();
        assert_eq!(bands.classify(0.0), DensityLevel::Low);
        assert_eq!(bands.classify(0.49), DensityLevel::Low);
        assert_eq!(bands.classify(0.5), DensityLevel::Medium);
        assert_eq!(bands.classify(1.0), DensityLevel::High);
        assert_eq!(bands.classify(1.99), DensityLevel::High);
        assert_eq!(bands.classify(2.0), DensityLevel::VeryHigh);
    }

    #[test]
    fn test_density_empty_text() {
        let m = analyze_density("");
        assert_eq!(m.chars, 0);
        assert_eq!(m.ideas, 0);
        assert_eq!(m.density, DensityLevel::Low);
    }

    #[test]
    fn test_density_short_list_is_very_high() {
        // 7 ideas in 53 chars, ~13 per 100 chars
        let m = analyze_density("- morning runs\n- cooking with friends\n- weekend hikes");
        assert_eq!(m.ideas, 7);
        assert_eq!(m.density, DensityLevel::VeryHigh);
    }

    #[test]
    fn test_density_long_single_sentence_is_low() {
        let text = "I enjoy ".to_string() + &"quiet ".repeat(100) + "evenings";
        let m = analyze_density(&text);
        assert_eq!(m.ideas, 1);
        assert_eq!(m.density, DensityLevel::Low);
    }

    #[test]
    fn test_format_density_for_prompt() {
        let m = analyze_density("I love hiking");
        assert_eq!(
            format_density_for_prompt(&m),
            "Input richness: ~13 characters, 1 distinct ideas (very_high density)"
        );
    }

    #[test]
    fn test_category_richness_combines_sources() {
        let richness = compute_category_richness(&[Some("I love hiking"), None, Some("and cooking")]);
        // "I love hiking\n\nand cooking" = 26 chars
        assert_eq!(richness.input_chars, 26);
        assert!(richness.idea_count >= 2);
        assert!(richness.min_chars <= richness.max_chars);
        let rendered = format_category_richness_for_prompt("Fun", &richness);
        assert!(rendered.starts_with("Category: Fun"));
        assert!(rendered.contains("Target output: 23-29 characters"));
    }
}
