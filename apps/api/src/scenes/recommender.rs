//! Scene-Count Recommender: sizes a scene-generation request from input richness.
//!
//! Two signals feed the recommendation: how many distinct ideas the combined
//! input contains (looked up in a [`SceneTable`]), and how many independent
//! sources were populated at all ([`RichnessTier`]). The tier then widens or
//! narrows the table row. Output is always within `1 ≤ min ≤ target ≤ max ≤ 8`.

use serde::{Deserialize, Serialize};

use crate::text::metrics::{combine_text_sources, count_distinct_ideas};

pub const MIN_SCENES: usize = 1;
pub const MAX_SCENES: usize = 8;

/// How many independent sources the user populated. `A` is the richest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RichnessTier {
    A,
    B,
    C,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneCountRecommendation {
    pub min_scenes: usize,
    pub max_scenes: usize,
    pub target_scenes: usize,
    pub distinct_ideas: usize,
    pub tier: RichnessTier,
}

/// Raw text the scenes are built from. Any field may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneSources {
    #[serde(default)]
    pub story: Option<String>,
    /// The "what isn't working" text, already flipped into positive phrasing.
    #[serde(default)]
    pub contrast_flipped: Option<String>,
    #[serde(default)]
    pub assessment_snippets: Vec<String>,
    #[serde(default)]
    pub prior_vision: Option<String>,
}

impl SceneSources {
    /// Combined text in a fixed order: story, flipped contrast, assessment, prior vision.
    pub fn combined_text(&self) -> String {
        let assessment = self
            .assessment_snippets
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        combine_text_sources(&[
            self.story.as_deref(),
            self.contrast_flipped.as_deref(),
            Some(assessment.as_str()),
            self.prior_vision.as_deref(),
        ])
    }

    /// Tier from which sources carry any text. The flipped contrast counts as story.
    pub fn tier(&self) -> RichnessTier {
        determine_data_tier(
            has_text(self.story.as_deref()) || has_text(self.contrast_flipped.as_deref()),
            self.assessment_snippets.iter().any(|s| has_text(Some(s))),
            has_text(self.prior_vision.as_deref()),
        )
    }
}

fn has_text(s: Option<&str>) -> bool {
    s.is_some_and(|s| !s.trim().is_empty())
}

/// One row of the idea-count lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneBand {
    /// Inclusive upper bound on distinct ideas for this row.
    pub up_to_ideas: usize,
    pub min: usize,
    pub max: usize,
    pub target: usize,
}

/// Idea-count → base scene bounds. Rows are checked in order; `beyond` covers the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneTable {
    pub bands: Vec<SceneBand>,
    pub beyond: SceneBand,
}

impl Default for SceneTable {
    fn default() -> Self {
        Self {
            bands: vec![
                SceneBand { up_to_ideas: 2, min: 1, max: 2, target: 1 },
                SceneBand { up_to_ideas: 5, min: 2, max: 4, target: 3 },
                SceneBand { up_to_ideas: 10, min: 3, max: 6, target: 4 },
            ],
            beyond: SceneBand { up_to_ideas: usize::MAX, min: 4, max: 8, target: 6 },
        }
    }
}

impl SceneTable {
    pub fn lookup(&self, distinct_ideas: usize) -> SceneBand {
        self.bands
            .iter()
            .copied()
            .find(|band| distinct_ideas <= band.up_to_ideas)
            .unwrap_or(self.beyond)
    }
}

/// `≥2` populated sources → A, `1` → B, none → C.
pub fn determine_data_tier(
    has_story: bool,
    has_assessment: bool,
    has_prior_vision: bool,
) -> RichnessTier {
    let populated = [has_story, has_assessment, has_prior_vision]
        .into_iter()
        .filter(|&b| b)
        .count();

    match populated {
        0 => RichnessTier::C,
        1 => RichnessTier::B,
        _ => RichnessTier::A,
    }
}

pub fn infer_scene_count_from_data(
    sources: &SceneSources,
    tier: RichnessTier,
) -> SceneCountRecommendation {
    infer_scene_count_with(sources, tier, &SceneTable::default())
}

/// Looks up the base row for the idea count, applies the tier adjustment, then clamps.
///
/// An all-empty source set still counts as one idea, so a user who skipped
/// every field gets one scene rather than none.
pub fn infer_scene_count_with(
    sources: &SceneSources,
    tier: RichnessTier,
    table: &SceneTable,
) -> SceneCountRecommendation {
    let distinct_ideas = count_distinct_ideas(&sources.combined_text()).max(1);
    let base = table.lookup(distinct_ideas);

    let (min, max, target) = match tier {
        RichnessTier::A => (base.min.max(3), (base.max + 1).min(8), (base.target + 1).min(6)),
        RichnessTier::B => (base.min.max(2), base.max.min(6), base.target.min(4)),
        RichnessTier::C => (
            base.min.saturating_sub(1).max(1),
            base.max.saturating_sub(1).min(4),
            base.target.saturating_sub(1).min(3),
        ),
    };

    let min_scenes = min.clamp(MIN_SCENES, MAX_SCENES);
    let max_scenes = max.clamp(MIN_SCENES, MAX_SCENES).max(min_scenes);
    let target_scenes = target.clamp(min_scenes, max_scenes);

    SceneCountRecommendation {
        min_scenes,
        max_scenes,
        target_scenes,
        distinct_ideas,
        tier,
    }
}

pub fn format_scene_count_for_prompt(rec: &SceneCountRecommendation) -> String {
    format!(
        "Target scenes: aim for {} scenes (minimum {}, maximum {}), based on {} distinct desires/ideas shared in this category.",
        rec.target_scenes, rec.min_scenes, rec.max_scenes, rec.distinct_ideas
    )
}

const MORE_DETAIL_KEYWORDS: &[&str] = &[
    "more", "also", "another", "multiple", "several", "many", "various", "different",
];

/// True when the count is still small and the feedback asks for breadth.
/// Matches whole words only, so "morning" does not count as "more".
pub fn should_suggest_more_scenes(current_scene_count: usize, feedback: &str) -> bool {
    let asks_for_more = feedback
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| MORE_DETAIL_KEYWORDS.iter().any(|k| word.eq_ignore_ascii_case(k)));

    current_scene_count < 4 && asks_for_more
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneAdjustment {
    More,
    Fewer,
    MuchMore,
    MuchFewer,
}

pub fn adjust_scene_count_for_regeneration(current: usize, adjustment: SceneAdjustment) -> usize {
    let adjusted = match adjustment {
        SceneAdjustment::More => current.saturating_add(1),
        SceneAdjustment::Fewer => current.saturating_sub(1),
        SceneAdjustment::MuchMore => current.saturating_add(2),
        SceneAdjustment::MuchFewer => current.saturating_sub(2),
    };
    adjusted.clamp(MIN_SCENES, MAX_SCENES)
}
