//! Caller interface: one entry point per generation use case.
//!
//! Each function gathers raw inputs, runs them through metrics, flattening and
//! routing, and hands a [`GenerationRequest`] to the orchestrator. The pure
//! helpers (`recommend_scene_count`, `build_category_prompt`) never call out.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::context::flatten::{
    flatten_qa_pairs, flatten_structured, qa_answer_snippets, truncate_chars, FlattenOptions,
    QaFlattenOptions,
};
use crate::context::models::{ProfileRecord, QaPair};
use crate::context::profile::extract_category_profile;
use crate::generation::category::CategoryKey;
use crate::generation::guardrails::GuardrailConfig;
use crate::generation::orchestrator::{
    self, GenerationError, GenerationRequest, GenerationResult, LengthGuidance, StructuredOutput,
};
use crate::generation::prompts::{
    IDEAL_STATE_SYSTEM, SCENE_INSTRUCTION_TEMPLATE, SCENE_SYSTEM, VISION_COMPOSER_SYSTEM,
    VISION_COMPOSER_TASKS,
};
use crate::generation::router::{self, PromptInputs};
use crate::llm_client::prompts::VIBRATIONAL_GRAMMAR;
use crate::llm_client::CompletionService;
use crate::scenes::recommender::{
    adjust_scene_count_for_regeneration, infer_scene_count_from_data, SceneAdjustment,
    SceneCountRecommendation, SceneSources,
};
use crate::text::density::{
    compute_category_richness, compute_target_length_range, format_category_richness_for_prompt,
    LengthRatios,
};
use crate::text::metrics::combine_text_sources;

const CONVERSATION_CAP: usize = 700;
const VENT_CAP: usize = 500;
const MAX_LIST_ITEMS: usize = 5;

// ────────────────────────────────────────────────────────────────────────────
// Payloads
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlipEntry {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionParagraph {
    #[serde(default)]
    pub reflection: String,
    pub paragraph: String,
    #[serde(default)]
    pub clarifier: String,
    #[serde(default)]
    pub flip_map: Vec<FlipEntry>,
    #[serde(default)]
    pub related_categories: Vec<String>,
}

impl StructuredOutput for VisionParagraph {
    const TASK: &'static str = "vision_paragraph";
    const SYSTEM_PROMPT: &'static str = VISION_COMPOSER_SYSTEM;

    fn guardrails() -> GuardrailConfig {
        GuardrailConfig::narrative()
    }

    fn validate(&self) -> Result<(), String> {
        if self.paragraph.trim().is_empty() {
            return Err("missing required field `paragraph`".to_string());
        }
        Ok(())
    }

    fn guarded_fields(&mut self) -> Vec<&mut String> {
        vec![&mut self.paragraph]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub essence_word: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSet {
    pub scenes: Vec<Scene>,
}

impl StructuredOutput for SceneSet {
    const TASK: &'static str = "scenes";
    const SYSTEM_PROMPT: &'static str = SCENE_SYSTEM;

    fn guardrails() -> GuardrailConfig {
        GuardrailConfig::scenes()
    }

    fn validate(&self) -> Result<(), String> {
        if self.scenes.is_empty() {
            return Err("`scenes` is empty".to_string());
        }
        if let Some(idx) = self.scenes.iter().position(|s| s.text.trim().is_empty()) {
            return Err(format!("scene {idx} has no text"));
        }
        Ok(())
    }

    fn guarded_fields(&mut self) -> Vec<&mut String> {
        self.scenes.iter_mut().map(|s| &mut s.text).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdealStatePrompt {
    pub title: String,
    pub prompt: String,
    #[serde(default, alias = "focusArea", alias = "focus")]
    pub focus_area: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdealStatePrompts {
    pub prompts: Vec<IdealStatePrompt>,
    #[serde(default)]
    pub encouragement: String,
}

impl StructuredOutput for IdealStatePrompts {
    const TASK: &'static str = "ideal_state_prompts";
    const SYSTEM_PROMPT: &'static str = IDEAL_STATE_SYSTEM;

    fn guardrails() -> GuardrailConfig {
        GuardrailConfig::none()
    }

    fn validate(&self) -> Result<(), String> {
        if self.prompts.is_empty() {
            return Err("`prompts` is empty".to_string());
        }
        if self.prompts.iter().any(|p| p.prompt.trim().is_empty()) {
            return Err("a prompt entry has no text".to_string());
        }
        Ok(())
    }

    fn guarded_fields(&mut self) -> Vec<&mut String> {
        Vec::new()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Inputs
// ────────────────────────────────────────────────────────────────────────────

/// Raw material for one vision paragraph.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NarrativeInputs {
    pub category: String,
    #[serde(default)]
    pub conversation: Option<String>,
    #[serde(default)]
    pub wants: Vec<String>,
    /// Contrast: what they want less of.
    #[serde(default)]
    pub less_of: Vec<String>,
    #[serde(default)]
    pub vent: Option<String>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub tone_hints: Vec<String>,
    #[serde(default)]
    pub profile: ProfileRecord,
    #[serde(default)]
    pub profile_insights: ProfileInsights,
    /// Assessment score for this category, out of 100.
    #[serde(default)]
    pub category_score: Option<f64>,
    /// Assessment rows in any shape; see [`QaPair::from_value`].
    #[serde(default)]
    pub assessment: Vec<Value>,
}

/// Traits distilled from the member's profile elsewhere in the product.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileInsights {
    #[serde(default)]
    pub strengths: Vec<String>,
    /// Used when the request carries no `values` of its own.
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SceneInputs {
    pub category: String,
    #[serde(default)]
    pub sources: SceneSources,
    #[serde(default)]
    pub assessment: Vec<Value>,
    #[serde(default)]
    pub profile: ProfileRecord,
    /// Regeneration: the count shown last time and how the member wants it changed.
    #[serde(default)]
    pub previous_count: Option<usize>,
    #[serde(default)]
    pub adjustment: Option<SceneAdjustment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdealStateInputs {
    pub category: String,
    #[serde(default)]
    pub category_label: Option<String>,
    #[serde(default)]
    pub current_clarity: String,
    #[serde(default)]
    pub flipped_contrast: String,
    #[serde(default)]
    pub profile: ProfileRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneGeneration {
    pub recommendation: SceneCountRecommendation,
    #[serde(flatten)]
    pub result: GenerationResult<SceneSet>,
}

// ────────────────────────────────────────────────────────────────────────────
// Pure helpers
// ────────────────────────────────────────────────────────────────────────────

/// Scene bounds for the given sources, tiered by which sources are populated.
pub fn recommend_scene_count(sources: &SceneSources) -> SceneCountRecommendation {
    infer_scene_count_from_data(sources, sources.tier())
}

/// Ideal-state prompt text for any category string.
pub fn build_category_prompt(category: &str, inputs: &PromptInputs) -> String {
    router::build_category_prompt(&CategoryKey::parse(category), inputs)
}

fn parse_assessment(rows: &[Value]) -> Vec<QaPair> {
    rows.iter().map(QaPair::from_value).collect()
}

/// Category-relevant profile lines followed by numbered assessment answers.
fn flatten_member_context(category: &CategoryKey, profile: &ProfileRecord, pairs: &[QaPair]) -> String {
    let profile_block = flatten_structured(
        &extract_category_profile(category, profile),
        &FlattenOptions::default(),
    );
    let qa_block = flatten_qa_pairs(pairs, &QaFlattenOptions::default());
    combine_text_sources(&[Some(profile_block.as_str()), Some(qa_block.as_str())])
}

fn list_line(label: &str, items: &[String], limit: usize) -> Option<String> {
    let items: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .take(limit)
        .collect();
    (!items.is_empty()).then(|| format!("{label}: {}", items.join(", ")))
}

/// The member's own words, compacted the way the composer expects them.
fn narrative_input_lines(inputs: &NarrativeInputs) -> String {
    let conversation = inputs
        .conversation
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| format!("CONVERSATION: {}", truncate_chars(c, CONVERSATION_CAP)));
    let vent = inputs
        .vent
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| format!("VENT: {}", truncate_chars(v, VENT_CAP)));
    let values = if inputs.values.iter().any(|v| !v.trim().is_empty()) {
        &inputs.values
    } else {
        &inputs.profile_insights.values
    };
    let score = inputs
        .category_score
        .filter(|s| s.is_finite())
        .map(|s| format!("CATEGORY SCORE: {s}/100"));

    [
        list_line("STRENGTHS", &inputs.profile_insights.strengths, 3),
        list_line("VALUES", values, 3),
        score,
        conversation,
        list_line("WANTS", &inputs.wants, MAX_LIST_ITEMS),
        list_line("LESS OF", &inputs.less_of, MAX_LIST_ITEMS),
        vent,
        list_line("TONE", &inputs.tone_hints, 3),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join("\n")
}

/// Calibrated length when the member wrote enough to fill a paragraph,
/// otherwise the fixed default. The range is fitted into the paragraph's
/// length guardrail so the model is never asked for words that get cut.
fn narrative_length_guidance(source_text: &str) -> LengthGuidance {
    let Some(bounds) = GuardrailConfig::narrative().length else {
        return LengthGuidance::Default;
    };
    compute_target_length_range(source_text, LengthRatios::default())
        .clamp_words(bounds.min, bounds.max)
        .map_or(LengthGuidance::Default, LengthGuidance::Range)
}

fn with_grammar(template: &str) -> String {
    template.replace("{vibrational_grammar}", VIBRATIONAL_GRAMMAR)
}

// ────────────────────────────────────────────────────────────────────────────
// Generation entry points
// ────────────────────────────────────────────────────────────────────────────

/// Composes one present-tense vision paragraph for a category.
pub async fn compose_narrative(
    llm: &dyn CompletionService,
    inputs: &NarrativeInputs,
    cancel: &CancellationToken,
) -> Result<GenerationResult<VisionParagraph>, GenerationError> {
    let category = CategoryKey::parse(&inputs.category);
    let pairs = parse_assessment(&inputs.assessment);
    let member_lines = narrative_input_lines(inputs);

    let request = GenerationRequest {
        category: category.label(),
        instruction_text: combine_text_sources(&[
            Some(member_lines.as_str()),
            Some(with_grammar(VISION_COMPOSER_TASKS).as_str()),
        ]),
        flattened_context: flatten_member_context(&category, &inputs.profile, &pairs),
        length_guidance: narrative_length_guidance(&member_lines),
    };

    info!("Composing vision paragraph for category {}", category.key());
    orchestrator::run(llm, &request, cancel).await
}

/// Sizes and generates visualization scenes for a category.
pub async fn generate_scenes(
    llm: &dyn CompletionService,
    inputs: &SceneInputs,
    cancel: &CancellationToken,
) -> Result<SceneGeneration, GenerationError> {
    let category = CategoryKey::parse(&inputs.category);
    let pairs = parse_assessment(&inputs.assessment);

    let mut sources = inputs.sources.clone();
    sources
        .assessment_snippets
        .extend(qa_answer_snippets(&pairs, &QaFlattenOptions::default()));

    let mut recommendation = recommend_scene_count(&sources);
    if let (Some(previous), Some(adjustment)) = (inputs.previous_count, inputs.adjustment) {
        let target = adjust_scene_count_for_regeneration(previous, adjustment);
        recommendation.target_scenes = target;
        recommendation.min_scenes = recommendation.min_scenes.min(target);
        recommendation.max_scenes = recommendation.max_scenes.max(target);
    }

    let source_text = sources.combined_text();
    let profile_block = flatten_structured(
        &extract_category_profile(&category, &inputs.profile),
        &FlattenOptions::default(),
    );

    let request = GenerationRequest {
        category: category.label(),
        instruction_text: with_grammar(SCENE_INSTRUCTION_TEMPLATE)
            .replace("{category_label}", &category.label()),
        flattened_context: combine_text_sources(&[Some(source_text.as_str()), Some(profile_block.as_str())]),
        length_guidance: LengthGuidance::Scenes(recommendation),
    };

    info!(
        "Generating scenes for category {} (target {}, tier {:?})",
        category.key(),
        recommendation.target_scenes,
        recommendation.tier
    );
    let result = orchestrator::run(llm, &request, cancel).await?;

    Ok(SceneGeneration {
        recommendation,
        result,
    })
}

/// Generates "imagine your ideal state" prompts for a category.
pub async fn generate_ideal_state_prompts(
    llm: &dyn CompletionService,
    inputs: &IdealStateInputs,
    cancel: &CancellationToken,
) -> Result<GenerationResult<IdealStatePrompts>, GenerationError> {
    let category = CategoryKey::parse(&inputs.category);
    let label = inputs
        .category_label
        .clone()
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| category.label());

    let prompt_inputs = PromptInputs {
        category_label: Some(label.clone()),
        current_state: inputs.current_clarity.clone(),
        contrast_or_ideal: inputs.flipped_contrast.clone(),
        flattened_profile: flatten_structured(
            &extract_category_profile(&category, &inputs.profile),
            &FlattenOptions::default(),
        ),
    };

    let richness = compute_category_richness(&[
        Some(inputs.current_clarity.as_str()),
        Some(inputs.flipped_contrast.as_str()),
    ]);

    let request = GenerationRequest {
        category: label.clone(),
        instruction_text: router::build_category_prompt(&category, &prompt_inputs),
        flattened_context: format_category_richness_for_prompt(&label, &richness),
        length_guidance: LengthGuidance::Default,
    };

    info!("Generating ideal-state prompts for category {}", category.key());
    orchestrator::run(llm, &request, cancel).await
}
