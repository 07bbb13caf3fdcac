//! Axum route handlers for the composition API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::generation::category::{seed_questions, CategoryKey};
use crate::generation::composer::{
    self, IdealStateInputs, IdealStatePrompts, NarrativeInputs, SceneGeneration, SceneInputs,
    VisionParagraph,
};
use crate::generation::orchestrator::GenerationResult;
use crate::generation::router::PromptInputs;
use crate::scenes::recommender::{
    format_scene_count_for_prompt, should_suggest_more_scenes, SceneCountRecommendation,
    SceneSources,
};
use crate::state::AppState;
use crate::text::density::{
    analyze_density, compute_target_length_range, format_density_for_prompt, DensityMetrics,
    LengthRatios, TargetLengthRange,
};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DensityRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub ratios: Option<LengthRatios>,
}

#[derive(Debug, Serialize)]
pub struct DensityResponse {
    pub metrics: DensityMetrics,
    pub target_range: TargetLengthRange,
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub struct RecommendScenesRequest {
    #[serde(flatten)]
    pub sources: SceneSources,
    /// Member feedback on the current scene set, if any.
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub current_count: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecommendScenesResponse {
    pub recommendation: SceneCountRecommendation,
    pub guidance: String,
    pub suggest_more: bool,
}

#[derive(Debug, Deserialize)]
pub struct CategoryPromptRequest {
    pub category: String,
    #[serde(flatten)]
    pub inputs: PromptInputs,
}

#[derive(Debug, Serialize)]
pub struct CategoryPromptResponse {
    pub category: String,
    pub prompt: String,
    pub seed_questions: Vec<&'static str>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/metrics/density
///
/// Counts, density bucket and calibrated target range for a block of text.
pub async fn handle_density(
    Json(request): Json<DensityRequest>,
) -> Result<Json<DensityResponse>, AppError> {
    let metrics = analyze_density(&request.text);
    let target_range =
        compute_target_length_range(&request.text, request.ratios.unwrap_or_default());

    Ok(Json(DensityResponse {
        summary: format_density_for_prompt(&metrics),
        metrics,
        target_range,
    }))
}

/// POST /api/v1/scenes/recommend
pub async fn handle_recommend_scenes(
    Json(request): Json<RecommendScenesRequest>,
) -> Result<Json<RecommendScenesResponse>, AppError> {
    let recommendation = composer::recommend_scene_count(&request.sources);
    let current = request.current_count.unwrap_or(recommendation.target_scenes);
    let suggest_more = request
        .feedback
        .as_deref()
        .is_some_and(|feedback| should_suggest_more_scenes(current, feedback));

    Ok(Json(RecommendScenesResponse {
        guidance: format_scene_count_for_prompt(&recommendation),
        recommendation,
        suggest_more,
    }))
}

/// POST /api/v1/scenes/generate
pub async fn handle_generate_scenes(
    State(state): State<AppState>,
    Json(request): Json<SceneInputs>,
) -> Result<Json<SceneGeneration>, AppError> {
    require_category(&request.category)?;
    let cancel = state.shutdown.child_token();
    let generation = composer::generate_scenes(state.llm.as_ref(), &request, &cancel).await?;
    Ok(Json(generation))
}

/// POST /api/v1/vision/compose
pub async fn handle_compose_vision(
    State(state): State<AppState>,
    Json(request): Json<NarrativeInputs>,
) -> Result<Json<GenerationResult<VisionParagraph>>, AppError> {
    require_category(&request.category)?;
    let cancel = state.shutdown.child_token();
    let result = composer::compose_narrative(state.llm.as_ref(), &request, &cancel).await?;
    Ok(Json(result))
}

/// POST /api/v1/ideal-state/prompt
///
/// Returns the prompt text without calling the model. Useful for previewing
/// how a category is framed.
pub async fn handle_category_prompt(
    Json(request): Json<CategoryPromptRequest>,
) -> Result<Json<CategoryPromptResponse>, AppError> {
    let key = CategoryKey::parse(&request.category);
    Ok(Json(CategoryPromptResponse {
        category: key.key().to_string(),
        prompt: composer::build_category_prompt(&request.category, &request.inputs),
        seed_questions: seed_questions(&key).to_vec(),
    }))
}

/// POST /api/v1/ideal-state/generate
pub async fn handle_generate_ideal_state(
    State(state): State<AppState>,
    Json(request): Json<IdealStateInputs>,
) -> Result<Json<GenerationResult<IdealStatePrompts>>, AppError> {
    require_category(&request.category)?;
    let cancel = state.shutdown.child_token();
    let result =
        composer::generate_ideal_state_prompts(state.llm.as_ref(), &request, &cancel).await?;
    Ok(Json(result))
}

fn require_category(category: &str) -> Result<(), AppError> {
    if category.trim().is_empty() {
        return Err(AppError::Validation("category cannot be empty".to_string()));
    }
    Ok(())
}
