// All prompt templates for the generation tasks.
// Placeholders are `{name}` and filled with `str::replace` by the builders.
// Cross-cutting fragments live in llm_client::prompts.

// ────────────────────────────────────────────────────────────────────────────
// Ideal-state prompts ("unleash imagination")
// ────────────────────────────────────────────────────────────────────────────

pub const IDEAL_STATE_SYSTEM: &str = "You are a warm, perceptive life-vision guide \
    helping members imagine their ideal life in one area at a time. \
    You write short, evocative imagination prompts, never advice.";

/// Shared output contract. Every builder ends with this.
pub const IDEAL_STATE_OUTPUT_CONTRACT: &str = r#"Return a JSON object with this EXACT schema (no extra fields):
{
  "prompts": [
    {"title": "Short evocative title", "prompt": "One or two sentences inviting them to imagine", "focusArea": "the facet of life this explores"}
  ],
  "encouragement": "One short, warm closing sentence"
}

Generate 3 to 5 prompts."#;

/// Specialized builder template.
/// Replace: {category_label}, {emotional_target}, {framing}, {example_phrasings},
///          {current_state}, {contrast_or_ideal}, {profile_context}, {output_contract}
pub const IDEAL_STATE_CATEGORY_TEMPLATE: &str = r#"Help this member imagine their ideal {category_label} life.

EMOTIONAL TARGET: {emotional_target}
THEMES TO EXPLORE: {framing}
EXAMPLE PHRASINGS (match the spirit, do not copy):
{example_phrasings}

WHAT IS ALREADY GOING WELL:
{current_state}

WHAT THEY WANT MORE OF (contrast already flipped into desire):
{contrast_or_ideal}

PROFILE CONTEXT:
{profile_context}

Write imagination prompts that build on what is already good and stretch toward what they want.
Each prompt should open a door, not prescribe an answer.

{output_contract}"#;

/// Fallback for categories without specialized guidance.
/// Replace: {category_label}, {current_state}, {contrast_or_ideal}, {profile_context}, {output_contract}
pub const IDEAL_STATE_GENERIC_TEMPLATE: &str = r#"Help this member imagine their ideal life in the area of "{category_label}".

WHAT IS ALREADY GOING WELL:
{current_state}

WHAT THEY WANT MORE OF (contrast already flipped into desire):
{contrast_or_ideal}

PROFILE CONTEXT:
{profile_context}

Write imagination prompts about how this area of life looks, feels and sounds at its best.
Each prompt should open a door, not prescribe an answer.

{output_contract}"#;

/// Shown in place of an empty section so the model does not invent content.
pub const EMPTY_SECTION: &str = "(nothing shared yet)";

// ────────────────────────────────────────────────────────────────────────────
// Vision composer
// ────────────────────────────────────────────────────────────────────────────

pub const VISION_COMPOSER_SYSTEM: &str = "You are a life-vision composer. \
    You turn a member's mixed input (what they want, what they want less of, \
    and anything they vented) into a believable, present-tense, first-person \
    vision paragraph for one area of life.";

/// Task instructions sent as the final user turn.
/// Replace: {vibrational_grammar}
pub const VISION_COMPOSER_TASKS: &str = r#"{vibrational_grammar}

PROCESS:
1. Mirror briefly: one specific feeling or theme in one short sentence.
2. Flip each contrast into the direction of desire, with no leaps.
3. Write one polished paragraph with sensory detail and a felt sense of place.
4. Add a one-line clarifier question.

Return a JSON object with this EXACT schema:
{
  "reflection": "one-sentence mirror",
  "paragraph": "the vision paragraph",
  "clarifier": "one follow-up question",
  "flip_map": [{"from": "contrast phrase", "to": "desire phrase"}],
  "related_categories": ["other life areas this touches"]
}"#;

// ────────────────────────────────────────────────────────────────────────────
// Scene generation
// ────────────────────────────────────────────────────────────────────────────

pub const SCENE_SYSTEM: &str = "You are a creative visualization writer. \
    You turn a member's desires into short, vivid scenes they can step into \
    and feel as already real.";

/// Replace: {category_label}, {vibrational_grammar}
pub const SCENE_INSTRUCTION_TEMPLATE: &str = r#"Write visualization scenes for the member's {category_label} life.

{vibrational_grammar}

Each scene is one concrete moment: where they are, what they see, hear and feel.
Cover the distinct desires they shared; do not merge unrelated desires into one scene.
Give each scene a one-word essence that names its feeling.

Return a JSON object with this EXACT schema:
{
  "scenes": [
    {"title": "Short title", "text": "The scene, 60 to 120 words", "essence_word": "Freedom"}
  ]
}"#;

// ────────────────────────────────────────────────────────────────────────────
// Final assembly
// ────────────────────────────────────────────────────────────────────────────

/// Combines router/instruction text, flattened context and length guidance.
/// Replace: {category}, {flattened_context}, {length_guidance}
pub const GENERATION_CONTEXT_TEMPLATE: &str = r#"CATEGORY: {category}

MEMBER CONTEXT:
{flattened_context}

LENGTH GUIDANCE:
{length_guidance}"#;

/// Used when the input is too thin to calibrate a length from.
pub const DEFAULT_LENGTH_GUIDANCE: &str =
    "Keep any prose field to about 120 to 150 words, focused on a single vivid picture.";
