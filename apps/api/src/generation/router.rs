//! Category Prompt Router: picks the ideal-state prompt builder for a category.
//!
//! Dispatch is an exhaustive `match` on [`CategoryKey`]: every life category
//! gets the specialized builder with its own guidance, and `Custom` keys fall
//! through to the generic builder. Both end with the same JSON output contract.

use serde::Deserialize;

use crate::generation::category::{get_category_guidance, CategoryGuidance, CategoryKey};
use crate::generation::prompts::{
    EMPTY_SECTION, IDEAL_STATE_CATEGORY_TEMPLATE, IDEAL_STATE_GENERIC_TEMPLATE,
    IDEAL_STATE_OUTPUT_CONTRACT,
};

/// The four inputs every builder receives.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptInputs {
    /// Overrides the label derived from the category key.
    #[serde(default)]
    pub category_label: Option<String>,
    #[serde(default)]
    pub current_state: String,
    #[serde(default)]
    pub contrast_or_ideal: String,
    #[serde(default)]
    pub flattened_profile: String,
}

impl PromptInputs {
    fn label_for(&self, category: &CategoryKey) -> String {
        self.category_label
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| category.label())
    }
}

pub fn build_category_prompt(category: &CategoryKey, inputs: &PromptInputs) -> String {
    let label = inputs.label_for(category);
    match category {
        CategoryKey::Life(life) => build_specialized(&label, &get_category_guidance(*life), inputs),
        CategoryKey::Custom(_) => build_generic(&label, inputs),
    }
}

fn build_specialized(label: &str, guidance: &CategoryGuidance, inputs: &PromptInputs) -> String {
    let phrasings = guidance
        .example_phrasings
        .iter()
        .map(|p| format!("- {p}"))
        .collect::<Vec<_>>()
        .join("\n");

    IDEAL_STATE_CATEGORY_TEMPLATE
        .replace("{category_label}", label)
        .replace("{emotional_target}", guidance.emotional_target)
        .replace("{framing}", guidance.framing)
        .replace("{example_phrasings}", &phrasings)
        .replace("{current_state}", section(&inputs.current_state))
        .replace("{contrast_or_ideal}", section(&inputs.contrast_or_ideal))
        .replace("{profile_context}", section(&inputs.flattened_profile))
        .replace("{output_contract}", IDEAL_STATE_OUTPUT_CONTRACT)
}

fn build_generic(label: &str, inputs: &PromptInputs) -> String {
    IDEAL_STATE_GENERIC_TEMPLATE
        .replace("{category_label}", label)
        .replace("{current_state}", section(&inputs.current_state))
        .replace("{contrast_or_ideal}", section(&inputs.contrast_or_ideal))
        .replace("{profile_context}", section(&inputs.flattened_profile))
        .replace("{output_contract}", IDEAL_STATE_OUTPUT_CONTRACT)
}

fn section(text: &str) -> &str {
    let text = text.trim();
    if text.is_empty() {
        EMPTY_SECTION
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::category::LifeCategory;

    fn inputs() -> PromptInputs {
        PromptInputs {
            current_state: "We cook together on Fridays".to_string(),
            contrast_or_ideal: "More unhurried evenings".to_string(),
            ..PromptInputs::default()
        }
    }

    #[test]
    fn test_every_category_produces_contract() {
        let mut keys: Vec<CategoryKey> = LifeCategory::ALL.into_iter().map(CategoryKey::Life).collect();
        keys.push(CategoryKey::parse("anything at all"));
        keys.push(CategoryKey::parse(""));

        for key in keys {
            let prompt = build_category_prompt(&key, &inputs());
            assert!(prompt.contains("\"focusArea\""), "{key:?}");
            assert!(prompt.contains("\"encouragement\""), "{key:?}");
            assert!(!prompt.contains("{current_state}"), "{key:?}");
        }
    }

    #[test]
    fn test_specialized_prompt_carries_guidance() {
        let prompt = build_category_prompt(&CategoryKey::Life(LifeCategory::Love), &inputs());
        assert!(prompt.contains("ideal Love life"));
        assert!(prompt.contains("EMOTIONAL TARGET: Freedom to be fully myself"));
        assert!(prompt.contains("We cook together on Fridays"));
    }

    #[test]
    fn test_custom_uses_generic_builder() {
        let prompt = build_category_prompt(&CategoryKey::parse("side_projects"), &inputs());
        assert!(prompt.contains("in the area of \"Side Projects\""));
        assert!(!prompt.contains("EMOTIONAL TARGET"));
    }

    #[test]
    fn test_empty_sections_are_marked() {
        let prompt = build_category_prompt(&CategoryKey::parse("health"), &PromptInputs::default());
        assert!(prompt.contains(EMPTY_SECTION));
    }

    #[test]
    fn test_label_override() {
        let inputs = PromptInputs {
            category_label: Some("Romance & Partnership".to_string()),
            ..inputs()
        };
        let prompt = build_category_prompt(&CategoryKey::parse("romance"), &inputs);
        assert!(prompt.contains("ideal Romance & Partnership life"));
    }
}
