//! Per-category profile field selection, applied before flattening.

use serde_json::Value;

use crate::context::models::ProfileRecord;
use crate::generation::category::{CategoryKey, LifeCategory};

/// Profile attributes relevant to a category, in prompt order.
/// Custom categories have no curated list.
pub fn category_profile_fields(category: &CategoryKey) -> &'static [&'static str] {
    let CategoryKey::Life(category) = category else {
        return &[];
    };

    match category {
        LifeCategory::Fun => &["hobbies", "leisure_time_weekly"],
        LifeCategory::Health => &[
            "exercise_frequency",
            "height",
            "weight",
            "health_conditions",
            "medications",
        ],
        LifeCategory::Travel => &["travel_frequency", "passport", "countries_visited"],
        LifeCategory::Love => &["relationship_status", "relationship_length", "partner_name"],
        LifeCategory::Family => &[
            "has_children",
            "number_of_children",
            "children_ages",
            "first_name",
        ],
        LifeCategory::Social => &["close_friends_count", "social_preference", "first_name"],
        LifeCategory::Home => &["living_situation", "time_at_location", "city", "state", "country"],
        LifeCategory::Work => &["employment_type", "occupation", "company", "time_in_role"],
        LifeCategory::Money => &[
            "household_income",
            "savings_retirement",
            "assets_equity",
            "consumer_debt",
        ],
        LifeCategory::Stuff => &["lifestyle_category", "vehicles", "items"],
        LifeCategory::Giving => &["volunteer_status", "charitable_giving", "legacy_mindset"],
        LifeCategory::Spirituality => &[
            "spiritual_practice",
            "meditation_frequency",
            "personal_growth_focus",
        ],
    }
}

/// Projects `profile` onto the category's fields, keeping the field-list order.
///
/// Null and empty-string values are dropped here; the flattener handles the
/// rest. A custom category gets the whole record back, since there is no
/// narrower selection to apply.
pub fn extract_category_profile(category: &CategoryKey, profile: &ProfileRecord) -> ProfileRecord {
    if matches!(category, CategoryKey::Custom(_)) {
        return profile.clone();
    }

    category_profile_fields(category)
        .iter()
        .filter_map(|field| {
            let value = profile.get(*field)?;
            match value {
                Value::Null => None,
                Value::String(s) if s.trim().is_empty() => None,
                _ => Some((field.to_string(), value.clone())),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::flatten::{flatten_structured, FlattenOptions};
    use serde_json::json;

    fn profile() -> ProfileRecord {
        match json!({
            "id": "abc",
            "first_name": "Maya",
            "partner_name": "Sam",
            "relationship_status": "married",
            "relationship_length": "",
            "hobbies": ["climbing", "pottery"],
            "exercise_frequency": null,
            "city": "Denver"
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_love_fields_in_list_order() {
        let love = CategoryKey::Life(LifeCategory::Love);
        let selected = extract_category_profile(&love, &profile());
        let keys: Vec<&str> = selected.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["relationship_status", "partner_name"]);
    }

    #[test]
    fn test_missing_and_null_fields_are_skipped() {
        let health = CategoryKey::Life(LifeCategory::Health);
        assert!(extract_category_profile(&health, &profile()).is_empty());
    }

    #[test]
    fn test_custom_category_keeps_whole_profile() {
        let custom = CategoryKey::parse("pets");
        assert!(category_profile_fields(&custom).is_empty());
        assert_eq!(extract_category_profile(&custom, &profile()).len(), profile().len());
    }

    #[test]
    fn test_every_life_category_has_fields() {
        for category in LifeCategory::ALL {
            assert!(!category_profile_fields(&CategoryKey::Life(category)).is_empty());
        }
    }

    #[test]
    fn test_selected_profile_flattens() {
        let fun = CategoryKey::Life(LifeCategory::Fun);
        let selected = extract_category_profile(&fun, &profile());
        assert_eq!(
            flatten_structured(&selected, &FlattenOptions::default()),
            "- hobbies: climbing, pottery"
        );
    }
}
