//! Life categories: the closed set of topic keys with specialized prompt guidance.
//!
//! Any other key parses to `CategoryKey::Custom` and is served by the generic
//! builder, so every string maps to *some* prompt.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeCategory {
    Fun,
    Health,
    Travel,
    Love,
    Family,
    Social,
    Home,
    Work,
    Money,
    Stuff,
    Giving,
    Spirituality,
}

impl LifeCategory {
    pub const ALL: [LifeCategory; 12] = [
        LifeCategory::Fun,
        LifeCategory::Health,
        LifeCategory::Travel,
        LifeCategory::Love,
        LifeCategory::Family,
        LifeCategory::Social,
        LifeCategory::Home,
        LifeCategory::Work,
        LifeCategory::Money,
        LifeCategory::Stuff,
        LifeCategory::Giving,
        LifeCategory::Spirituality,
    ];

    pub fn key(self) -> &'static str {
        match self {
            LifeCategory::Fun => "fun",
            LifeCategory::Health => "health",
            LifeCategory::Travel => "travel",
            LifeCategory::Love => "love",
            LifeCategory::Family => "family",
            LifeCategory::Social => "social",
            LifeCategory::Home => "home",
            LifeCategory::Work => "work",
            LifeCategory::Money => "money",
            LifeCategory::Stuff => "stuff",
            LifeCategory::Giving => "giving",
            LifeCategory::Spirituality => "spirituality",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LifeCategory::Fun => "Fun",
            LifeCategory::Health => "Health",
            LifeCategory::Travel => "Travel",
            LifeCategory::Love => "Love",
            LifeCategory::Family => "Family",
            LifeCategory::Social => "Social",
            LifeCategory::Home => "Home",
            LifeCategory::Work => "Work",
            LifeCategory::Money => "Money",
            LifeCategory::Stuff => "Stuff",
            LifeCategory::Giving => "Giving",
            LifeCategory::Spirituality => "Spirituality",
        }
    }

    /// Matches a canonical key or one of its legacy aliases, case-insensitively.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase();
        if let Some(category) = Self::ALL.into_iter().find(|c| c.key() == key) {
            return Some(category);
        }
        let category = match key.as_str() {
            "recreation" => LifeCategory::Fun,
            "romance" => LifeCategory::Love,
            "friends" => LifeCategory::Social,
            "business" | "career" => LifeCategory::Work,
            "finances" => LifeCategory::Money,
            "possessions" => LifeCategory::Stuff,
            "contribution" => LifeCategory::Giving,
            _ => return None,
        };
        Some(category)
    }
}

/// A topic key as received from the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CategoryKey {
    Life(LifeCategory),
    Custom(String),
}

impl CategoryKey {
    /// Total: unknown keys become `Custom` with the trimmed input.
    pub fn parse(key: &str) -> Self {
        match LifeCategory::from_key(key) {
            Some(category) => CategoryKey::Life(category),
            None => CategoryKey::Custom(key.trim().to_string()),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            CategoryKey::Life(category) => category.key(),
            CategoryKey::Custom(key) => key,
        }
    }

    /// Display label. Custom keys are title-cased from snake/kebab case.
    pub fn label(&self) -> String {
        match self {
            CategoryKey::Life(category) => category.label().to_string(),
            CategoryKey::Custom(key) => {
                let label = key
                    .split(['_', '-', ' '])
                    .filter(|w| !w.is_empty())
                    .map(|w| {
                        let mut chars = w.chars();
                        match chars.next() {
                            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                            None => String::new(),
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" ");
                if label.is_empty() {
                    "This Area".to_string()
                } else {
                    label
                }
            }
        }
    }
}

/// Thematic framing a specialized builder embeds in its prompt.
#[derive(Debug, Clone)]
pub struct CategoryGuidance {
    pub emotional_target: &'static str,
    pub framing: &'static str,
    pub example_phrasings: Vec<&'static str>,
}

/// Returns the specialized guidance for a life category.
pub fn get_category_guidance(category: LifeCategory) -> CategoryGuidance {
    match category {
        LifeCategory::Fun => CategoryGuidance {
            emotional_target: "Permission and lightness - fun is allowed without justification",
            framing: "play, hobbies, spontaneity and the moments that make them laugh",
            example_phrasings: vec![
                "Describe a Saturday that feels like pure play",
                "Picture the hobby you lose track of time in",
            ],
        },
        LifeCategory::Health => CategoryGuidance {
            emotional_target: "Freedom of movement, energy, and enjoyment - my body supports my joy",
            framing: "energy, movement, rest and how their body feels through the day",
            example_phrasings: vec![
                "Describe waking up with energy to spare",
                "Picture the movement that feels like a reward",
            ],
        },
        LifeCategory::Travel => CategoryGuidance {
            emotional_target: "Expansion through experience - curiosity, wonder, and flow",
            framing: "places, cultures and the feeling of arriving somewhere new",
            example_phrasings: vec![
                "Describe stepping off the plane somewhere you have longed to see",
                "Picture the street you wander with nowhere to be",
            ],
        },
        LifeCategory::Love => CategoryGuidance {
            emotional_target: "Freedom to be fully myself - mutual allowance and passion without pressure",
            framing: "partnership, intimacy and the small rituals that keep two people close",
            example_phrasings: vec![
                "Describe an ordinary evening with your partner that feels extraordinary",
                "Picture how you greet each other at the end of the day",
            ],
        },
        LifeCategory::Family => CategoryGuidance {
            emotional_target: "Emotional freedom and joyful presence with the people closest to me",
            framing: "family dynamics, shared moments and the way the household feels",
            example_phrasings: vec![
                "Describe a family dinner where everyone lingers",
                "Picture a tradition your family looks forward to",
            ],
        },
        LifeCategory::Social => CategoryGuidance {
            emotional_target: "Freedom to be authentic - wanted for who I am",
            framing: "friendships, community and the energy of their favorite people",
            example_phrasings: vec![
                "Describe the friends you call first with good news",
                "Picture a gathering that leaves you energized",
            ],
        },
        LifeCategory::Home => CategoryGuidance {
            emotional_target: "Safety and ease - my home supports me",
            framing: "the spaces they live in and how those spaces support daily life",
            example_phrasings: vec![
                "Describe walking through your front door at the end of the day",
                "Picture the corner of your home where you feel most at peace",
            ],
        },
        LifeCategory::Work => CategoryGuidance {
            emotional_target: "Creative freedom and feeling valued - I choose how and when I create",
            framing: "meaningful work, impact and the rhythm of a fulfilling workday",
            example_phrasings: vec![
                "Describe a workday that ends with quiet satisfaction",
                "Picture the people you serve and the difference you make",
            ],
        },
        LifeCategory::Money => CategoryGuidance {
            emotional_target: "Freedom of choice - ease, spaciousness, and calm confidence",
            framing: "their relationship with money, security and generous choices",
            example_phrasings: vec![
                "Describe checking your accounts and feeling calm",
                "Picture a purchase you make with total ease",
            ],
        },
        LifeCategory::Stuff => CategoryGuidance {
            emotional_target: "Ease and enjoyment - things support my life",
            framing: "possessions, vehicles and objects that add joy and ease",
            example_phrasings: vec![
                "Describe an item you use every day that delights you",
                "Picture the car you drive on a sunny afternoon",
            ],
        },
        LifeCategory::Giving => CategoryGuidance {
            emotional_target: "Overflow - I give because I want to",
            framing: "contribution, generosity and the causes they feel called to",
            example_phrasings: vec![
                "Describe a moment of giving that lights you up",
                "Picture the impact your generosity has on someone",
            ],
        },
        LifeCategory::Spirituality => CategoryGuidance {
            emotional_target: "Freedom of alignment - soft knowing, trust, and presence",
            framing: "practice, connection and everyday moments of alignment",
            example_phrasings: vec![
                "Describe the quiet moment that connects you to something larger",
                "Picture your morning practice and how it sets the day",
            ],
        },
    }
}

/// Conversation starters for a category, with a generic set for custom keys.
pub fn seed_questions(category: &CategoryKey) -> [&'static str; 3] {
    match category {
        CategoryKey::Life(LifeCategory::Fun) => [
            "What activities reliably make you smile or laugh?",
            "When in the week is fun easiest to fit?",
            "Who do you love having fun with?",
        ],
        CategoryKey::Life(LifeCategory::Health) => [
            "What does peak physical health feel like in your body?",
            "What sorts of activities light you up and make you feel alive?",
            "How does movement feel in your body when it's flowing?",
        ],
        CategoryKey::Life(LifeCategory::Travel) => [
            "What do you love about exploring new places?",
            "What emotions do you feel while traveling?",
            "What cultures or destinations call to you?",
        ],
        CategoryKey::Life(LifeCategory::Love) => [
            "How do you want connection with your partner to feel?",
            "What simple ritual keeps you two close?",
            "What shared experiences light you up together?",
        ],
        CategoryKey::Life(LifeCategory::Family) => [
            "What does a happy, healthy family dynamic look like for you?",
            "How does it feel to grow together as a family?",
            "What moments with your family bring you the most joy?",
        ],
        CategoryKey::Life(LifeCategory::Social) => [
            "What kind of energy do you want in your friendships?",
            "What do you enjoy doing with your friends?",
            "How do you feel when you're around your favorite people?",
        ],
        CategoryKey::Life(LifeCategory::Home) => [
            "What does walking into your ideal home feel like?",
            "What spaces in your home bring you the most peace?",
            "How do you want your living space to support your best life?",
        ],
        CategoryKey::Life(LifeCategory::Work) => [
            "What does a day of fulfilling, meaningful work look like?",
            "What impact do you want to have on the people you serve?",
            "How do you want to show up to your work and colleagues?",
        ],
        CategoryKey::Life(LifeCategory::Money) => [
            "How do you want your relationship with money to feel?",
            "What simple weekly money ritual keeps things clear and calm?",
            "What would 'enough' look like right now?",
        ],
        CategoryKey::Life(LifeCategory::Stuff) => [
            "What material things would add joy and ease to your life?",
            "How do you want to feel about the things you own?",
            "What items would make your daily life more fun and effortless?",
        ],
        CategoryKey::Life(LifeCategory::Giving) => [
            "How do you want to contribute and make a difference?",
            "What causes or people do you feel called to support?",
            "What does giving back feel like when it's aligned and joyful?",
        ],
        CategoryKey::Life(LifeCategory::Spirituality) => [
            "How do you want to feel connected to something greater?",
            "What signs show you you're on the right path?",
            "How do you nurture your spiritual growth in everyday moments?",
        ],
        CategoryKey::Custom(_) => [
            "What's most important to you in this area of life?",
            "How do you want to feel in this area?",
            "What would make this area really come alive for you?",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_life_category_round_trips_through_its_key() {
        for category in LifeCategory::ALL {
            assert_eq!(LifeCategory::from_key(category.key()), Some(category));
            assert_eq!(CategoryKey::parse(category.key()), CategoryKey::Life(category));
        }
    }

    #[test]
    fn test_aliases_resolve() {
        assert_eq!(CategoryKey::parse("Romance"), CategoryKey::Life(LifeCategory::Love));
        assert_eq!(CategoryKey::parse(" business "), CategoryKey::Life(LifeCategory::Work));
        assert_eq!(CategoryKey::parse("possessions"), CategoryKey::Life(LifeCategory::Stuff));
    }

    #[test]
    fn test_unknown_key_is_custom() {
        assert_eq!(
            CategoryKey::parse("creative_projects"),
            CategoryKey::Custom("creative_projects".to_string())
        );
    }

    #[test]
    fn test_custom_label_is_title_cased() {
        assert_eq!(CategoryKey::parse("creative_projects").label(), "Creative Projects");
        assert_eq!(CategoryKey::parse("").label(), "This Area");
        assert_eq!(CategoryKey::parse("__").label(), "This Area");
        assert_eq!(CategoryKey::parse(" - _ ").label(), "This Area");
        assert_eq!(CategoryKey::parse("health").label(), "Health");
    }

    #[test]
    fn test_guidance_has_examples_for_every_category() {
        for category in LifeCategory::ALL {
            let guidance = get_category_guidance(category);
            assert!(!guidance.emotional_target.is_empty());
            assert!(guidance.example_phrasings.len() >= 2);
        }
    }

    #[test]
    fn test_custom_seed_questions_are_generic() {
        let questions = seed_questions(&CategoryKey::parse("pets"));
        assert!(questions[0].contains("this area of life"));
    }

    #[test]
    fn test_love_seed_questions_mention_ritual() {
        let questions = seed_questions(&CategoryKey::Life(LifeCategory::Love));
        assert!(questions.iter().any(|q| q.contains("ritual")));
    }
}
