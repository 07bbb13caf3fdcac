use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A structured profile record: ordered attribute name → raw JSON value.
pub type ProfileRecord = Map<String, Value>;

/// One answered assessment question.
///
/// Every field is optional. Assessment rows arrive with inconsistent shapes, so
/// pairs are built leniently via [`QaPair::from_value`] and absent fields are
/// simply left out when flattened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QaPair {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
}

const QUESTION_KEYS: &[&str] = &["question", "question_text", "prompt"];
const ANSWER_KEYS: &[&str] = &["answer", "response", "response_text", "answer_text", "response_value"];
const STATUS_KEYS: &[&str] = &["status", "green_line"];
const SCORE_KEYS: &[&str] = &["score", "response_value"];

impl QaPair {
    #[cfg(test)]
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: Some(question.into()),
            answer: Some(answer.into()),
            ..Self::default()
        }
    }

    /// Builds a pair from any JSON value without failing.
    ///
    /// Objects are searched for the usual question/answer/score/status key
    /// spellings; a bare string is treated as an answer; anything else yields an
    /// empty pair.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self {
                question: first_text(map, QUESTION_KEYS),
                answer: first_text(map, ANSWER_KEYS),
                category: first_text(map, &["category"]),
                score: SCORE_KEYS
                    .iter()
                    .filter_map(|k| map.get(*k))
                    .find_map(Value::as_f64)
                    .filter(|s| s.is_finite()),
                status: first_text(map, STATUS_KEYS),
            },
            Value::String(s) if !s.trim().is_empty() => Self {
                answer: Some(s.trim().to_string()),
                ..Self::default()
            },
            _ => Self::default(),
        }
    }

    /// True when neither a question nor an answer is present.
    pub fn is_blank(&self) -> bool {
        is_blank(self.question.as_deref()) && is_blank(self.answer.as_deref())
    }
}

fn is_blank(s: Option<&str>) -> bool {
    s.map_or(true, |s| s.trim().is_empty())
}

/// First key whose value renders as non-empty text. Numbers and bools count.
fn first_text(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().filter_map(|k| map.get(*k)).find_map(|v| match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}
