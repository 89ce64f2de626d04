//! Answer value model and key normalization
//!
//! A response document is a mapping from question key to answer value. A
//! value is either a single string (single-choice, free text) or an ordered
//! list of strings (multi-choice). Comment companions are stored under
//! `<key>_comment` alongside their question.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A response document's answers, keyed by question key
pub type AnswerMap = BTreeMap<String, AnswerValue>;

/// A single answer: one string or an ordered list of strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    One(String),
    Many(Vec<String>),
}

impl AnswerValue {
    /// Empty values are treated as "no answer" throughout aggregation,
    /// funnel computation, and export.
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::One(s) => s.is_empty(),
            AnswerValue::Many(v) => v.is_empty(),
        }
    }

    /// The value as a list of selected options; a scalar becomes a
    /// single-element slice.
    pub fn as_list(&self) -> std::slice::Iter<'_, String> {
        match self {
            AnswerValue::One(s) => std::slice::from_ref(s).iter(),
            AnswerValue::Many(v) => v.iter(),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(s: &str) -> Self {
        AnswerValue::One(s.to_string())
    }
}

impl From<Vec<&str>> for AnswerValue {
    fn from(v: Vec<&str>) -> Self {
        AnswerValue::Many(v.into_iter().map(str::to_string).collect())
    }
}

/// Strip the legacy position prefix (`Q11_misleading_content` →
/// `misleading_content`).
///
/// Early response documents were written with keys prefixed by the
/// question's position in the form. Normalization happens once at
/// ingestion (document write and snapshot load); no read site carries a
/// prefixed-key fallback.
pub fn normalize_key(key: &str) -> &str {
    let rest = match key.strip_prefix('Q') {
        Some(rest) => rest,
        None => return key,
    };

    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return key;
    }

    match rest[digits..].strip_prefix('_') {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => key,
    }
}

/// Normalize every key of an answer map.
///
/// When a document carries both a legacy and a flat spelling of the same
/// key, the flat spelling wins.
pub fn normalize_answers(answers: AnswerMap) -> AnswerMap {
    let mut out = AnswerMap::new();

    // Legacy keys first so flat spellings overwrite them
    let (legacy, flat): (Vec<_>, Vec<_>) = answers
        .into_iter()
        .partition(|(k, _)| normalize_key(k) != k.as_str());

    for (key, value) in legacy.into_iter().chain(flat) {
        out.insert(normalize_key(&key).to_string(), value);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key_strips_position_prefix() {
        assert_eq!(normalize_key("Q11_misleading_content"), "misleading_content");
        assert_eq!(normalize_key("Q1_grade"), "grade");
        assert_eq!(
            normalize_key("Q11_misleading_content_comment"),
            "misleading_content_comment"
        );
    }

    #[test]
    fn test_normalize_key_leaves_flat_keys_alone() {
        assert_eq!(normalize_key("grade"), "grade");
        assert_eq!(normalize_key("question_authenticity"), "question_authenticity");
        // Not a position prefix
        assert_eq!(normalize_key("Q_grade"), "Q_grade");
        assert_eq!(normalize_key("Q12"), "Q12");
        assert_eq!(normalize_key("Q12_"), "Q12_");
    }

    #[test]
    fn test_normalize_answers() {
        let mut map = AnswerMap::new();
        map.insert("Q1_grade".into(), "Grade 11".into());
        map.insert("district".into(), "Colombo".into());
        map.insert(
            "Q9_ethics_meaning".into(),
            AnswerValue::from(vec!["Honest", "Fair"]),
        );

        let normalized = normalize_answers(map);
        assert_eq!(normalized.get("grade"), Some(&"Grade 11".into()));
        assert_eq!(normalized.get("district"), Some(&"Colombo".into()));
        assert_eq!(
            normalized.get("ethics_meaning"),
            Some(&AnswerValue::from(vec!["Honest", "Fair"]))
        );
        assert!(!normalized.contains_key("Q1_grade"));
    }

    #[test]
    fn test_flat_spelling_wins_over_legacy() {
        let mut map = AnswerMap::new();
        map.insert("Q1_grade".into(), "Grade 10".into());
        map.insert("grade".into(), "Grade 13".into());

        let normalized = normalize_answers(map);
        assert_eq!(normalized.get("grade"), Some(&"Grade 13".into()));
    }

    #[test]
    fn test_untagged_serde_round_trip() {
        let mut map = AnswerMap::new();
        map.insert("grade".into(), "Grade 11".into());
        map.insert(
            "social_platforms".into(),
            AnswerValue::from(vec!["Facebook", "TikTok"]),
        );

        let json = serde_json::to_string(&map).unwrap();
        assert!(json.contains("\"grade\":\"Grade 11\""));
        assert!(json.contains("[\"Facebook\",\"TikTok\"]"));

        let back: AnswerMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
