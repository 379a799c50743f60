//! The data a word provider hands back for a single lookup.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// A center word and the words related to it.
///
/// Missing fields deserialize as empty so a sloppy provider degrades to
/// "no related words" rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPayload {
    /// Display form of the looked-up word.
    #[serde(default)]
    pub word: String,

    /// Related words in provider order.
    #[serde(default, alias = "related_words")]
    pub related: Vec<String>,
}

impl WordPayload {
    pub fn new(word: impl Into<String>, related: Vec<String>) -> Self {
        Self {
            word: word.into(),
            related,
        }
    }

    /// A payload with no related words.
    pub fn empty(word: impl Into<String>) -> Self {
        Self::new(word, Vec::new())
    }

    /// Builds a payload from arbitrary JSON without ever failing.
    ///
    /// A missing or non-string `word` falls back to `requested`. The related
    /// list is read from `related` or, for dictionary rows, `related_words`.
    /// A missing, null or non-array list becomes empty, and non-string
    /// entries are skipped.
    pub fn from_value(value: &Value, requested: &str) -> Self {
        let Some(obj) = value.as_object() else {
            warn!("Malformed word payload for {:?}: not an object", requested);
            return Self::empty(requested);
        };

        let word = obj
            .get("word")
            .and_then(Value::as_str)
            .filter(|w| !w.trim().is_empty())
            .unwrap_or(requested)
            .to_string();

        let related = match obj.get("related").or_else(|| obj.get("related_words")) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(_) => {
                warn!("Malformed related list for {:?}, treating as empty", requested);
                Vec::new()
            }
        };

        Self { word, related }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_missing_fields() {
        let payload: WordPayload = serde_json::from_str("{}").unwrap();
        assert_eq!(payload, WordPayload::default());

        let payload: WordPayload = serde_json::from_str(r#"{"word":"kitap"}"#).unwrap();
        assert_eq!(payload.word, "kitap");
        assert!(payload.related.is_empty());
    }

    #[test]
    fn test_from_value_well_formed() {
        let value = json!({ "word": "kitap", "related": ["roman", "yazar"] });
        let payload = WordPayload::from_value(&value, "kitap");
        assert_eq!(payload.related, vec!["roman", "yazar"]);
    }

    #[test]
    fn test_from_value_malformed() {
        let payload = WordPayload::from_value(&json!("nonsense"), "kitap");
        assert_eq!(payload, WordPayload::empty("kitap"));

        let payload = WordPayload::from_value(&json!({ "related": "roman" }), "kitap");
        assert_eq!(payload.word, "kitap");
        assert!(payload.related.is_empty());

        let payload = WordPayload::from_value(&json!({ "related": ["roman", 7, null] }), "kitap");
        assert_eq!(payload.related, vec!["roman"]);
    }

    #[test]
    fn test_from_value_dictionary_row() {
        let row = json!({ "word": "Kitap", "related_words": ["roman"] });
        let payload = WordPayload::from_value(&row, "");
        assert_eq!(payload, WordPayload::new("Kitap", vec!["roman".to_string()]));

        let payload = WordPayload::from_value(&json!({ "word": "yazar", "related_words": null }), "");
        assert_eq!(payload, WordPayload::empty("yazar"));

        let payload = WordPayload::from_value(&json!({ "related_words": ["roman"] }), "");
        assert!(payload.word.is_empty());
    }
}
