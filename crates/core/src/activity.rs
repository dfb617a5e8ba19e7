//! Activity domain types.
//!
//! An activity is a single facilitator-run group exercise. The corpus of
//! activities is loaded once and never mutated, so these are plain value
//! objects.

use serde::{Deserialize, Deserializer, Serialize};

/// A single activity record as stored in the search index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Opaque identifier (string or number in the source document)
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,

    /// Display name
    pub title: String,

    /// URL-safe unique key
    pub slug: String,

    /// Full Markdown description
    #[serde(default)]
    pub content: String,

    /// Denormalized text used for scoring: content plus detail lines
    #[serde(default)]
    pub search_text: String,
}

impl ActivityRecord {
    /// Convenience constructor, mostly for tests and fixtures.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        slug: impl Into<String>,
        content: impl Into<String>,
        search_text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            slug: slug.into(),
            content: content.into(),
            search_text: search_text.into(),
        }
    }
}

/// An activity paired with its relevance score for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoredResult<'a> {
    pub activity: &'a ActivityRecord,
    pub score: u32,
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_string_and_numeric_ids() {
        let json = r#"[
            {"id": "a1", "title": "Tag", "slug": "tag", "content": "c", "search_text": "s"},
            {"id": 42, "title": "Zip Zap", "slug": "zip-zap", "content": "c", "search_text": "s"}
        ]"#;
        let records: Vec<ActivityRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records[0].id, "a1");
        assert_eq!(records[1].id, "42");
    }

    #[test]
    fn missing_text_fields_default_to_empty() {
        let json = r#"{"id": "1", "title": "Tag", "slug": "tag"}"#;
        let record: ActivityRecord = serde_json::from_str(json).unwrap();
        assert!(record.content.is_empty());
        assert!(record.search_text.is_empty());
    }

    #[test]
    fn serializes_with_snake_case_search_text() {
        let record = ActivityRecord::new("1", "Tag", "tag", "c", "fun tag game");
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"search_text\":\"fun tag game\""));
    }
}
