//! Metadata extraction from an activity's labelled detail lines.
//!
//! The search index stores structured details as Markdown list items inside
//! `search_text`:
//!
//! ```text
//! - **time:** 10-15 min
//! - **type:** Fun Games
//! - **no. people:** 8+
//! - **exertion:** High
//! ```
//!
//! Extraction is total: every field falls back to a fixed default when its
//! label is absent, so `extract` never fails.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::activity::ActivityRecord;

pub const TIME_LABEL: &str = "- **time:**";
pub const TYPE_LABEL: &str = "- **type:**";
pub const GROUP_SIZE_LABEL: &str = "- **no. people:**";
pub const EXERTION_LABEL: &str = "- **exertion:**";

pub const DEFAULT_TIME: &str = "10-15 min";
pub const DEFAULT_TYPE: &str = "Unknown";
pub const DEFAULT_GROUP_SIZE: &str = "Any";
pub const DEFAULT_EXERTION: &str = "Moderate";

/// URL segment used for activity types missing from the category table.
pub const DEFAULT_CATEGORY: &str = "activities";

/// Typed view of an activity's details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityMetadata {
    pub title: String,
    pub slug: String,
    pub url: String,
    pub time: String,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub group_size: String,
    pub exertion: String,
}

/// Mapping from normalized activity type to URL path segment.
#[derive(Debug, Clone)]
pub struct CategoryMap {
    segments: HashMap<String, String>,
}

impl CategoryMap {
    /// An empty table: every type resolves to [`DEFAULT_CATEGORY`].
    pub fn empty() -> Self {
        Self {
            segments: HashMap::new(),
        }
    }

    /// Add or replace a mapping. The type key is normalized on insert.
    pub fn insert(&mut self, activity_type: &str, segment: impl Into<String>) {
        self.segments
            .insert(normalize_type(activity_type), segment.into());
    }

    /// Extend the table with overrides, e.g. from configuration.
    pub fn with_overrides<'a, I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (activity_type, segment) in overrides {
            self.insert(activity_type, segment.clone());
        }
        self
    }

    /// Resolve the URL segment for an activity type.
    pub fn segment_for(&self, activity_type: &str) -> &str {
        self.segments
            .get(&normalize_type(activity_type))
            .map(String::as_str)
            .unwrap_or(DEFAULT_CATEGORY)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl Default for CategoryMap {
    fn default() -> Self {
        let mut map = Self::empty();
        for (activity_type, segment) in [
            ("icebreaker", "icebreakers"),
            ("icebreakers", "icebreakers"),
            ("name games", "name-games"),
            ("fun games", "fun-games"),
            ("energiser", "energisers"),
            ("energisers", "energisers"),
            ("energizer", "energisers"),
            ("energizers", "energisers"),
            ("team building", "team-building"),
            ("trust building", "trust-building"),
            ("trust", "trust-building"),
            ("problem solving", "problem-solving"),
            ("communication", "communication"),
            ("reflection", "reflection"),
            ("debrief", "reflection"),
        ] {
            map.insert(activity_type, segment);
        }
        map
    }
}

fn normalize_type(activity_type: &str) -> String {
    activity_type.trim().to_lowercase()
}

/// Find the first line containing `label` and return the trimmed text after it.
fn labelled_value<'a>(search_text: &'a str, label: &str) -> Option<&'a str> {
    search_text
        .lines()
        .find_map(|line| line.find(label).map(|at| line[at + label.len()..].trim()))
        .filter(|value| !value.is_empty())
}

/// Build the public URL of an activity page.
pub fn activity_url(site_url: &str, category: &str, slug: &str) -> String {
    format!("{}/{}/{}/", site_url.trim_end_matches('/'), category, slug)
}

/// Extract typed metadata from an activity record.
pub fn extract(record: &ActivityRecord, categories: &CategoryMap, site_url: &str) -> ActivityMetadata {
    let text = record.search_text.as_str();
    let activity_type = labelled_value(text, TYPE_LABEL).unwrap_or(DEFAULT_TYPE);

    ActivityMetadata {
        title: record.title.clone(),
        slug: record.slug.clone(),
        url: activity_url(site_url, categories.segment_for(activity_type), &record.slug),
        time: labelled_value(text, TIME_LABEL).unwrap_or(DEFAULT_TIME).to_string(),
        activity_type: activity_type.to_string(),
        group_size: labelled_value(text, GROUP_SIZE_LABEL)
            .unwrap_or(DEFAULT_GROUP_SIZE)
            .to_string(),
        exertion: labelled_value(text, EXERTION_LABEL)
            .unwrap_or(DEFAULT_EXERTION)
            .to_string(),
    }
}
