//! Corpus loader for the activity search index, read once per process.
//!
//! The index is a single JSON array of activity records. The first successful
//! `load()` parses it and stores it in a `OnceCell`; every later call returns
//! the same `Arc<Corpus>` without touching disk.
//!
//! A missing or malformed file is not fatal: the failure is logged and an
//! empty corpus is returned. Failures are not cached, so the next call tries
//! the file again.

use huddle_core::activity::ActivityRecord;
use huddle_core::error::CatalogError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error, warn};

/// The immutable, indexed set of activities.
#[derive(Debug, Default)]
pub struct Corpus {
    activities: Vec<ActivityRecord>,
    by_slug: HashMap<String, usize>,
}

impl Corpus {
    /// Index records by slug. The first record wins when slugs repeat.
    pub fn new(activities: Vec<ActivityRecord>) -> Self {
        let mut by_slug = HashMap::with_capacity(activities.len());
        for (idx, activity) in activities.iter().enumerate() {
            if by_slug.contains_key(&activity.slug) {
                warn!(slug = %activity.slug, "Duplicate activity slug, keeping first");
                continue;
            }
            by_slug.insert(activity.slug.clone(), idx);
        }
        Self { activities, by_slug }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// All activities in corpus order.
    pub fn activities(&self) -> &[ActivityRecord] {
        &self.activities
    }

    /// Look up an activity by slug.
    pub fn get(&self, slug: &str) -> Option<&ActivityRecord> {
        self.by_slug.get(slug).map(|&idx| &self.activities[idx])
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

/// Owner of the process-wide corpus cache.
///
/// Create one per process and share it behind an `Arc`.
#[derive(Debug)]
pub struct ActivityCatalog {
    path: Option<PathBuf>,
    corpus: OnceCell<Arc<Corpus>>,
}

impl ActivityCatalog {
    /// A catalog backed by the JSON index at `path`. Nothing is read until
    /// the first `load()`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            corpus: OnceCell::new(),
        }
    }

    /// A catalog pre-populated with records (no backing file).
    pub fn from_records(records: Vec<ActivityRecord>) -> Self {
        Self {
            path: None,
            corpus: OnceCell::new_with(Some(Arc::new(Corpus::new(records)))),
        }
    }

    /// The backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether the corpus has been loaded successfully.
    pub fn is_loaded(&self) -> bool {
        self.corpus.initialized()
    }

    /// Return the corpus, reading the index on first use.
    pub async fn load(&self) -> Arc<Corpus> {
        if let Some(corpus) = self.corpus.get() {
            return corpus.clone();
        }

        let Some(path) = self.path.as_deref() else {
            return Arc::new(Corpus::empty());
        };

        match self.corpus.get_or_try_init(|| read_corpus(path)).await {
            Ok(corpus) => corpus.clone(),
            Err(e) => {
                error!(error = %e, "Error loading activities");
                Arc::new(Corpus::empty())
            }
        }
    }

    /// Deep-link lookup. `None` when the slug is unknown.
    pub async fn get_activity_by_slug(&self, slug: &str) -> Option<ActivityRecord> {
        self.load().await.get(slug).cloned()
    }
}

async fn read_corpus(path: &Path) -> Result<Arc<Corpus>, CatalogError> {
    let data = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CatalogError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let records: Vec<ActivityRecord> =
        serde_json::from_str(&data).map_err(|e| CatalogError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let total = records.len();
    let records: Vec<ActivityRecord> = records
        .into_iter()
        .filter(|r| {
            let valid = !r.title.trim().is_empty() && !r.slug.trim().is_empty();
            if !valid {
                warn!(id = %r.id, "Skipping activity without title or slug");
            }
            valid
        })
        .collect();

    debug!(
        path = %path.display(),
        count = records.len(),
        skipped = total - records.len(),
        "Activity corpus loaded"
    );
    Ok(Arc::new(Corpus::new(records)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const INDEX: &str = r#"[
        {"id": "1", "title": "Tag", "slug": "tag", "content": "Chase", "search_text": "fun tag game"},
        {"id": "2", "title": "Zip Zap Boing", "slug": "zip-zap-boing", "content": "Pass", "search_text": "energy"}
    ]"#;

    fn index_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn loads_index_from_disk() {
        let file = index_file(INDEX);
        let catalog = ActivityCatalog::from_path(file.path());
        assert!(!catalog.is_loaded());

        let corpus = catalog.load().await;
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.activities()[0].title, "Tag");
        assert!(catalog.is_loaded());
    }

    #[tokio::test]
    async fn second_load_does_not_touch_disk() {
        let file = index_file(INDEX);
        let path = file.path().to_path_buf();
        let catalog = ActivityCatalog::from_path(&path);

        let first = catalog.load().await;
        drop(file); // deletes the backing file

        let second = catalog.load().await;
        assert_eq!(second.len(), 2);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn missing_file_degrades_to_empty() {
        let catalog = ActivityCatalog::from_path("/nonexistent/activities.json");
        let corpus = catalog.load().await;
        assert!(corpus.is_empty());
        assert!(!catalog.is_loaded());
    }

    #[tokio::test]
    async fn malformed_json_degrades_to_empty() {
        let file = index_file("{ not json");
        let catalog = ActivityCatalog::from_path(file.path());
        assert!(catalog.load().await.is_empty());
    }

    #[tokio::test]
    async fn failed_load_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activities.json");
        let catalog = ActivityCatalog::from_path(&path);
        assert!(catalog.load().await.is_empty());

        std::fs::write(&path, INDEX).unwrap();
        assert_eq!(catalog.load().await.len(), 2);
    }

    #[tokio::test]
    async fn records_without_title_are_skipped() {
        let file = index_file(
            r#"[
                {"id": "1", "title": "", "slug": "blank", "search_text": ""},
                {"id": "2", "title": "Tag", "slug": "tag", "search_text": ""}
            ]"#,
        );
        let corpus = ActivityCatalog::from_path(file.path()).load().await;
        assert_eq!(corpus.len(), 1);
        assert!(corpus.get("blank").is_none());
    }

    #[tokio::test]
    async fn lookup_by_slug() {
        let catalog = ActivityCatalog::from_records(vec![
            ActivityRecord::new("1", "Tag", "tag", "", ""),
            ActivityRecord::new("2", "Zip Zap", "zip-zap", "", ""),
        ]);
        let found = catalog.get_activity_by_slug("zip-zap").await.unwrap();
        assert_eq!(found.title, "Zip Zap");
        assert!(catalog.get_activity_by_slug("nope").await.is_none());
        assert!(catalog.get_activity_by_slug("").await.is_none());
    }

    #[test]
    fn duplicate_slugs_keep_first() {
        let corpus = Corpus::new(vec![
            ActivityRecord::new("1", "First", "dup", "", ""),
            ActivityRecord::new("2", "Second", "dup", "", ""),
        ]);
        assert_eq!(corpus.get("dup").unwrap().title, "First");
        assert_eq!(corpus.len(), 2);
    }

    #[tokio::test]
    async fn catalog_without_path_is_empty() {
        let catalog = ActivityCatalog {
            path: None,
            corpus: OnceCell::new(),
        };
        assert!(catalog.load().await.is_empty());
    }
}
