//! Lexical search over the activity corpus.
//!
//! Scoring is a sum of independent integer signals:
//!
//! 1. `+20` when the lower-cased title contains the whole lower-cased query
//! 2. `+5` for each distinct query term found in the lower-cased title
//! 3. `+1` for each occurrence of a term, as typed, in the raw `search_text`
//!
//! Title matching ignores case; body counting does not. Activities scoring
//! zero are dropped, the rest are ordered by descending score (corpus order on
//! ties) and capped at [`MAX_RESULTS`].

use huddle_core::activity::{ActivityRecord, ScoredResult};

use crate::loader::{ActivityCatalog, Corpus};

/// Maximum number of results returned for any query.
pub const MAX_RESULTS: usize = 50;

/// Queries shorter than this (after trimming) return nothing.
pub const MIN_QUERY_CHARS: usize = 2;

pub const TITLE_PHRASE_WEIGHT: u32 = 20;
pub const TITLE_TERM_WEIGHT: u32 = 5;
pub const BODY_OCCURRENCE_WEIGHT: u32 = 1;

/// A query term, kept as typed for body counting and lower-cased for titles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm<'q> {
    pub raw: &'q str,
    pub lower: String,
}

/// Split a query into distinct whitespace-separated terms, in query order.
pub fn tokenize(query: &str) -> Vec<SearchTerm<'_>> {
    let mut terms: Vec<SearchTerm<'_>> = Vec::new();
    for raw in query.split_whitespace() {
        if terms.iter().any(|t| t.raw == raw) {
            continue;
        }
        terms.push(SearchTerm {
            raw,
            lower: raw.to_lowercase(),
        });
    }
    terms
}

/// Score one activity against a lower-cased phrase and its terms.
pub fn score(activity: &ActivityRecord, phrase_lower: &str, terms: &[SearchTerm<'_>]) -> u32 {
    let title_lower = activity.title.to_lowercase();
    let mut score = 0;

    if title_lower.contains(phrase_lower) {
        score += TITLE_PHRASE_WEIGHT;
    }

    for term in terms {
        if title_lower.contains(term.lower.as_str()) {
            score += TITLE_TERM_WEIGHT;
        }
    }

    for term in terms {
        let occurrences = activity.search_text.matches(term.raw).count() as u32;
        score += occurrences * BODY_OCCURRENCE_WEIGHT;
    }

    score
}

/// Rank `activities` for `query`.
pub fn search<'a>(query: &str, activities: &'a [ActivityRecord]) -> Vec<ScoredResult<'a>> {
    // Surrounding whitespace never affects ranking, including the phrase bonus.
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }

    let phrase_lower = query.to_lowercase();
    let terms = tokenize(query);

    let mut results: Vec<ScoredResult<'a>> = activities
        .iter()
        .map(|activity| ScoredResult {
            activity,
            score: score(activity, &phrase_lower, &terms),
        })
        .filter(|r| r.score > 0)
        .collect();

    // `sort_by` is stable, so equal scores keep corpus order.
    results.sort_by(|a, b| b.score.cmp(&a.score));
    results.truncate(MAX_RESULTS);

    tracing::debug!(query_len = query.len(), hits = results.len(), "Search complete");
    results
}

impl Corpus {
    /// Rank this corpus for `query`.
    pub fn search(&self, query: &str) -> Vec<ScoredResult<'_>> {
        search(query, self.activities())
    }
}

impl ActivityCatalog {
    /// Load the corpus if needed and return the ranked activities for `query`.
    pub async fn search_activities(&self, query: &str) -> Vec<ActivityRecord> {
        let corpus = self.load().await;
        corpus
            .search(query)
            .into_iter()
            .map(|r| r.activity.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_core::metadata::{self, CategoryMap};

    fn activity(title: &str, search_text: &str) -> ActivityRecord {
        let slug = title.to_lowercase().replace(' ', "-");
        ActivityRecord::new(slug.clone(), title, slug, "", search_text)
    }

    #[test]
    fn short_queries_return_nothing() {
        let corpus = vec![activity("A", "a a a")];
        assert!(search("", &corpus).is_empty());
        assert!(search("a", &corpus).is_empty());
        assert!(search("   a   ", &corpus).is_empty());
        assert!(search(" \t ", &corpus).is_empty());
    }

    #[test]
    fn tokenize_dedupes_and_keeps_case() {
        let terms = tokenize("Tag  tag Tag game");
        let raw: Vec<&str> = terms.iter().map(|t| t.raw).collect();
        assert_eq!(raw, vec!["Tag", "tag", "game"]);
        assert_eq!(terms[0].lower, "tag");
    }

    #[test]
    fn single_activity_end_to_end() {
        let corpus = vec![ActivityRecord::new(
            "1",
            "Tag",
            "tag",
            "",
            "fun tag game\n- **time:** 10 min\n- **type:** fun games",
        )];
        let results = search("tag", &corpus);
        assert_eq!(results.len(), 1);
        assert!(results[0].score >= 20 + 5 + 1);
        assert_eq!(results[0].score, 26);

        let meta = metadata::extract(results[0].activity, &CategoryMap::default(), "https://x.test");
        assert_eq!(meta.time, "10 min");
        assert_eq!(meta.activity_type, "fun games");
        assert_eq!(meta.group_size, "Any");
        assert_eq!(meta.exertion, "Moderate");
    }

    #[test]
    fn title_phrase_match_is_worth_exactly_twenty() {
        // Same title terms, only one contains the full phrase.
        let corpus = vec![activity("Zip Zap Boing", ""), activity("Zip Boing Zap", "")];
        let results = search("zap b", &corpus);
        assert_eq!(results[0].activity.title, "Zip Zap Boing");
        assert_eq!(results[0].score - results[1].score, TITLE_PHRASE_WEIGHT);
    }

    #[test]
    fn title_matching_ignores_case() {
        let corpus = vec![activity("Human Knot", "")];
        let results = search("HUMAN KNOT", &corpus);
        assert_eq!(results[0].score, 20 + 5 + 5);
    }

    #[test]
    fn body_counting_uses_term_as_typed() {
        let corpus = vec![activity("Tag", "tag tag Tag")];
        assert_eq!(search("Tag", &corpus)[0].score, 20 + 5 + 1);
        assert_eq!(search("tag", &corpus)[0].score, 20 + 5 + 2);
    }

    #[test]
    fn terms_are_literal_not_patterns() {
        let corpus = vec![activity("Puzzle", "c++ and c+ and cc")];
        let results = search("c++", &corpus);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 1);
    }

    #[test]
    fn zero_scores_are_dropped() {
        let corpus = vec![activity("Tag", "chase"), activity("Knots", "rope")];
        let results = search("rope", &corpus);
        assert_eq!(results.len(), 1);
        assert!(results.iter().all(|r| r.score > 0));
    }

    #[test]
    fn results_are_sorted_with_stable_ties() {
        let corpus = vec![
            activity("Alpha", "trust"),
            activity("Beta", "trust trust"),
            activity("Gamma", "trust"),
            activity("Trust Fall", ""),
        ];
        let results = search("trust", &corpus);
        let titles: Vec<&str> = results.iter().map(|r| r.activity.title.as_str()).collect();
        assert_eq!(titles, vec!["Trust Fall", "Beta", "Alpha", "Gamma"]);
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn results_are_capped() {
        let corpus: Vec<ActivityRecord> = (0..120)
            .map(|i| activity(&format!("Game {i}"), "circle"))
            .collect();
        let results = search("circle", &corpus);
        assert_eq!(results.len(), MAX_RESULTS);
        // All tie at 1, so the first fifty in corpus order survive.
        assert_eq!(results[0].activity.title, "Game 0");
        assert_eq!(results[49].activity.title, "Game 49");
    }

    #[test]
    fn repeated_runs_are_deterministic() {
        let corpus: Vec<ActivityRecord> = (0..30)
            .map(|i| activity(&format!("Energiser {i}"), if i % 3 == 0 { "energy energy" } else { "energy" }))
            .collect();
        let first: Vec<&str> = search("energy", &corpus).iter().map(|r| r.activity.slug.as_str()).collect();
        let second: Vec<&str> = search("energy", &corpus).iter().map(|r| r.activity.slug.as_str()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn corpus_search_delegates() {
        let corpus = Corpus::new(vec![activity("Tag", "tag")]);
        assert_eq!(corpus.search("tag").len(), 1);
        assert!(Corpus::empty().search("tag").is_empty());
    }

    #[tokio::test]
    async fn catalog_search_returns_owned_records() {
        let catalog = ActivityCatalog::from_records(vec![
            activity("Tag", "fun tag game"),
            activity("Zip Zap", "energy circle"),
        ]);
        let results = catalog.search_activities("circle").await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Zip Zap");
        assert!(catalog.search_activities("x").await.is_empty());
    }

    #[test]
    fn surrounding_whitespace_keeps_phrase_bonus() {
        let corpus = vec![activity("Tag", "fun tag game")];
        let padded = search("  tag ", &corpus);
        assert_eq!(padded[0].score, search("tag", &corpus)[0].score);
        assert_eq!(padded[0].score, 26);
    }
}
