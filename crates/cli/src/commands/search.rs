//! `huddle search`: Rank activities for a query.

use std::fmt::Write;

use huddle_catalog::{ActivityCatalog, MIN_QUERY_CHARS};
use huddle_config::AppConfig;
use huddle_core::metadata;

pub async fn run(config: &AppConfig, query: &str, limit: usize, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    print!("{}", render(config, query, limit, json).await?);
    Ok(())
}

/// Build the command output. An empty or unreadable corpus yields no matches.
async fn render(config: &AppConfig, query: &str, limit: usize, json: bool) -> Result<String, serde_json::Error> {
    let catalog = ActivityCatalog::from_path(&config.catalog.path);
    let corpus = catalog.load().await;

    let categories = super::categories(config);
    let results = corpus.search(query);
    let shown = &results[..results.len().min(limit)];

    if json {
        let rows: Vec<serde_json::Value> = shown
            .iter()
            .map(|r| {
                serde_json::json!({
                    "score": r.score,
                    "activity": r.activity,
                    "metadata": metadata::extract(r.activity, &categories, &config.catalog.site_url),
                })
            })
            .collect();
        return Ok(format!("{}\n", serde_json::to_string_pretty(&rows)?));
    }

    if query.trim().chars().count() < MIN_QUERY_CHARS {
        return Ok(format!("Query must be at least {MIN_QUERY_CHARS} characters.\n"));
    }
    if results.is_empty() {
        return Ok(format!("No activities match \"{query}\".\n"));
    }

    let mut out = format!("{} match(es) for \"{query}\", showing {}:\n\n", results.len(), shown.len());
    for result in shown {
        let meta = metadata::extract(result.activity, &categories, &config.catalog.site_url);
        let _ = writeln!(out, "  {:>4}  {}", result.score, meta.title);
        let _ = writeln!(out, "        {} · {} · {}", meta.time, meta.activity_type, meta.url);
    }
    Ok(out)
}
