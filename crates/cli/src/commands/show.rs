//! `huddle show`: Print one activity with its extracted details.

use std::fmt::Write;

use huddle_catalog::ActivityCatalog;
use huddle_config::AppConfig;
use huddle_core::metadata;

pub async fn run(config: &AppConfig, slug: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    print!("{}", render(config, slug, json).await?);
    Ok(())
}

/// An unknown slug is reported in the output, not as a failure.
async fn render(config: &AppConfig, slug: &str, json: bool) -> Result<String, serde_json::Error> {
    let catalog = ActivityCatalog::from_path(&config.catalog.path);
    let Some(activity) = catalog.get_activity_by_slug(slug).await else {
        return Ok(format!("Activity not found: {slug}\n"));
    };
    let meta = metadata::extract(&activity, &super::categories(config), &config.catalog.site_url);

    if json {
        let out = serde_json::json!({ "activity": activity, "metadata": meta });
        return Ok(format!("{}\n", serde_json::to_string_pretty(&out)?));
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", meta.title);
    let _ = writeln!(out, "{}", "=".repeat(meta.title.chars().count()));
    let _ = writeln!(out, "  Time:       {}", meta.time);
    let _ = writeln!(out, "  Type:       {}", meta.activity_type);
    let _ = writeln!(out, "  Group size: {}", meta.group_size);
    let _ = writeln!(out, "  Exertion:   {}", meta.exertion);
    let _ = writeln!(out, "  URL:        {}", meta.url);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", activity.content.trim_end());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_slug_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.catalog.path = dir.path().join("missing.json");

        let text = render(&config, "tag", false).await.unwrap();
        assert_eq!(text, "Activity not found: tag\n");
    }

    #[tokio::test]
    async fn known_slug_prints_details() {
        let dir = tempfile::tempdir().unwrap();
        let index = dir.path().join("index.json");
        std::fs::write(
            &index,
            r#"[{"id": "1", "title": "Tag", "slug": "tag", "content": "Chase.", "search_text": "- **exertion:** High"}]"#,
        )
        .unwrap();
        let mut config = AppConfig::default();
        config.catalog.path = index;

        let text = render(&config, "tag", false).await.unwrap();
        assert!(text.starts_with("Tag\n===\n"));
        assert!(text.contains("  Exertion:   High"));
        assert!(text.trim_end().ends_with("Chase."));
    }
}
