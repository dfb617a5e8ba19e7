//! `huddle doctor`: Diagnose system health.

use std::path::Path;

use huddle_catalog::ActivityCatalog;
use huddle_config::{AppConfig, CONFIG_FILE};
use huddle_prompts::{DirectorySource, Feature, FragmentSource, assembler::SHARED_CONTEXT, template};

pub async fn run(config: &AppConfig, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Huddle Doctor: System Diagnostics");
    println!("=====================================\n");

    let mut issues = 0;

    // Config
    let config_path = config_path.unwrap_or(Path::new(CONFIG_FILE));
    if config_path.exists() {
        println!("  ✅ Config file valid ({})", config_path.display());
    } else {
        println!("  ⚠️  No config file at {}, using defaults", config_path.display());
    }

    // API key and upstream
    if config.has_api_key() {
        println!("  ✅ API key configured for {}", config.provider.name);
    } else {
        println!("  ⚠️  No API key, set HUDDLE_API_KEY or OPENAI_API_KEY");
        issues += 1;
    }
    let provider = huddle_providers::build_from_config(config);
    match provider.health_check().await {
        Ok(true) => println!("  ✅ Provider {} reachable", provider.name()),
        Ok(false) => {
            println!("  ⚠️  Provider {} answered but refused the model listing", provider.name());
            issues += 1;
        }
        Err(e) => {
            println!("  ❌ Provider {} unreachable: {e}", provider.name());
            issues += 1;
        }
    }

    // Corpus
    let catalog = ActivityCatalog::from_path(&config.catalog.path);
    let corpus = catalog.load().await;
    if corpus.is_empty() {
        println!("  ❌ No activities loaded from {}", config.catalog.path.display());
        issues += 1;
    } else {
        println!("  ✅ {} activities in {}", corpus.len(), config.catalog.path.display());
    }

    // Prompt fragments
    let source = DirectorySource::new(&config.prompts.dir, config.prompts.extension.clone());
    let mut names = vec![SHARED_CONTEXT.to_string()];
    for feature in Feature::ALL {
        names.push(feature.system_fragment());
        names.push(feature.user_fragment());
    }
    let mut missing = Vec::new();
    for name in &names {
        if source.read(name).await.is_err() {
            missing.push(name.as_str());
        }
    }
    if missing.is_empty() {
        println!("  ✅ All {} prompt fragments present in {}", names.len(), source.describe());
    } else {
        println!("  ❌ Missing prompt fragments in {}: {}", source.describe(), missing.join(", "));
        issues += 1;
    }

    for feature in Feature::ALL {
        let Ok(text) = source.read(&feature.user_fragment()).await else {
            continue;
        };
        let unknown = unknown_placeholders(feature, &text);
        if !unknown.is_empty() {
            println!(
                "  ⚠️  {} uses placeholders that are never filled: {}",
                feature.user_fragment(),
                unknown.join(", ")
            );
            issues += 1;
        }
    }
    println!("  ℹ️  Prompt mode: {}", config.prompts.mode);

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

/// Placeholders in a user fragment that the feature never supplies. They
/// would reach the model verbatim.
fn unknown_placeholders(feature: Feature, text: &str) -> Vec<String> {
    let known = feature.placeholders();
    template::placeholders(text)
        .into_iter()
        .filter(|name| !known.contains(name))
        .map(str::to_string)
        .collect()
}
