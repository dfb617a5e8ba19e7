//! `huddle prompt`: Render the prompts a generation feature would send.

use std::sync::Arc;

use huddle_catalog::ActivityCatalog;
use huddle_config::AppConfig;
use huddle_prompts::{Feature, PromptAssembler, TemplateStore, Variables};

pub async fn run(config: &AppConfig, feature: &str, vars: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let feature: Feature = feature.parse()?;
    let variables = parse_vars(vars)?;

    let catalog = Arc::new(ActivityCatalog::from_path(&config.catalog.path));
    let store = Arc::new(TemplateStore::from_dir(
        &config.prompts.dir,
        config.prompts.extension.clone(),
        config.prompts.mode,
    ));
    let assembler = PromptAssembler::new(store, catalog, config.catalog.site_url.clone())
        .with_categories(super::categories(config));

    let prompt = assembler.build_prompt(feature, variables).await?;

    println!("=== system ({feature}) ===");
    println!("{}", prompt.system_prompt);
    println!();
    println!("=== user ({feature}) ===");
    println!("{}", prompt.user_prompt);

    Ok(())
}

/// Parse repeated `key=value` arguments. The value may itself contain `=`.
fn parse_vars(vars: &[String]) -> Result<Variables, String> {
    let mut variables = Variables::new();
    for var in vars {
        let (key, value) = var
            .split_once('=')
            .ok_or_else(|| format!("Invalid --var '{var}', expected KEY=VALUE"))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("Invalid --var '{var}', key is empty"));
        }
        variables.set(key, value);
    }
    Ok(variables)
}
