pub mod doctor;
pub mod prompt;
pub mod search;
pub mod serve;
pub mod show;

use std::path::Path;

use huddle_config::AppConfig;
use huddle_core::metadata::CategoryMap;

/// Load configuration from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load_with(path).map_err(config_error)?)
}

fn config_error(e: huddle_config::ConfigError) -> huddle_core::Error {
    huddle_core::Error::Config { message: e.to_string() }
}

/// The category table with configured overrides applied.
pub fn categories(config: &AppConfig) -> CategoryMap {
    CategoryMap::default().with_overrides(&config.catalog.categories)
}
