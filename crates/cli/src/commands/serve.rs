//! `huddle serve`: Start the HTTP API server.

use huddle_config::AppConfig;

pub async fn run(mut config: AppConfig, port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("🤝 Huddle Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Catalog:   {}", config.catalog.path.display());
    println!("   Prompts:   {} ({})", config.prompts.dir.display(), config.prompts.mode);
    println!("   Model:     {} via {}", config.provider.model, config.provider.name);

    huddle_gateway::start(config).await?;

    Ok(())
}
