//! Huddle CLI entry point.
//!
//! Commands:
//! - `serve`: Start the HTTP API server
//! - `search`: Rank activities for a query
//! - `show`: Print one activity with its extracted details
//! - `prompt`: Render the prompts a generation feature would send
//! - `doctor`: Diagnose configuration, corpus and prompt files

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "huddle",
    about = "Huddle: find, adapt and sequence group activities",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "HUDDLE_LOG_JSON")]
    log_json: bool,

    /// Config file (defaults to $HUDDLE_CONFIG or ./huddle.toml)
    #[arg(short, long, global = true, env = "HUDDLE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Search the activity catalog
    Search {
        /// Free-text query
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Maximum number of results to print
        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one activity by slug
    Show {
        slug: String,

        /// Print the activity and its metadata as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render the system and user prompt for a feature
    Prompt {
        /// adapt-activity, build-program, debrief-questions or before-after
        feature: String,

        /// Template variable as key=value (repeatable)
        #[arg(long = "var", value_name = "KEY=VALUE")]
        vars: Vec<String>,
    },

    /// Diagnose system health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so command output stays pipeable.
    let filter = if cli.verbose { "debug" } else { "info" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { port } => commands::serve::run(config, port).await?,
        Commands::Search { query, limit, json } => {
            commands::search::run(&config, &query.join(" "), limit, json).await?
        }
        Commands::Show { slug, json } => commands::show::run(&config, &slug, json).await?,
        Commands::Prompt { feature, vars } => commands::prompt::run(&config, &feature, &vars).await?,
        Commands::Doctor => commands::doctor::run(&config, cli.config.as_deref()).await?,
    }

    Ok(())
}
