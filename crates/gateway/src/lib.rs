//! HTTP API gateway for Huddle.
//!
//! Exposes the activity search, deep-link lookup and the four generation
//! endpoints as a JSON API, plus a health check.
//!
//! Built on Axum.

pub mod api;

use axum::extract::DefaultBodyLimit;
use axum::{Router, extract::State, response::Json, routing::get};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use huddle_catalog::ActivityCatalog;
use huddle_config::AppConfig;
use huddle_core::metadata::CategoryMap;
use huddle_core::provider::Provider;
use huddle_prompts::{PromptAssembler, TemplateStore};

/// Maximum accepted request body.
pub const BODY_LIMIT: usize = 1024 * 1024;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub catalog: Arc<ActivityCatalog>,
    pub assembler: Arc<PromptAssembler>,
    pub provider: Arc<dyn Provider>,
    pub categories: CategoryMap,
    pub site_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub start_time: chrono::DateTime<chrono::Utc>,
}

pub type SharedState = Arc<GatewayState>;

impl GatewayState {
    /// Wire the catalog, template store and assembler described by `config`
    /// around an already-built provider.
    pub fn from_config(config: &AppConfig, provider: Arc<dyn Provider>) -> Self {
        let catalog = Arc::new(ActivityCatalog::from_path(&config.catalog.path));
        let store = Arc::new(TemplateStore::from_dir(
            &config.prompts.dir,
            config.prompts.extension.clone(),
            config.prompts.mode,
        ));
        let categories = CategoryMap::default().with_overrides(&config.catalog.categories);
        let assembler = Arc::new(
            PromptAssembler::new(store, catalog.clone(), config.catalog.site_url.clone())
                .with_categories(categories.clone()),
        );

        Self {
            catalog,
            assembler,
            provider,
            categories,
            site_url: config.catalog.site_url.clone(),
            model: config.provider.model.clone(),
            temperature: config.generation.temperature,
            max_tokens: config.generation.max_tokens,
            start_time: chrono::Utc::now(),
        }
    }
}

/// Build the Axum router with all gateway routes.
///
/// Layers applied:
/// - Request body size limit (1 MB)
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state.clone())
        .nest("/api", api::api_router(state))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let provider = huddle_providers::build_from_config(&config);
    let state = Arc::new(GatewayState::from_config(&config, provider));

    // Warm the corpus so the first search does not pay for the read.
    let corpus = state.catalog.load().await;
    info!(activities = corpus.len(), mode = %state.assembler.store().mode(), "Catalog ready");

    let mut app = build_router(state);
    if config.gateway.permissive_cors {
        app = app.layer(CorsLayer::permissive());
    }

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    activities: usize,
    uptime_secs: i64,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    let activities = state.catalog.load().await.len();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        activities,
        uptime_secs: (chrono::Utc::now() - state.start_time).num_seconds(),
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;
    use huddle_config::PromptMode;
    use huddle_core::activity::ActivityRecord;
    use huddle_core::error::ProviderError;
    use huddle_core::message::Message;
    use huddle_core::provider::{ProviderRequest, ProviderResponse, Usage};
    use std::sync::Mutex;

    /// Mock provider that echoes a fixed reply and records requests.
    pub struct MockProvider {
        reply: Result<String, ProviderError>,
        pub seen: Mutex<Vec<ProviderRequest>>,
    }

    impl MockProvider {
        pub fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(error: ProviderError) -> Self {
            Self {
                reply: Err(error),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Provider for MockProvider {
        fn name(&self) -> &str {
            "gateway_mock"
        }

        async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            self.seen.lock().unwrap().push(request);
            let text = self.reply.clone()?;
            Ok(ProviderResponse {
                message: Message::assistant(text),
                usage: Some(Usage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                    total_tokens: 15,
                }),
                model: "mock-model".into(),
            })
        }
    }

    pub const FRAGMENTS: &[(&str, &str)] = &[
        ("shared-context", "You help facilitators."),
        ("adapt-activity-system", "Adapt activities."),
        ("adapt-activity-user", "{{activity_content}}\n{{adaptations_list}}"),
        ("build-program-system", "Build programs."),
        ("build-program-user", "{{group_size}} / {{group_stage}}\n{{activity_catalog}}"),
        ("debrief-questions-system", "Write debriefs."),
        ("debrief-questions-user", "{{debrief_focus}}: {{activity_content}}"),
        ("before-after-system", "Sequence activities."),
        ("before-after-user", "{{sequence_type}} {{activity_content}}"),
    ];

    pub fn activities() -> Vec<ActivityRecord> {
        vec![
            ActivityRecord::new(
                "1",
                "Tag",
                "tag",
                "Chase each other.",
                "fun tag game\n- **time:** 10 min\n- **type:** fun games",
            ),
            ActivityRecord::new("2", "Human Knot", "human-knot", "Untangle.", "knot trust\n- **type:** Problem Solving"),
        ]
    }

    /// A state backed by a temp prompt directory and an in-memory corpus.
    pub fn state_with(provider: Arc<dyn Provider>, dir: &std::path::Path) -> SharedState {
        for (name, text) in FRAGMENTS {
            std::fs::write(dir.join(format!("{name}.md")), text).unwrap();
        }
        let catalog = Arc::new(ActivityCatalog::from_records(activities()));
        let store = Arc::new(TemplateStore::from_dir(dir, "md", PromptMode::Production));
        let assembler = Arc::new(PromptAssembler::new(store, catalog.clone(), "https://x.test"));

        Arc::new(GatewayState {
            catalog,
            assembler,
            provider,
            categories: CategoryMap::default(),
            site_url: "https://x.test".into(),
            model: "mock-model".into(),
            temperature: 0.7,
            max_tokens: 4000,
            start_time: chrono::Utc::now(),
        })
    }
}
