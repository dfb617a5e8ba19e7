//! JSON API consumed by the activity finder UI.
//!
//! Endpoints (all under `/api`):
//!
//! - `POST /search`: ranked activity search
//! - `GET  /activity?slug=`: deep-link lookup with extracted metadata
//! - `POST /adapt-activity`: rewrite an activity for requested changes
//! - `POST /build-program`: plan a session from the catalog
//! - `POST /debrief-questions`: debrief questions for an activity
//! - `POST /before-after`: activities to run before/after another
//!
//! Field names are camelCase. Every error body is `{"error": "..."}`.

use axum::{
    Router,
    extract::rejection::JsonRejection,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, error, info};

use huddle_core::activity::ActivityRecord;
use huddle_core::metadata::{self, ActivityMetadata};
use huddle_prompts::{
    AdaptRequest, DebriefRequest, FeatureRequest, ProgramRequest, SequenceRequest, SequenceType,
};

use crate::SharedState;

pub fn api_router(state: SharedState) -> Router {
    Router::new()
        .route("/search", post(search_handler))
        .route("/activity", get(activity_handler))
        .route("/adapt-activity", post(adapt_activity_handler))
        .route("/build-program", post(build_program_handler))
        .route("/debrief-questions", post(debrief_questions_handler))
        .route("/before-after", post(before_after_handler))
        .with_state(state)
}

// ── DTOs ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Unwrap a JSON body, reporting malformed input in the API's error shape.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| api_error(rejection.status(), rejection.body_text()))
}

/// Accept a string, number or boolean and keep it as text. `null` and
/// blank strings count as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    }
    .filter(|s| !s.trim().is_empty()))
}

/// The subset of an activity the generation endpoints read.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActivityInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Deserialize)]
pub struct SearchRequest {
    #[serde(default, deserialize_with = "lenient_text")]
    pub query: Option<String>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub results: Vec<ActivityRecord>,
}

#[derive(Deserialize)]
pub struct ActivityQuery {
    pub slug: Option<String>,
}

#[derive(Serialize)]
pub struct ActivityResponse {
    pub activity: ActivityRecord,
    pub metadata: ActivityMetadata,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptActivityRequest {
    pub activity: Option<ActivityInput>,
    #[serde(default)]
    pub adaptations: Option<Vec<String>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptActivityResponse {
    pub adapted_activity: String,
    pub original_activity: String,
    pub adaptations: Vec<String>,
}

#[derive(Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct BuildProgramRequest {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub group_size: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub available_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub program_outcome: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub group_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub level_of_exertion: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub group_stage: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub lazy_preference: Option<String>,
}

#[derive(Serialize)]
pub struct BuildProgramResponse {
    pub program: String,
    pub parameters: BuildProgramRequest,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebriefQuestionsRequest {
    pub activity: Option<ActivityInput>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub debrief_focus: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub group_details: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebriefQuestionsResponse {
    pub debrief_questions: String,
    pub activity: String,
    pub debrief_focus: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeforeAfterRequest {
    pub activity: Option<ActivityInput>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub sequence_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub group_details: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub context: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub constraints: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub program_outcome: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeforeAfterResponse {
    pub sequence: String,
    pub activity: String,
    pub sequence_type: SequenceType,
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn search_handler(
    State(state): State<SharedState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> ApiResult<SearchResponse> {
    let request = body(payload)?;
    let Some(query) = request.query else {
        return Ok(Json(SearchResponse { results: Vec::new() }));
    };

    let results = state.catalog.search_activities(&query).await;

    Ok(Json(SearchResponse { results }))
}

async fn activity_handler(
    State(state): State<SharedState>,
    Query(params): Query<ActivityQuery>,
) -> ApiResult<ActivityResponse> {
    let slug = params
        .slug
        .filter(|s| !s.is_empty())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Slug is required"))?;

    let activity = state
        .catalog
        .get_activity_by_slug(&slug)
        .await
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Activity not found"))?;

    let metadata = metadata::extract(&activity, &state.categories, &state.site_url);
    Ok(Json(ActivityResponse { activity, metadata }))
}

async fn adapt_activity_handler(
    State(state): State<SharedState>,
    payload: Result<Json<AdaptActivityRequest>, JsonRejection>,
) -> ApiResult<AdaptActivityResponse> {
    let request = body(payload)?;
    let (Some(activity), Some(adaptations)) = (request.activity, request.adaptations) else {
        return Err(api_error(StatusCode::BAD_REQUEST, "Activity and adaptations are required"));
    };
    if adaptations.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Activity and adaptations are required"));
    }

    let feature_request = FeatureRequest::Adapt(AdaptRequest {
        activity_content: activity.content,
        adaptations: adaptations.clone(),
    });
    let adapted_activity = generate(&state, feature_request).await?;

    Ok(Json(AdaptActivityResponse {
        adapted_activity,
        original_activity: activity.title,
        adaptations,
    }))
}

async fn build_program_handler(
    State(state): State<SharedState>,
    payload: Result<Json<BuildProgramRequest>, JsonRejection>,
) -> ApiResult<BuildProgramResponse> {
    let parameters = body(payload)?;
    let p = parameters.clone();
    let (Some(group_size), Some(available_time), Some(program_outcome), Some(group_type), Some(level_of_exertion)) =
        (p.group_size, p.available_time, p.program_outcome, p.group_type, p.level_of_exertion)
    else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Group size, available time, program outcome, group type, and level of exertion are required",
        ));
    };

    let feature_request = FeatureRequest::Program(ProgramRequest {
        group_size,
        available_time,
        program_outcome,
        group_type,
        level_of_exertion,
        group_stage: p.group_stage,
        lazy_preference: p.lazy_preference,
    });
    let program = generate(&state, feature_request).await?;

    Ok(Json(BuildProgramResponse { program, parameters }))
}

async fn debrief_questions_handler(
    State(state): State<SharedState>,
    payload: Result<Json<DebriefQuestionsRequest>, JsonRejection>,
) -> ApiResult<DebriefQuestionsResponse> {
    let request = body(payload)?;
    let (Some(activity), Some(debrief_focus)) = (request.activity, request.debrief_focus) else {
        return Err(api_error(StatusCode::BAD_REQUEST, "Activity and debrief focus are required"));
    };

    let feature_request = FeatureRequest::Debrief(DebriefRequest {
        activity_content: activity.content,
        debrief_focus: debrief_focus.clone(),
        group_details: request.group_details,
    });
    let debrief_questions = generate(&state, feature_request).await?;

    Ok(Json(DebriefQuestionsResponse {
        debrief_questions,
        activity: activity.title,
        debrief_focus,
    }))
}

async fn before_after_handler(
    State(state): State<SharedState>,
    payload: Result<Json<BeforeAfterRequest>, JsonRejection>,
) -> ApiResult<BeforeAfterResponse> {
    let request = body(payload)?;
    let (Some(activity), Some(sequence_type)) = (request.activity, request.sequence_type) else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Activity and sequence type (before/after/both) are required",
        ));
    };
    let sequence_type: SequenceType = sequence_type
        .parse()
        .map_err(|message: String| api_error(StatusCode::BAD_REQUEST, message))?;

    let feature_request = FeatureRequest::Sequence(SequenceRequest {
        activity_content: activity.content,
        sequence_type,
        group_details: request.group_details,
        context: request.context,
        constraints: request.constraints,
        program_outcome: request.program_outcome,
    });
    let sequence = generate(&state, feature_request).await?;

    Ok(Json(BeforeAfterResponse {
        sequence,
        activity: activity.title,
        sequence_type,
    }))
}

/// Assemble the feature prompt, send it upstream once and return the text.
async fn generate(state: &SharedState, request: FeatureRequest) -> Result<String, ApiError> {
    let feature = request.feature();
    let request_id = uuid::Uuid::new_v4();
    info!(%request_id, feature = %feature, "Generation request");

    complete(state, &request).await.map_err(|e| {
        error!(%request_id, feature = %feature, provider = state.provider.name(), error = %e, "Generation failed");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, feature.failure_message())
    })
}

async fn complete(state: &SharedState, request: &FeatureRequest) -> huddle_core::Result<String> {
    let prompt = state.assembler.build(request).await?;

    let provider_request = prompt
        .into_request(&state.model)
        .with_temperature(state.temperature)
        .with_max_tokens(state.max_tokens);
    let response = state.provider.complete(provider_request).await?;

    if let Some(usage) = &response.usage {
        debug!(feature = %request.feature(), total_tokens = usage.total_tokens, "Generation complete");
    }
    Ok(response.message.content)
}
