//! HTTP surface: thin axum handlers over [`GameService`].
//!
//! Every handler converts its payload, calls one orchestration operation,
//! and shapes the JSON reply. Failures become `{success: false, error}`
//! bodies; invalid stage indices map to 400, everything else to 500.

use crate::game::GameService;
use crate::models::{BasicInfo, GeneratedImage, StageRecord, UserData};
use crate::quiz::{QuizQuestion, QuizSource};
use crate::Error;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

pub struct AppState {
    pub game: GameService,
}

pub fn router(state: Arc<AppState>, images_dir: &Path) -> Router {
    Router::new()
        .route("/api/start", post(start))
        .route("/api/quiz_questions", post(quiz_questions))
        .route("/api/generate_stage", post(generate_stage))
        .route("/api/generate_outcome", post(generate_outcome))
        .route("/api/life_review", post(life_review))
        .route("/favicon.ico", get(favicon))
        .nest_service("/images", ServeDir::new(images_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            Error::InvalidStage(_) | Error::EmptyPrompt => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!("Request failed: {}", self.0);
        let body = Json(serde_json::json!({
            "success": false,
            "error": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
struct StartRequest {
    #[serde(default)]
    basic_info: BasicInfo,
    #[serde(default)]
    answers: Vec<String>,
}

#[derive(Debug, Serialize)]
struct StartResponse {
    success: bool,
    personality: String,
    user_data: UserData,
}

async fn start(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartRequest>,
) -> ApiResult<StartResponse> {
    let outcome = state
        .game
        .start(&request.basic_info, &request.answers)
        .await?;
    Ok(Json(StartResponse {
        success: true,
        personality: outcome.personality,
        user_data: outcome.user_data,
    }))
}

#[derive(Debug, Deserialize)]
struct QuizRequest {
    #[serde(default)]
    basic_info: BasicInfo,
}

#[derive(Debug, Serialize)]
struct QuizResponse {
    success: bool,
    questions: Vec<QuizQuestion>,
    source: QuizSource,
}

async fn quiz_questions(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QuizRequest>,
) -> ApiResult<QuizResponse> {
    let set = state.game.quiz_questions(&request.basic_info).await?;
    Ok(Json(QuizResponse {
        success: true,
        questions: set.questions,
        source: set.source,
    }))
}

#[derive(Debug, Deserialize)]
struct StageRequest {
    #[serde(default)]
    stage_index: usize,
    #[serde(default)]
    user_data: UserData,
}

#[derive(Debug, Serialize)]
struct StageResponse {
    success: bool,
    story: String,
    question: String,
    options: Vec<String>,
    images: Vec<GeneratedImage>,
}

async fn generate_stage(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StageRequest>,
) -> ApiResult<StageResponse> {
    let cancel = CancellationToken::new();
    let content = state
        .game
        .generate_stage(request.stage_index, &request.user_data, &cancel)
        .await?;
    Ok(Json(StageResponse {
        success: true,
        story: content.story,
        question: content.question,
        options: content.options,
        images: content.images,
    }))
}

#[derive(Debug, Deserialize)]
struct OutcomeRequest {
    #[serde(default)]
    stage_index: usize,
    #[serde(default)]
    story: String,
    #[serde(default)]
    choice: String,
}

#[derive(Debug, Serialize)]
struct OutcomeResponse {
    success: bool,
    outcome: String,
    image: GeneratedImage,
}

async fn generate_outcome(
    State(state): State<Arc<AppState>>,
    Json(request): Json<OutcomeRequest>,
) -> ApiResult<OutcomeResponse> {
    let cancel = CancellationToken::new();
    let content = state
        .game
        .generate_outcome(request.stage_index, &request.story, &request.choice, &cancel)
        .await?;
    Ok(Json(OutcomeResponse {
        success: true,
        outcome: content.outcome,
        image: content.image,
    }))
}

#[derive(Debug, Deserialize)]
struct ReviewRequest {
    #[serde(default)]
    user_data: UserData,
    #[serde(default)]
    stages: Vec<StageRecord>,
}

#[derive(Debug, Serialize)]
struct ReviewResponse {
    success: bool,
    summary: String,
}

async fn life_review(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReviewRequest>,
) -> ApiResult<ReviewResponse> {
    let summary = state
        .game
        .life_review(&request.user_data, &request.stages)
        .await?;
    Ok(Json(ReviewResponse {
        success: true,
        summary,
    }))
}

async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}
