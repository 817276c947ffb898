use anyhow::{Context, Result};
use std::future::Future;
use std::time::Duration;

use tracing::info;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::HeaderValue,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use super::metrics::metrics_handler;
use super::{log_requests, state::*, ApiError, ErrorStage, ServerConfig};
use crate::board::{MoodBoard, SavedBoard, DEFAULT_IMAGES_PER_BOARD};
use crate::example_prompts::ExamplePrompts;
use crate::imagery::{GenerationResult, ImageResult, ModelStatus};

const SERVICE_NAME: &str = "AI Mood Board API";

#[derive(Serialize)]
struct ServerStats {
    pub message: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub uptime: String,
    pub hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug)]
struct MoodRequest {
    pub description: String,
    pub style: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ImageRequest {
    pub prompt: String,
    pub style: Option<String>,
}

fn default_image_count() -> usize {
    DEFAULT_IMAGES_PER_BOARD
}

#[derive(Deserialize, Debug)]
struct ImagesQuery {
    pub query: String,
    #[serde(default = "default_image_count")]
    pub count: usize,
}

#[derive(Serialize)]
struct ImagesResponse {
    images: Vec<ImageResult>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    image_model: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_model_error: Option<String>,
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        message: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    };
    Json(stats)
}

async fn analyze_mood(
    State(board): State<GuardedBoardService>,
    payload: Result<Json<MoodRequest>, JsonRejection>,
) -> Result<Json<MoodBoard>, ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError::new(ErrorStage::Internal, e.body_text()))?;
    let mood_board = board
        .analyze(&request.description, request.style.as_deref())
        .await;
    Ok(Json(mood_board))
}

async fn search_images(
    State(board): State<GuardedBoardService>,
    query: Result<Query<ImagesQuery>, QueryRejection>,
) -> Result<Json<ImagesResponse>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::new(ErrorStage::ImageSearch, e.body_text()))?;
    let images = board.search_images(&query.query, query.count).await;
    Ok(Json(ImagesResponse { images }))
}

async fn generate_image(
    State(board): State<GuardedBoardService>,
    payload: Result<Json<ImageRequest>, JsonRejection>,
) -> Result<Json<GenerationResult>, ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError::new(ErrorStage::ImageGeneration, e.body_text()))?;
    let result = board
        .generate_image(&request.prompt, request.style.as_deref())
        .await;
    Ok(Json(result))
}

async fn save_board(
    State(board): State<GuardedBoardService>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<SavedBoard>, ApiError> {
    let Json(data) = payload.map_err(|e| ApiError::new(ErrorStage::Save, e.body_text()))?;
    if !data.is_object() {
        return Err(ApiError::new(
            ErrorStage::Save,
            "board data must be a JSON object",
        ));
    }
    Ok(Json(board.save_board(data)))
}

async fn get_example_prompts(State(board): State<GuardedBoardService>) -> Json<ExamplePrompts> {
    Json(board.example_prompts())
}

async fn health(State(board): State<GuardedBoardService>) -> Json<HealthResponse> {
    let image_model = match board.image_model_status() {
        ModelStatus::Ready => "ready",
        ModelStatus::Initializing => "initializing",
        ModelStatus::Uninitialized | ModelStatus::Failed => "unavailable",
    };
    Json(HealthResponse {
        status: "healthy",
        timestamp: chrono::Utc::now().to_rfc3339(),
        image_model,
        image_model_error: board.image_model_failure(),
    })
}

fn make_cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("Invalid allowed origin: {}", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    // Credentialed CORS forbids wildcards, so methods and headers are mirrored.
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

pub fn make_app(config: ServerConfig, board: GuardedBoardService) -> Result<Router> {
    let state = ServerState::new(config.clone(), board);

    let api_routes: Router = Router::new()
        .route("/analyze-mood", post(analyze_mood))
        .route("/images", get(search_images))
        .route("/generate-image", post(generate_image))
        .route("/save-board", post(save_board))
        .route("/example-prompts", get(get_example_prompts))
        .route("/health", get(health))
        .with_state(state.clone());

    let app: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone())
        .nest("/api", api_routes)
        .layer(make_cors_layer(&config.allowed_origins)?)
        .layer(middleware::from_fn_with_state(state, log_requests));

    Ok(app)
}

fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Serves the API and the metrics endpoint until `shutdown` resolves.
pub async fn run_server<F>(config: ServerConfig, board: GuardedBoardService, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = make_app(config.clone(), board)?;

    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", config.metrics_port))?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(metrics_listener, make_metrics_app()).await {
            tracing::error!("Metrics server error: {}", e);
        }
    });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;

    info!("Ready to serve at port {}!", config.port);
    info!("Metrics available at port {}!", config.metrics_port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
