//! HTTP surface: two pipeline endpoints plus a health probe.

use crate::app::App;
use crate::models::{
    Config, FieldRequest, GenerateFieldsRequest, GenerateFieldsResponse, GeneratePosterRequest,
    GeneratePosterResponse,
};
use crate::Error;
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub const FIELDS_PARSE_FAILURE: &str = "Failed to parse text generation response as JSON.";
pub const POSTER_FAILURE: &str = "Poster image generation failed.";

#[derive(Clone)]
pub struct AppState {
    app: Arc<App>,
}

impl AppState {
    pub fn new(app: App) -> Self {
        Self { app: Arc::new(app) }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorPayload {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let payload = ErrorPayload {
            detail: self.to_string(),
        };
        (status, Json(payload)).into_response()
    }
}

impl ApiError {
    /// Text-stage mapping: parse failures get a fixed message, other
    /// failures keep their description.
    fn from_fields_error(err: Error) -> Self {
        match err {
            Error::Validation(message) => Self::BadRequest(message),
            Error::MalformedResponse(_) => Self::Internal(FIELDS_PARSE_FAILURE.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }

    /// Image-stage mapping: provider details are never exposed.
    fn from_poster_error(err: Error) -> Self {
        match err {
            Error::Validation(message) => Self::BadRequest(message),
            _ => Self::Internal(POSTER_FAILURE.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/generate-fields", post(generate_fields))
        .route("/generate-poster", post(generate_poster))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.cors_allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Skipping invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

/// Router with CORS and request tracing applied.
pub fn build_app(config: &Config, app: App) -> Router {
    build_router(AppState::new(app))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(config: Config) -> anyhow::Result<()> {
    let app = App::from_config(&config)?;
    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("Poster generator listening on {}", config.bind_addr);
    axum::serve(listener, build_app(&config, app)).await?;
    Ok(())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn generate_fields(
    State(state): State<AppState>,
    Json(body): Json<GenerateFieldsRequest>,
) -> Result<Json<GenerateFieldsResponse>, ApiError> {
    let request = FieldRequest::try_from(body).map_err(ApiError::from_fields_error)?;
    let fields = state
        .app
        .generate_fields(&request)
        .await
        .map_err(ApiError::from_fields_error)?;
    Ok(Json(GenerateFieldsResponse::success(fields)))
}

async fn generate_poster(
    State(state): State<AppState>,
    Json(body): Json<GeneratePosterRequest>,
) -> Result<Json<GeneratePosterResponse>, ApiError> {
    let poster = state
        .app
        .generate_poster(&body.fields, body.theme.as_deref())
        .await
        .map_err(ApiError::from_poster_error)?;
    Ok(Json(GeneratePosterResponse::success(
        poster.to_base64(),
        poster.mime_type,
    )))
}
