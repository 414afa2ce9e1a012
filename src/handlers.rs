//! REST surface: liveness, pipeline status and avatar creation endpoints,
//! plus the uniform response envelope and error mapping.

use axum::extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::avatar::ImageAvatarRenderer;
use crate::config::{Config, UploadConfig};
use crate::error::{AvatarError, Result};
use crate::models::{CaseDocument, CaseInput, ModelsUsed};
use crate::persona::ChatPersonaGenerator;
use crate::pipeline::AvatarPipeline;
use crate::transport::{ChatTransport, HttpChatTransport, HttpImageTransport, ImageTransport};
use crate::validation;

/// Shared per-process state: configuration plus the fully wired pipeline.
/// Nothing here is mutable across requests apart from the pipeline's id
/// counter.
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: AvatarPipeline,
    pub pipeline_ready: bool,
}

impl AppState {
    /// Wire transports, generators and the pipeline from configuration.
    /// All provider handles are constructed here and injected; no globals.
    pub fn from_config(config: Arc<Config>) -> Result<Self> {
        let chat_tx = Arc::new(HttpChatTransport::new(
            config.chat.api_url.clone(),
            config.chat.api_key.clone(),
            config.chat_timeout(),
        )?) as Arc<dyn ChatTransport>;
        let image_tx = Arc::new(HttpImageTransport::new(
            config.image.api_url.clone(),
            config.image.api_key.clone(),
            config.image_timeout(),
        )?) as Arc<dyn ImageTransport>;

        let persona = Arc::new(ChatPersonaGenerator::new(
            chat_tx,
            config.chat.model.clone(),
            config.chat.max_tokens,
            config.chat.temperature,
            config.chat.max_input_chars,
        ));
        let renderer = Arc::new(ImageAvatarRenderer::new(
            image_tx,
            config.image.model.clone(),
            config.image.width,
            config.image.height,
        ));

        let models = ModelsUsed {
            chat: config.chat.model.clone(),
            image: config.image.model.clone(),
        };
        let pipeline = AvatarPipeline::new(persona, renderer, models);
        let pipeline_ready = config.providers_configured();

        Ok(Self {
            config,
            pipeline,
            pipeline_ready,
        })
    }
}

/// Uniform response envelope for every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct CreateAvatarBody {
    text_query: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    // Leave headroom above the raw upload caps for multipart framing.
    let body_limit =
        state.config.upload.max_file_bytes * state.config.upload.max_files + 64 * 1024;

    Router::new()
        .route("/health", get(health))
        .route("/avatar/status", get(avatar_status))
        .route("/api/create_avatar", post(create_avatar))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "message": "Server is healthy",
        "name": state.config.server.name,
        "version": state.config.server.version,
    }))
}

async fn avatar_status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let message = if state.pipeline_ready {
        "Avatar creation pipeline is operational"
    } else {
        "Avatar creation pipeline is missing provider credentials"
    };
    Json(serde_json::json!({
        "status": "ok",
        "message": message,
        "pipeline_ready": state.pipeline_ready,
        "models_used": state.pipeline.models(),
    }))
}

async fn create_avatar(State(state): State<Arc<AppState>>, req: Request) -> Response {
    let input = match parse_request(req, &state.config.upload).await {
        Ok(input) => input,
        Err(e) => return error_response(&e),
    };

    match state.pipeline.create(input).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(ApiResponse {
                status: "ok",
                message: "Expert witness avatar created successfully".to_string(),
                data: Some(outcome),
            }),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// Accepts multipart form uploads (`text_query` + repeated `files`) and, for
/// text-only callers, a plain JSON body with `text_query`.
async fn parse_request(req: Request, upload: &UploadConfig) -> Result<CaseInput> {
    let is_multipart = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    if is_multipart {
        let multipart = Multipart::from_request(req, &())
            .await
            .map_err(|e| AvatarError::InvalidInput(format!("Malformed multipart body: {e}")))?;
        parse_multipart(multipart, upload).await
    } else {
        let Json(body) = Json::<CreateAvatarBody>::from_request(req, &())
            .await
            .map_err(|e| AvatarError::InvalidInput(format!("Malformed request body: {e}")))?;
        Ok(CaseInput {
            text_query: body.text_query,
            documents: vec![],
        })
    }
}

async fn parse_multipart(mut multipart: Multipart, upload: &UploadConfig) -> Result<CaseInput> {
    let mut input = CaseInput::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AvatarError::InvalidInput(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(filename) = field.file_name().map(str::to_string) {
            validation::ensure_pdf_filename(&filename)?;
            if input.documents.len() >= upload.max_files {
                return Err(AvatarError::InvalidInput(format!(
                    "At most {} files may be uploaded per request",
                    upload.max_files
                )));
            }
            let bytes = field.bytes().await.map_err(|e| {
                AvatarError::InvalidInput(format!("Failed to read upload '{filename}': {e}"))
            })?;
            validation::ensure_within_size(&filename, bytes.len(), upload.max_file_bytes)?;
            input.documents.push(CaseDocument {
                filename,
                bytes: bytes.to_vec(),
            });
        } else if name == "text_query" {
            let text = field
                .text()
                .await
                .map_err(|e| AvatarError::InvalidInput(format!("Failed to read text_query: {e}")))?;
            input.text_query = Some(text);
        }
        // Unknown scalar fields are ignored.
    }

    Ok(input)
}

fn error_response(e: &AvatarError) -> Response {
    tracing::error!(error = %e, "Avatar creation request failed");
    (
        e.status_code(),
        Json(ApiResponse::<()> {
            status: "error",
            message: e.client_message(),
            data: None,
        }),
    )
        .into_response()
}
