use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{info, warn};
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::CorsLayer;

use crate::pipeline::pipeline::{PosturePipeline, PostureReport};
use crate::server::error::ApiError;
use crate::utils::image::decode_rgb;

/// Camera uploads routinely exceed axum's 2 MiB default body limit.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// router wires the HTTP surface: service banner, health probe and the
/// multipart analysis endpoint. CORS stays permissive for app clients.
pub fn router(pipeline: Arc<PosturePipeline>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/analyze-posture", post(analyze_posture))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(pipeline)
}

async fn home() -> Json<Value> {
    Json(serde_json::json!({
        "message": "Posture Analysis API is running!",
        "version": "1.0",
        "endpoints": {
            "health": "GET /health",
            "analyze": "POST /analyze-posture"
        }
    }))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    mediapipe_available: bool,
    message: &'static str,
}

async fn health(State(pipeline): State<Arc<PosturePipeline>>) -> Json<HealthResponse> {
    let mediapipe_available = pipeline.detector_available().await;
    Json(HealthResponse {
        status: "healthy",
        mediapipe_available,
        message: "Posture analysis server running",
    })
}

#[derive(Debug, Serialize)]
struct AnalyzeResponse {
    success: bool,
    analysis: PostureReport,
    timestamp: Option<Value>,
}

async fn analyze_posture(
    State(pipeline): State<Arc<PosturePipeline>>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let mut photo: Option<axum::body::Bytes> = None;
    let mut photo_name: Option<String> = None;
    let mut metadata_raw: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("photo") => {
                photo_name = field.file_name().map(str::to_string);
                photo = Some(field.bytes().await?);
            }
            Some("metadata") => {
                metadata_raw = Some(field.text().await?);
            }
            _ => {}
        }
    }

    let photo = photo.ok_or(ApiError::MissingPhoto)?;
    if photo.is_empty() || matches!(photo_name.as_deref(), Some("")) {
        return Err(ApiError::EmptyPhoto);
    }

    info!(
        "analyzing upload {} ({} bytes)",
        photo_name.as_deref().unwrap_or("<unnamed>"),
        photo.len()
    );

    let img = decode_rgb(&photo).map_err(ApiError::InvalidImage)?;

    let metadata = match metadata_raw {
        None => Value::Null,
        Some(raw) => match serde_json::from_str::<Value>(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!("ignoring malformed metadata JSON: {err}");
                Value::Null
            }
        },
    };

    let report = pipeline
        .analyze_image(&img)
        .await?
        .ok_or(ApiError::NoPoseDetected)?;

    info!(
        "analysis complete: {} issues, score {}",
        report.total_issues_count, report.posture_score
    );

    Ok(Json(AnalyzeResponse {
        success: true,
        analysis: report,
        timestamp: metadata.get("timestamp").cloned(),
    }))
}
