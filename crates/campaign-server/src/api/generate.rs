//! Manual content and image generation.

use axum::{extract::State, Extension, Json};
use campaign_core::{AspectRatio, CampaignBrief, CampaignContent, Resolution};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_generation_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(in crate::api) struct ImageRequest {
    pub prompt: String,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub resolution: Resolution,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(in crate::api) struct ImageResponse {
    /// `data:` URL, usable directly as a publish `imageUrl`.
    pub image_url: String,
    pub source: String,
}

/// POST /api/v1/content: generate copy for every platform from a brief.
pub(in crate::api) async fn generate_content(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(brief): Json<CampaignBrief>,
) -> Result<Json<ApiResponse<CampaignContent>>, ApiError> {
    let content = state
        .pipeline
        .content()
        .generate(&brief)
        .await
        .map_err(|e| map_generation_error(&req_id.0, &e))?;

    Ok(ApiResponse::new(&req_id, content))
}

/// POST /api/v1/images: render one image for a prompt.
pub(in crate::api) async fn generate_image(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ImageRequest>,
) -> Result<Json<ApiResponse<ImageResponse>>, ApiError> {
    let image = state
        .pipeline
        .image()
        .generate(&body.prompt, body.aspect_ratio, body.resolution)
        .await
        .map_err(|e| map_generation_error(&req_id.0, &e))?;

    Ok(ApiResponse::new(
        &req_id,
        ImageResponse {
            image_url: image.to_data_url(),
            source: image.source().to_string(),
        },
    ))
}
