//! Manual publishing to a single platform.

use axum::{extract::State, Extension, Json};
use campaign_core::PostImage;
use campaign_publish::post_url;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_publish_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(in crate::api) struct FacebookRequest {
    pub message: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(in crate::api) struct InstagramRequest {
    pub caption: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(in crate::api) struct PublishResponse {
    pub post_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_url: Option<String>,
}

/// Parses an optional image reference; blank means no image.
fn parse_image(rid: &str, image_url: Option<&str>) -> Result<Option<PostImage>, ApiError> {
    match image_url.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(reference) => PostImage::parse(reference)
            .map(Some)
            .map_err(|e| ApiError::new(rid, "validation_error", e.to_string())),
    }
}

fn require_text(rid: &str, field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            format!("{field} is required"),
        ));
    }
    Ok(())
}

/// POST /api/v1/publish/facebook: post text, optionally with an image.
pub(in crate::api) async fn publish_facebook(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<FacebookRequest>,
) -> Result<Json<ApiResponse<PublishResponse>>, ApiError> {
    let rid = &req_id.0;
    require_text(rid, "message", &body.message)?;
    let image = parse_image(rid, body.image_url.as_deref())?;

    let post_id = state
        .pipeline
        .facebook()
        .publish(&body.message, image.as_ref())
        .await
        .map_err(|e| map_publish_error(rid, &e))?;

    Ok(ApiResponse::new(
        &req_id,
        PublishResponse {
            post_url: Some(post_url(&post_id)),
            post_id: post_id.into_inner(),
        },
    ))
}

/// POST /api/v1/publish/instagram: publish an image with a caption.
pub(in crate::api) async fn publish_instagram(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<InstagramRequest>,
) -> Result<Json<ApiResponse<PublishResponse>>, ApiError> {
    let rid = &req_id.0;
    let image = parse_image(rid, body.image_url.as_deref())?;

    let post_id = state
        .pipeline
        .instagram()
        .publish(&body.caption, image.as_ref())
        .await
        .map_err(|e| map_publish_error(rid, &e))?;

    Ok(ApiResponse::new(
        &req_id,
        PublishResponse {
            post_id: post_id.into_inner(),
            post_url: None,
        },
    ))
}
