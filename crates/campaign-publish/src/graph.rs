//! Thin client for the Facebook Graph API endpoints shared by both publishers.
//!
//! Every response body is checked for the Graph `{"error": {...}}` envelope,
//! which is surfaced as [`PublishError::Platform`] with the platform's own
//! message attached.

use std::time::Duration;

use campaign_core::PostImage;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::error::PublishError;

pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.facebook.com/v19.0";

/// Multipart field the photos endpoint expects the file under.
const PHOTO_FIELD: &str = "source";

/// Identifier of a published post, as returned by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostId(String);

impl PostId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PostId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// HTTP client bound to one Graph API root.
///
/// Cheap to clone; both publishers hold their own copy.
#[derive(Clone)]
pub struct GraphClient {
    client: Client,
    base_url: String,
}

impl GraphClient {
    /// Creates a client pointed at the production Graph API.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(user_agent: &str) -> Result<Self, PublishError> {
        Self::with_base_url(DEFAULT_GRAPH_BASE_URL, user_agent)
    }

    /// Creates a client with a custom API root (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(base_url: &str, user_agent: &str) -> Result<Self, PublishError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Exchanges `token` for the page's dedicated access token.
    ///
    /// Best-effort: any failure is logged and the original token is returned,
    /// so publishing proceeds with the configured credential.
    pub async fn page_access_token(&self, page_id: &str, token: &str) -> String {
        let request = self
            .client
            .get(self.url(page_id))
            .query(&[("fields", "access_token"), ("access_token", token)]);

        match self
            .send::<PageTokenResponse>(request, "page token exchange")
            .await
        {
            Ok(PageTokenResponse {
                access_token: Some(page_token),
            }) if !page_token.trim().is_empty() => {
                tracing::debug!(page_id, "graph: using exchanged page access token");
                page_token
            }
            Ok(_) => {
                tracing::warn!(
                    page_id,
                    "graph: page token exchange returned no token, using configured token"
                );
                token.to_string()
            }
            Err(e) => {
                tracing::warn!(
                    page_id,
                    error = %e,
                    "graph: page token exchange failed, using configured token"
                );
                token.to_string()
            }
        }
    }

    /// Uploads `image` to the page's photos as an unpublished photo and
    /// returns the new photo id.
    ///
    /// Generated images are sent as a multipart file; URL images are passed
    /// by reference for the platform to fetch. A non-blank `message` is kept
    /// as the photo's description.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] on transport failure, a Graph error envelope,
    /// an empty image, or a response without an `id`.
    pub async fn upload_unpublished_photo(
        &self,
        page_id: &str,
        token: &str,
        image: &PostImage,
        message: Option<&str>,
    ) -> Result<String, PublishError> {
        let endpoint = self.url(&format!("{page_id}/photos"));
        let message = message.map(str::trim).filter(|m| !m.is_empty());
        let request = match image {
            PostImage::Generated(generated) => {
                if generated.bytes().is_empty() {
                    return Err(PublishError::InvalidImageData(
                        "generated image is empty".to_string(),
                    ));
                }
                let part = Part::bytes(generated.bytes().to_vec())
                    .file_name(upload_file_name(generated.mime_type()))
                    .mime_str(generated.mime_type())?;
                let mut form = Form::new()
                    .text("access_token", token.to_string())
                    .text("published", "false");
                if let Some(message) = message {
                    form = form.text("message", message.to_string());
                }
                self.client.post(endpoint).multipart(form.part(PHOTO_FIELD, part))
            }
            PostImage::Url(url) => {
                if url.trim().is_empty() {
                    return Err(PublishError::InvalidImageData(
                        "image URL is empty".to_string(),
                    ));
                }
                let mut body = json!({
                    "access_token": token,
                    "url": url,
                    "published": false,
                });
                if let Some(message) = message {
                    body["message"] = json!(message);
                }
                self.client.post(endpoint).json(&body)
            }
        };

        let created: IdResponse = self.send(request, "photo upload").await?;
        created.require_id("photo upload")
    }

    /// Resolves a photo id to the public URL of its largest rendition.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::UnexpectedResponse`] when the photo lists no
    /// renditions, or any transport/platform error.
    pub async fn largest_image_url(
        &self,
        photo_id: &str,
        token: &str,
    ) -> Result<String, PublishError> {
        let request = self
            .client
            .get(self.url(photo_id))
            .query(&[("fields", "images"), ("access_token", token)]);
        let photo: PhotoImagesResponse = self.send(request, "photo lookup").await?;

        photo
            .images
            .into_iter()
            .filter(|image| !image.source.trim().is_empty())
            .max_by_key(|image| u64::from(image.width) * u64::from(image.height))
            .map(|image| image.source)
            .ok_or_else(|| PublishError::UnexpectedResponse {
                context: "photo lookup".to_string(),
                detail: format!("photo {photo_id} has no image renditions"),
            })
    }

    /// POSTs a JSON body to `path` and returns the `id` of the created object.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] on transport failure, a Graph error envelope,
    /// or a response without an `id`.
    pub async fn create(
        &self,
        path: &str,
        body: &serde_json::Value,
        context: &str,
    ) -> Result<String, PublishError> {
        let request = self.client.post(self.url(path)).json(body);
        let created: IdResponse = self.send(request, context).await?;
        created.require_id(context)
    }

    /// GETs the given `fields` of the object at `id`.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] on transport failure, a Graph error envelope,
    /// or a body that does not deserialize into `T`.
    pub async fn fields<T: DeserializeOwned>(
        &self,
        id: &str,
        fields: &str,
        token: &str,
        context: &str,
    ) -> Result<T, PublishError> {
        let request = self
            .client
            .get(self.url(id))
            .query(&[("fields", fields), ("access_token", token)]);
        self.send(request, context).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<T, PublishError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        let value = serde_json::from_str::<serde_json::Value>(&body).ok();
        if let Some(message) = value.as_ref().and_then(error_message) {
            return Err(PublishError::Platform {
                context: context.to_string(),
                message,
            });
        }
        if !status.is_success() {
            return Err(PublishError::Platform {
                context: context.to_string(),
                message: format!("HTTP {status}"),
            });
        }

        let value = value.ok_or_else(|| PublishError::UnexpectedResponse {
            context: context.to_string(),
            detail: "response body is not JSON".to_string(),
        })?;
        serde_json::from_value(value).map_err(|e| PublishError::UnexpectedResponse {
            context: context.to_string(),
            detail: e.to_string(),
        })
    }
}

impl std::fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Message of a Graph `{"error": {...}}` envelope, if the body is one.
fn error_message(body: &serde_json::Value) -> Option<String> {
    let error = body.get("error").filter(|e| !e.is_null())?;
    let message = error
        .get("message")
        .and_then(serde_json::Value::as_str)
        .or_else(|| error.as_str())
        .unwrap_or("unknown Graph API error");
    Some(message.to_string())
}

fn upload_file_name(mime_type: &str) -> String {
    let extension = match mime_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        _ => "png",
    };
    format!("generated-image.{extension}")
}

#[derive(Deserialize)]
struct PageTokenResponse {
    access_token: Option<String>,
}

#[derive(Deserialize)]
struct IdResponse {
    id: Option<String>,
}

impl IdResponse {
    fn require_id(self, context: &str) -> Result<String, PublishError> {
        self.id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| PublishError::UnexpectedResponse {
                context: context.to_string(),
                detail: "response has no id".to_string(),
            })
    }
}

#[derive(Deserialize)]
struct PhotoImagesResponse {
    #[serde(default)]
    images: Vec<PhotoImage>,
}

#[derive(Deserialize)]
struct PhotoImage {
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    source: String,
}
