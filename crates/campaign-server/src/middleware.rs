//! Request plumbing for the campaign API: request ids, bearer keys, and a
//! per-caller request budget.
//!
//! Layer order matters: [`request_id`] runs first so every rejection carries
//! an id, then [`require_bearer_auth`] tags the request with its [`Caller`],
//! then [`enforce_rate_limit`] charges that caller.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use campaign_core::{AppConfig, ConfigError, Environment};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id, taken from `x-request-id` or generated.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Who a request is charged to. Every request is anonymous when auth is off.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Caller {
    Anonymous,
    Key(String),
}

/// Accepted bearer keys; `None` leaves the API open.
#[derive(Debug, Clone)]
pub struct AuthState {
    keys: Option<Arc<HashSet<String>>>,
}

impl AuthState {
    /// Open API, for local development only.
    #[must_use]
    pub fn open() -> Self {
        Self { keys: None }
    }

    #[must_use]
    pub fn with_keys(keys: impl IntoIterator<Item = String>) -> Self {
        Self {
            keys: Some(Arc::new(keys.into_iter().collect())),
        }
    }

    /// Uses `config.api_keys`. With no keys the API is left open in
    /// development and startup fails anywhere else.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when no keys are configured
    /// outside development.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        if !config.api_keys.is_empty() {
            return Ok(Self::with_keys(config.api_keys.iter().cloned()));
        }
        if config.env == Environment::Development {
            tracing::warn!("api: no CAMPAIGN_API_KEYS configured; API is open in development");
            return Ok(Self::open());
        }
        Err(ConfigError::MissingEnvVar("CAMPAIGN_API_KEYS".to_string()))
    }

    fn authorize(&self, token: Option<&str>) -> Option<Caller> {
        match (&self.keys, token) {
            (None, _) => Some(Caller::Anonymous),
            (Some(keys), Some(token)) if keys.contains(token) => {
                Some(Caller::Key(token.to_string()))
            }
            (Some(_), _) => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Budget {
    opened_at: Instant,
    used: u32,
}

/// Fixed-window request budget, tracked separately for each [`Caller`].
#[derive(Debug, Clone)]
pub struct RateLimitState {
    per_window: u32,
    window: Duration,
    budgets: Arc<Mutex<HashMap<Caller, Budget>>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(per_window: u32, window: Duration) -> Self {
        Self {
            per_window,
            window,
            budgets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.rate_limit_per_minute, Duration::from_secs(60))
    }

    /// Charges one request to `caller`; on refusal returns the time until
    /// the caller's window reopens.
    async fn charge(&self, caller: &Caller, now: Instant) -> Result<(), Duration> {
        let mut budgets = self.budgets.lock().await;
        let budget = budgets.entry(caller.clone()).or_insert(Budget {
            opened_at: now,
            used: 0,
        });

        let elapsed = now.saturating_duration_since(budget.opened_at);
        if elapsed >= self.window {
            *budget = Budget {
                opened_at: now,
                used: 0,
            };
        }

        if budget.used >= self.per_window {
            return Err(self.window.saturating_sub(elapsed));
        }
        budget.used += 1;
        Ok(())
    }
}

fn request_id_of(req: &Request) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default()
}

fn bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Tags the request and response with a [`RequestId`].
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);
    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}

/// Rejects requests without an accepted bearer key and records the [`Caller`].
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = bearer_token(req.headers().get(header::AUTHORIZATION));
    let Some(caller) = auth.authorize(token) else {
        tracing::warn!(path = %req.uri().path(), "api: rejected request without a valid key");
        return ApiError::new(
            request_id_of(&req),
            "unauthorized",
            "missing or invalid bearer token",
        )
        .into_response();
    };

    req.extensions_mut().insert(caller);
    next.run(req).await
}

/// Charges the request to its [`Caller`]; refusals carry `Retry-After`.
pub async fn enforce_rate_limit(
    State(limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let caller = req
        .extensions()
        .get::<Caller>()
        .cloned()
        .unwrap_or(Caller::Anonymous);

    if let Err(retry_after) = limit.charge(&caller, Instant::now()).await {
        let mut res = ApiError::new(
            request_id_of(&req),
            "rate_limited",
            "request budget exhausted; retry later",
        )
        .into_response();
        let secs = retry_after.as_secs().max(1);
        if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
            res.headers_mut().insert(header::RETRY_AFTER, value);
        }
        return res;
    }

    next.run(req).await
}
