//! Manual scheduler control: start, stop, status.

use axum::{extract::State, Extension, Json};
use campaign_core::{ScheduleMode, SchedulerState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(in crate::api) struct ScheduleRequest {
    pub action: String,
    pub mode: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(in crate::api) struct ScheduleStatus {
    pub active: bool,
    pub mode: ScheduleMode,
    pub last_run: Option<DateTime<Utc>>,
    /// Earliest upcoming tick; `None` while stopped.
    pub next_run: Option<DateTime<Utc>>,
    pub message: String,
}

impl ScheduleStatus {
    fn new(
        state: SchedulerState,
        next_run: Option<DateTime<Utc>>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            active: state.active,
            mode: state.mode,
            last_run: state.last_run,
            next_run,
            message: message.into(),
        }
    }
}

/// POST /api/v1/schedule: `{"action": "start" | "stop" | "status", "mode"?}`.
///
/// `mode` applies to `start` only and defaults to `standard`.
pub(in crate::api) async fn control_schedule(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ScheduleRequest>,
) -> Result<Json<ApiResponse<ScheduleStatus>>, ApiError> {
    let rid = &req_id.0;
    let scheduler = &state.scheduler;

    let status = match body.action.trim() {
        "start" => {
            let mode = match body.mode.as_deref().map(str::trim) {
                None | Some("") => ScheduleMode::Standard,
                Some(raw) => raw
                    .parse::<ScheduleMode>()
                    .map_err(|reason| ApiError::new(rid, "validation_error", reason))?,
            };
            let started = scheduler.start(mode).await.map_err(|e| {
                tracing::error!(error = %e, "api: failed to start scheduler");
                ApiError::new(rid, "internal_error", e.to_string())
            })?;
            let next_run = scheduler.next_run().await;
            ScheduleStatus::new(started, next_run, format!("scheduler started in {mode} mode"))
        }
        "stop" => {
            let stopped = scheduler.stop().await.map_err(|e| {
                tracing::error!(error = %e, "api: failed to stop scheduler");
                ApiError::new(rid, "internal_error", e.to_string())
            })?;
            ScheduleStatus::new(stopped, None, "scheduler stopped")
        }
        "status" => {
            let current = scheduler.status().await;
            let message = if current.active { "running" } else { "stopped" };
            let next_run = scheduler.next_run().await;
            ScheduleStatus::new(current, next_run, message)
        }
        other => {
            return Err(ApiError::new(
                rid,
                "validation_error",
                format!("action must be 'start', 'stop', or 'status', got '{other}'"),
            ));
        }
    };

    Ok(ApiResponse::new(&req_id, status))
}
