//! Recurring campaign triggers.
//!
//! [`CampaignScheduler`] owns a [`JobScheduler`] and the registry of jobs it
//! added, so a restart in a new mode removes exactly the triggers of the old
//! one. Activation state is persisted through a [`StateStore`] and reloaded
//! at startup by [`CampaignScheduler::resume`]; triggers themselves do not
//! survive a process restart.

mod pipeline;
mod single_flight;

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::time::Duration;

use campaign_core::params::random_brief;
use campaign_core::{
    AppConfig, ScheduleMode, ScheduleZone, SchedulerState, StateError, StateStore,
};
use chrono::{DateTime, Local, Utc};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use uuid::Uuid;

pub use pipeline::CampaignPipeline;
use pipeline::PipelineStep;
use single_flight::SingleFlight;

const TEST_TRIGGER: &str = "test-interval";

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("job scheduler error: {0}")]
    Jobs(#[from] JobSchedulerError),

    #[error(transparent)]
    State(#[from] StateError),
}

/// Trigger timing and brief randomisation.
#[derive(Debug, Clone)]
pub struct ScheduleSettings {
    /// Hours of the standard-mode daily slots, read in `zone`.
    pub hours: Vec<u8>,
    pub zone: ScheduleZone,
    pub test_interval: Duration,
    pub founder_probability: f64,
}

impl ScheduleSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            hours: config.schedule_hours.clone(),
            zone: config.schedule_zone,
            test_interval: config.test_interval(),
            founder_probability: config.founder_probability,
        }
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The scheduler was stopped before the tick ran.
    Inactive,
    /// The same trigger's previous tick is still running.
    Overlapping,
    Completed,
    Failed(PipelineStep),
}

struct Trigger {
    id: Uuid,
    label: String,
}

struct Inner {
    jobs: JobScheduler,
    registry: Mutex<Vec<Trigger>>,
    state: Mutex<SchedulerState>,
    store: StateStore,
    pipeline: Arc<CampaignPipeline>,
    settings: ScheduleSettings,
    in_flight: SingleFlight,
}

/// Handle to the campaign scheduler; cheap to clone.
#[derive(Clone)]
pub struct CampaignScheduler {
    inner: Arc<Inner>,
}

impl CampaignScheduler {
    /// Creates and starts an empty job scheduler and loads persisted state.
    ///
    /// No triggers are registered until [`start`](Self::start) or
    /// [`resume`](Self::resume) is called. An unreadable state file is
    /// logged and treated as inactive.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Jobs`] if the job scheduler cannot be
    /// initialised or started.
    pub async fn new(
        pipeline: Arc<CampaignPipeline>,
        store: StateStore,
        settings: ScheduleSettings,
    ) -> Result<Self, SchedulerError> {
        let state = store.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "scheduler: could not load persisted state; starting inactive");
            SchedulerState::default()
        });

        let jobs = JobScheduler::new().await?;
        jobs.start().await?;

        Ok(Self {
            inner: Arc::new(Inner {
                jobs,
                registry: Mutex::new(Vec::new()),
                state: Mutex::new(state),
                store,
                pipeline,
                settings,
                in_flight: SingleFlight::default(),
            }),
        })
    }

    /// Re-arms triggers if the persisted state was active.
    ///
    /// Returns whether triggers were registered.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError`] if re-registration fails.
    pub async fn resume(&self) -> Result<bool, SchedulerError> {
        let persisted = self.status().await;
        if !persisted.active {
            tracing::info!("scheduler: persisted state inactive; not resuming");
            return Ok(false);
        }

        tracing::info!(mode = %persisted.mode, "scheduler: resuming persisted schedule");
        self.start(persisted.mode).await?;
        Ok(true)
    }

    /// Registers the triggers for `mode`, replacing any already registered.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Jobs`] if a trigger cannot be registered (in
    /// which case none remain and the state is persisted inactive), or
    /// [`SchedulerError::State`] if the new state cannot be written.
    pub async fn start(&self, mode: ScheduleMode) -> Result<SchedulerState, SchedulerError> {
        let mut registry = self.inner.registry.lock().await;
        self.inner.clear_triggers(&mut registry).await;

        if let Err(e) = self.register_triggers(mode, &mut registry).await {
            self.inner.clear_triggers(&mut registry).await;
            self.inner.update_state(|s| s.active = false).await?;
            return Err(e.into());
        }

        let state = self
            .inner
            .update_state(|s| {
                s.active = true;
                s.mode = mode;
            })
            .await?;

        tracing::info!(
            mode = %mode,
            triggers = registry.len(),
            "scheduler: started"
        );
        Ok(state)
    }

    /// Removes every registered trigger and persists the inactive state.
    ///
    /// A tick already in progress is left to finish.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::State`] if the state cannot be written.
    pub async fn stop(&self) -> Result<SchedulerState, SchedulerError> {
        let mut registry = self.inner.registry.lock().await;
        self.inner.clear_triggers(&mut registry).await;
        let state = self.inner.update_state(|s| s.active = false).await?;

        tracing::info!("scheduler: stopped");
        Ok(state)
    }

    pub async fn status(&self) -> SchedulerState {
        self.inner.state.lock().await.clone()
    }

    /// Labels of the currently registered triggers, in registration order.
    pub async fn registered_triggers(&self) -> Vec<String> {
        self.inner
            .registry
            .lock()
            .await
            .iter()
            .map(|t| t.label.clone())
            .collect()
    }

    /// Earliest upcoming tick across the registered triggers.
    pub async fn next_run(&self) -> Option<DateTime<Utc>> {
        let registry = self.inner.registry.lock().await;
        let mut jobs = self.inner.jobs.clone();
        let mut next: Option<DateTime<Utc>> = None;
        for trigger in registry.iter() {
            match jobs.next_tick_for_job(trigger.id).await {
                Ok(Some(at)) => next = Some(next.map_or(at, |n| n.min(at))),
                Ok(None) => {}
                Err(e) => tracing::warn!(
                    trigger = %trigger.label,
                    error = %e,
                    "scheduler: failed to read next tick"
                ),
            }
        }
        next
    }

    /// Runs one tick as if fired by `trigger`.
    pub async fn execute_scheduled_post(&self, trigger: &str) -> TickOutcome {
        self.inner.execute_scheduled_post(trigger).await
    }

    async fn register_triggers(
        &self,
        mode: ScheduleMode,
        registry: &mut Vec<Trigger>,
    ) -> Result<(), JobSchedulerError> {
        let weak = Arc::downgrade(&self.inner);

        match mode {
            ScheduleMode::Standard => {
                for hour in &self.inner.settings.hours {
                    let label = format!("standard-{hour:02}");
                    let cron = format!("0 0 {hour} * * *");
                    let run = {
                        let weak = weak.clone();
                        let label = label.clone();
                        move |_uuid: Uuid, _lock: JobScheduler| tick(&weak, &label)
                    };
                    let job = match self.inner.settings.zone {
                        ScheduleZone::Local => Job::new_async_tz(cron.as_str(), Local, run)?,
                        ScheduleZone::Fixed(offset) => {
                            Job::new_async_tz(cron.as_str(), offset, run)?
                        }
                    };
                    let id = self.inner.jobs.add(job).await?;
                    registry.push(Trigger { id, label });
                }
            }
            ScheduleMode::Test => {
                let interval = self.inner.settings.test_interval;
                let job = {
                    let weak = weak.clone();
                    Job::new_repeated_async(interval, move |_uuid, _lock| {
                        tick(&weak, TEST_TRIGGER)
                    })?
                };
                let id = self.inner.jobs.add(job).await?;
                registry.push(Trigger {
                    id,
                    label: TEST_TRIGGER.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn tick(inner: &Weak<Inner>, label: &str) -> Pin<Box<dyn Future<Output = ()> + Send>> {
    let inner = inner.clone();
    let label = label.to_string();
    Box::pin(async move {
        if let Some(inner) = inner.upgrade() {
            inner.execute_scheduled_post(&label).await;
        }
    })
}

impl Inner {
    async fn clear_triggers(&self, registry: &mut Vec<Trigger>) {
        for trigger in registry.drain(..) {
            if let Err(e) = self.jobs.remove(&trigger.id).await {
                tracing::warn!(
                    trigger = %trigger.label,
                    error = %e,
                    "scheduler: failed to remove trigger"
                );
            }
        }
    }

    /// Applies `change` in memory, then persists the result.
    async fn update_state(
        &self,
        change: impl FnOnce(&mut SchedulerState),
    ) -> Result<SchedulerState, StateError> {
        // Saving under the lock keeps the file in the same order as memory.
        let mut state = self.state.lock().await;
        change(&mut *state);
        self.store.save(&state)?;
        Ok(state.clone())
    }

    async fn execute_scheduled_post(&self, trigger: &str) -> TickOutcome {
        if !self.state.lock().await.active {
            tracing::debug!(trigger, "scheduler: inactive; skipping tick");
            return TickOutcome::Inactive;
        }

        let Some(_flight) = self.in_flight.try_acquire(trigger) else {
            tracing::warn!(trigger, "scheduler: previous tick still running; skipping");
            return TickOutcome::Overlapping;
        };

        let brief = random_brief(&mut rand::rng(), self.settings.founder_probability);
        tracing::info!(
            trigger,
            service = %brief.service,
            audience = %brief.audience,
            tone = %brief.tone,
            feature_founder = brief.feature_founder,
            "scheduler: running campaign pipeline"
        );

        match self.pipeline.run(&brief).await {
            Ok(report) => {
                if let Err(e) = self
                    .update_state(|s| s.last_run = Some(Utc::now()))
                    .await
                {
                    tracing::error!(trigger, error = %e, "scheduler: failed to persist last run");
                }
                tracing::info!(
                    trigger,
                    facebook_post_id = %report.facebook_post_id,
                    instagram_post_id = %report.instagram_post_id,
                    "scheduler: campaign published"
                );
                TickOutcome::Completed
            }
            Err(e) => {
                tracing::error!(
                    trigger,
                    step = %e.step(),
                    error = %e,
                    "scheduler: pipeline failed; waiting for next tick"
                );
                TickOutcome::Failed(e.step())
            }
        }
    }
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
pub(crate) mod tests;
