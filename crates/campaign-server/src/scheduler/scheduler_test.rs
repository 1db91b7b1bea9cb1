use std::path::Path;

use campaign_core::{parse_brand_profile, Environment, PlatformCredentials};
use chrono::{FixedOffset, Timelike};
use serde_json::json;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

const BRAND_YAML: &str = r"
name: Vallarta Vows
description: a wedding agency in Puerto Vallarta
founder: { name: Robin Manoogian, title: Founder, experience: 15+ years }
contact_lines: ['vallartavows.example']
";

pub(crate) fn test_config(google_url: &str, graph_url: &str, state_path: &Path) -> AppConfig {
    AppConfig {
        env: Environment::Test,
        bind_addr: "127.0.0.1:0".parse().expect("addr"),
        log_level: "debug".to_string(),
        brand_path: "./config/brand.yaml".into(),
        state_path: state_path.to_path_buf(),
        google_api_key: Some("test-key".to_string()),
        google_base_url: google_url.to_string(),
        text_model: "gemini-test".to_string(),
        image_model: "imagen-test".to_string(),
        credentials: PlatformCredentials {
            page_access_token: Some("user-token".to_string()),
            page_id: Some("1001".to_string()),
            ig_user_id: Some("1789".to_string()),
        },
        graph_base_url: graph_url.to_string(),
        user_agent: "campaign-test".to_string(),
        schedule_hours: vec![8, 9, 10, 11, 12, 13, 14, 15, 16],
        schedule_zone: ScheduleZone::Local,
        test_interval_secs: 300,
        founder_probability: 0.5,
        ig_poll_interval_secs: 0,
        ig_poll_max_attempts: 3,
        api_keys: Vec::new(),
        rate_limit_per_minute: 60,
    }
}

async fn scheduler_for(config: &AppConfig) -> CampaignScheduler {
    let brand = Arc::new(parse_brand_profile(BRAND_YAML).expect("brand"));
    let pipeline = Arc::new(CampaignPipeline::from_config(config, brand).expect("pipeline"));
    CampaignScheduler::new(
        pipeline,
        StateStore::new(&config.state_path),
        ScheduleSettings::from_config(config),
    )
    .await
    .expect("scheduler")
}

/// Scheduler whose clients point at an unroutable address; for tests that
/// never reach the network.
async fn offline_scheduler(dir: &tempfile::TempDir) -> CampaignScheduler {
    let config = test_config(
        "http://127.0.0.1:9",
        "http://127.0.0.1:9",
        &dir.path().join("schedule-state.json"),
    );
    scheduler_for(&config).await
}

fn standard_labels() -> Vec<String> {
    (8..=16).map(|h| format!("standard-{h:02}")).collect()
}

#[tokio::test(flavor = "multi_thread")]
async fn start_registers_nine_standard_triggers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let scheduler = offline_scheduler(&dir).await;

    let state = scheduler
        .start(ScheduleMode::Standard)
        .await
        .expect("start");
    assert!(state.active);
    assert_eq!(scheduler.registered_triggers().await, standard_labels());
}

#[tokio::test(flavor = "multi_thread")]
async fn standard_slot_fires_at_the_configured_zone_hour() {
    let dir = tempfile::tempdir().expect("tempdir");
    let vallarta = FixedOffset::west_opt(6 * 3600).expect("offset");
    let mut config = test_config(
        "http://127.0.0.1:9",
        "http://127.0.0.1:9",
        &dir.path().join("schedule-state.json"),
    );
    config.schedule_hours = vec![8];
    config.schedule_zone = ScheduleZone::Fixed(vallarta);
    let scheduler = scheduler_for(&config).await;

    scheduler
        .start(ScheduleMode::Standard)
        .await
        .expect("start");
    assert_eq!(scheduler.registered_triggers().await, vec!["standard-08"]);

    let next = scheduler
        .next_run()
        .await
        .expect("standard-08 has an upcoming tick");
    assert!(next > Utc::now());
    let local = next.with_timezone(&vallarta);
    assert_eq!((local.hour(), local.minute(), local.second()), (8, 0, 0));
    assert_eq!(next.hour(), 14, "08:00 at UTC-6 is 14:00 UTC");
}

#[tokio::test(flavor = "multi_thread")]
async fn stopped_scheduler_has_no_next_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let scheduler = offline_scheduler(&dir).await;

    scheduler
        .start(ScheduleMode::Standard)
        .await
        .expect("start");
    assert!(scheduler.next_run().await.is_some());

    scheduler.stop().await.expect("stop");
    assert!(scheduler.next_run().await.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_last_run_and_stop_leave_file_matching_memory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let scheduler = offline_scheduler(&dir).await;
    let store = StateStore::new(dir.path().join("schedule-state.json"));

    for _ in 0..25 {
        scheduler.start(ScheduleMode::Test).await.expect("start");

        let inner = Arc::clone(&scheduler.inner);
        let record = tokio::spawn(async move {
            inner
                .update_state(|s| s.last_run = Some(Utc::now()))
                .await
        });
        let stopped = scheduler.stop().await.expect("stop");
        record.await.expect("join").expect("save last run");

        assert!(!stopped.active);
        let persisted = store.load().expect("load");
        assert!(!persisted.active, "a stop must never be overwritten on disk");
        assert_eq!(persisted, scheduler.status().await);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn restarting_in_another_mode_replaces_triggers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let scheduler = offline_scheduler(&dir).await;

    scheduler.start(ScheduleMode::Test).await.expect("start test");
    assert_eq!(scheduler.registered_triggers().await, vec![TEST_TRIGGER]);

    scheduler
        .start(ScheduleMode::Standard)
        .await
        .expect("start standard");
    assert_eq!(scheduler.registered_triggers().await, standard_labels());

    scheduler
        .start(ScheduleMode::Standard)
        .await
        .expect("restart standard");
    assert_eq!(
        scheduler.registered_triggers().await.len(),
        9,
        "restart must not double-register"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn start_and_stop_persist_state() {
    let dir = tempfile::tempdir().expect("tempdir");
    let scheduler = offline_scheduler(&dir).await;
    let store = StateStore::new(dir.path().join("schedule-state.json"));

    scheduler.start(ScheduleMode::Test).await.expect("start");
    let persisted = store.load().expect("load");
    assert!(persisted.active);
    assert_eq!(persisted.mode, ScheduleMode::Test);

    let state = scheduler.stop().await.expect("stop");
    assert!(!state.active);
    assert_eq!(state.mode, ScheduleMode::Test, "stop keeps the mode");
    assert!(scheduler.registered_triggers().await.is_empty());

    let persisted = store.load().expect("load");
    assert!(!persisted.active);
    assert_eq!(persisted.mode, ScheduleMode::Test);
}

#[tokio::test(flavor = "multi_thread")]
async fn resume_rearms_previously_active_schedule() {
    let dir = tempfile::tempdir().expect("tempdir");
    StateStore::new(dir.path().join("schedule-state.json"))
        .save(&SchedulerState {
            active: true,
            mode: ScheduleMode::Test,
            last_run: None,
        })
        .expect("seed state");

    let scheduler = offline_scheduler(&dir).await;
    assert!(scheduler.registered_triggers().await.is_empty());

    assert!(scheduler.resume().await.expect("resume"));
    assert_eq!(scheduler.registered_triggers().await, vec![TEST_TRIGGER]);
    assert!(scheduler.status().await.active);
}

#[tokio::test(flavor = "multi_thread")]
async fn resume_leaves_inactive_schedule_stopped() {
    let dir = tempfile::tempdir().expect("tempdir");
    let scheduler = offline_scheduler(&dir).await;

    assert!(!scheduler.resume().await.expect("resume"));
    assert!(scheduler.registered_triggers().await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn corrupt_state_file_starts_inactive() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("schedule-state.json"), "{oops").expect("write");

    let scheduler = offline_scheduler(&dir).await;
    assert_eq!(scheduler.status().await, SchedulerState::default());
}

#[tokio::test(flavor = "multi_thread")]
async fn tick_after_stop_is_skipped() {
    let dir = tempfile::tempdir().expect("tempdir");
    let scheduler = offline_scheduler(&dir).await;

    assert_eq!(
        scheduler.execute_scheduled_post(TEST_TRIGGER).await,
        TickOutcome::Inactive
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn overlapping_tick_is_skipped() {
    let dir = tempfile::tempdir().expect("tempdir");
    let scheduler = offline_scheduler(&dir).await;
    scheduler.start(ScheduleMode::Test).await.expect("start");

    let _running = scheduler
        .inner
        .in_flight
        .try_acquire(TEST_TRIGGER)
        .expect("claim");
    assert_eq!(
        scheduler.execute_scheduled_post(TEST_TRIGGER).await,
        TickOutcome::Overlapping
    );
}

fn campaign_reply() -> serde_json::Value {
    let text = json!({
        "facebook": "fb copy",
        "instagram": "ig copy",
        "reels": "reels idea",
        "tiktok": "tiktok idea",
        "youtube": "yt title",
        "imagePrompt": "sunset ceremony on the beach"
    })
    .to_string();
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
}

#[tokio::test(flavor = "multi_thread")]
async fn content_failure_skips_remaining_steps() {
    let google = MockServer::start().await;
    let graph = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    Mock::given(method("POST"))
        .and(path("/models/gemini-test:generateContent"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": { "message": "The model is overloaded." }
        })))
        .expect(1)
        .mount(&google)
        .await;

    Mock::given(method("POST"))
        .and(path("/models/imagen-test:predict"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&google)
        .await;

    Mock::given(path_regex(".*"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&graph)
        .await;

    let config = test_config(
        &google.uri(),
        &graph.uri(),
        &dir.path().join("schedule-state.json"),
    );
    let scheduler = scheduler_for(&config).await;
    scheduler.start(ScheduleMode::Test).await.expect("start");

    let outcome = scheduler.execute_scheduled_post(TEST_TRIGGER).await;
    assert_eq!(outcome, TickOutcome::Failed(PipelineStep::Content));
    assert!(scheduler.status().await.last_run.is_none());
    assert!(StateStore::new(&config.state_path)
        .load()
        .expect("load")
        .last_run
        .is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn successful_tick_records_last_run() {
    let google = MockServer::start().await;
    let graph = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    Mock::given(method("POST"))
        .and(path("/models/gemini-test:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(campaign_reply()))
        .expect(1)
        .mount(&google)
        .await;

    Mock::given(method("POST"))
        .and(path("/models/imagen-test:predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "predictions": [{ "bytesBase64Encoded": "ZmFrZS1wbmc=", "mimeType": "image/png" }]
        })))
        .expect(1)
        .mount(&google)
        .await;

    Mock::given(method("GET"))
        .and(path("/1001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "page-token"
        })))
        .mount(&graph)
        .await;

    Mock::given(method("POST"))
        .and(path("/1001/photos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "photo-1" })))
        .expect(2)
        .mount(&graph)
        .await;

    Mock::given(method("POST"))
        .and(path("/1001/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "1001_1" })))
        .expect(1)
        .mount(&graph)
        .await;

    Mock::given(method("GET"))
        .and(path("/photo-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "images": [{ "width": 1024, "height": 1024, "source": "https://scontent.example/p.jpg" }]
        })))
        .mount(&graph)
        .await;

    Mock::given(method("POST"))
        .and(path("/1789/media"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "container-1" })))
        .mount(&graph)
        .await;

    Mock::given(method("GET"))
        .and(path("/container-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status_code": "FINISHED"
        })))
        .mount(&graph)
        .await;

    Mock::given(method("POST"))
        .and(path("/1789/media_publish"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "ig-1" })))
        .expect(1)
        .mount(&graph)
        .await;

    let config = test_config(
        &google.uri(),
        &graph.uri(),
        &dir.path().join("schedule-state.json"),
    );
    let scheduler = scheduler_for(&config).await;
    scheduler.start(ScheduleMode::Test).await.expect("start");

    let outcome = scheduler.execute_scheduled_post(TEST_TRIGGER).await;
    assert_eq!(outcome, TickOutcome::Completed);

    let last_run = scheduler.status().await.last_run;
    assert!(last_run.is_some());
    assert_eq!(
        StateStore::new(&config.state_path)
            .load()
            .expect("load")
            .last_run,
        last_run
    );
}
