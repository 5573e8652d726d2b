use std::sync::{Arc, Once};
use std::time::{Duration, Instant};

use ingest_core::{JobKind, KnowledgeBaseSnapshot, StartResponse, StatusPayload};
use ingest_engine::{
    ClientError, EngineEvent, EngineHandle, JobClient, MonitorSettings, ReqwestJobClient,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INTERVAL: Duration = Duration::from_millis(10);

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(ingest_logging::initialize_for_tests);
}

fn engine_for(server: &MockServer) -> EngineHandle {
    let settings = MonitorSettings {
        base_url: server.uri(),
        poll_interval: INTERVAL,
        ..MonitorSettings::default()
    };
    let client = ReqwestJobClient::new(&settings).expect("client");
    EngineHandle::with_client(Arc::new(client), settings.poll_interval)
}

/// Collects events until `done` matches one or the deadline passes.
fn collect_until(
    engine: &EngineHandle,
    timeout: Duration,
    done: impl Fn(&EngineEvent) -> bool,
) -> Vec<EngineEvent> {
    let deadline = Instant::now() + timeout;
    let mut events = Vec::new();
    while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
        match engine.recv_timeout(remaining) {
            Some(event) => {
                let finished = done(&event);
                events.push(event);
                if finished {
                    break;
                }
            }
            None => break,
        }
    }
    events
}

#[tokio::test(flavor = "multi_thread")]
async fn duplicate_start_commands_issue_one_request() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process_text"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(50))
                .set_body_json(serde_json::json!({"status": "started"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/text_status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"is_running": false, "completed": true})),
        )
        .mount(&server)
        .await;

    let engine = engine_for(&server);
    let events = tokio::task::spawn_blocking(move || {
        engine.start(JobKind::TextIngestion, 1);
        engine.start(JobKind::TextIngestion, 2);
        collect_until(&engine, Duration::from_secs(5), |event| {
            matches!(event, EngineEvent::PollFinished { .. })
        })
    })
    .await
    .expect("collector joined");

    let starts = events
        .iter()
        .filter(|event| matches!(event, EngineEvent::StartResponded { .. }))
        .count();
    assert_eq!(starts, 1);
    assert!(matches!(
        events.last(),
        Some(EngineEvent::PollFinished { run_id: 1, .. })
    ));
    server.verify().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn kind_can_be_started_again_after_run_ends() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process_pdfs"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "started"})),
        )
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pdf_status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"is_running": false, "progress": 100})),
        )
        .mount(&server)
        .await;

    let engine = engine_for(&server);
    let finished = tokio::task::spawn_blocking(move || {
        let mut finished = Vec::new();
        for run_id in [1, 2] {
            engine.start(JobKind::PdfIngestion, run_id);
            let events = collect_until(&engine, Duration::from_secs(5), |event| {
                matches!(event, EngineEvent::PollFinished { .. })
            });
            finished.extend(events.into_iter().filter_map(|event| match event {
                EngineEvent::PollFinished { run_id, .. } => Some(run_id),
                _ => None,
            }));
        }
        finished
    })
    .await
    .expect("collector joined");

    assert_eq!(finished, vec![1, 2]);
    server.verify().await;
}

/// Backend whose jobs finish on the first status poll.
struct InstantJobs;

#[async_trait::async_trait]
impl JobClient for InstantJobs {
    async fn start(&self, _kind: JobKind) -> Result<StartResponse, ClientError> {
        Ok(StartResponse {
            status: "started".to_string(),
            message: None,
        })
    }

    async fn status(&self, _kind: JobKind) -> Result<StatusPayload, ClientError> {
        Ok(StatusPayload {
            is_running: Some(false),
            progress: Some(100.0),
            ..StatusPayload::default()
        })
    }

    async fn snapshot(&self) -> Result<KnowledgeBaseSnapshot, ClientError> {
        Ok(KnowledgeBaseSnapshot::default())
    }
}

#[test]
fn relaunch_on_final_event_is_never_dropped() {
    init_logging();
    const RUNS: u64 = 200;
    let engine = EngineHandle::with_client(Arc::new(InstantJobs), Duration::ZERO);

    let mut finished = Vec::new();
    engine.start(JobKind::PdfIngestion, 1);
    while let Some(event) = engine.recv_timeout(Duration::from_secs(2)) {
        if let EngineEvent::PollFinished { run_id, .. } = event {
            finished.push(run_id);
            if run_id == RUNS {
                break;
            }
            engine.start(JobKind::PdfIngestion, run_id + 1);
        }
    }

    assert_eq!(finished, (1..=RUNS).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread")]
async fn cancel_stops_events_for_the_kind() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process_pdfs"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "started"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pdf_status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"is_running": true, "progress": 5})),
        )
        .mount(&server)
        .await;

    let engine = engine_for(&server);
    let late = tokio::task::spawn_blocking(move || {
        engine.start(JobKind::PdfIngestion, 1);
        let observed = collect_until(&engine, Duration::from_secs(5), |event| {
            matches!(event, EngineEvent::StatusObserved { .. })
        });
        assert!(!observed.is_empty());

        engine.cancel(JobKind::PdfIngestion);
        // Cancelling a kind with no live run is harmless.
        engine.cancel(JobKind::MedicalText);
        std::thread::sleep(INTERVAL * 5);
        while engine.try_recv().is_some() {}

        std::thread::sleep(INTERVAL * 10);
        engine.try_recv()
    })
    .await
    .expect("collector joined");

    assert_eq!(late, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn refresh_stats_emits_one_event() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/static/data/medical_data.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"symptoms": {}, "conditions": {}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let engine = engine_for(&server);
    let events = tokio::task::spawn_blocking(move || {
        engine.refresh_stats(3);
        collect_until(&engine, Duration::from_secs(5), |event| {
            matches!(event, EngineEvent::StatsRefreshed { .. })
        })
    })
    .await
    .expect("collector joined");

    assert!(matches!(
        events.as_slice(),
        [EngineEvent::StatsRefreshed {
            generation: 3,
            result: Ok(_)
        }]
    ));
    server.verify().await;
}
