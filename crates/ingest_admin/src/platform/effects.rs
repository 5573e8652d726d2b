use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use ingest_core::{Effect, Msg};
use ingest_engine::{ClientError, EngineEvent, EngineHandle, MonitorSettings};
use ingest_logging::{ingest_info, ingest_warn};

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: MonitorSettings, msg_tx: mpsc::Sender<Msg>) -> Result<Self, ClientError> {
        ingest_info!(
            "Monitoring {} every {:?}",
            settings.base_url,
            settings.poll_interval
        );
        let engine = EngineHandle::new(settings)?;
        let runner = Self { engine };
        runner.spawn_event_loop(msg_tx);
        Ok(runner)
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartJob { kind, run_id } => {
                    ingest_info!("StartJob kind={} run_id={}", kind, run_id);
                    self.engine.start(kind, run_id);
                }
                Effect::CancelJob { kind } => {
                    ingest_info!("CancelJob kind={}", kind);
                    self.engine.cancel(kind);
                }
                Effect::RefreshStats { generation } => self.engine.refresh_stats(generation),
            }
        }
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            let Some(event) = engine.recv_timeout(Duration::from_millis(100)) else {
                continue;
            };
            if msg_tx.send(map_event(event)).is_err() {
                break;
            }
        });
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::StartResponded {
            kind,
            run_id,
            result,
        } => Msg::StartResponded {
            kind,
            run_id,
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::StatusObserved {
            kind,
            run_id,
            payload,
        } => Msg::StatusObserved {
            kind,
            run_id,
            payload,
        },
        EngineEvent::PollFinished {
            kind,
            run_id,
            payload,
        } => Msg::PollFinished {
            kind,
            run_id,
            payload,
        },
        EngineEvent::PollFailed {
            kind,
            run_id,
            error,
        } => {
            ingest_warn!("{} run={} failed: {}", kind, run_id, error);
            Msg::PollFailed {
                kind,
                run_id,
                error: error.to_string(),
            }
        }
        EngineEvent::StatsRefreshed { generation, result } => Msg::StatsRefreshed {
            generation,
            result: result.map_err(|err| err.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use ingest_core::{JobKind, StatusPayload};
    use ingest_engine::FailureKind;

    use super::*;

    #[test]
    fn poll_failure_carries_error_text() {
        let msg = map_event(EngineEvent::PollFailed {
            kind: JobKind::PdfIngestion,
            run_id: 3,
            error: ClientError {
                kind: FailureKind::HttpStatus(502),
                message: "502 Bad Gateway".to_string(),
            },
        });
        assert_eq!(
            msg,
            Msg::PollFailed {
                kind: JobKind::PdfIngestion,
                run_id: 3,
                error: "http status 502: 502 Bad Gateway".to_string(),
            }
        );
    }

    #[test]
    fn payloads_pass_through_untouched() {
        let payload = StatusPayload {
            is_running: Some(true),
            progress: Some(12.5),
            ..StatusPayload::default()
        };
        let msg = map_event(EngineEvent::StatusObserved {
            kind: JobKind::TextIngestion,
            run_id: 1,
            payload: payload.clone(),
        });
        assert_eq!(
            msg,
            Msg::StatusObserved {
                kind: JobKind::TextIngestion,
                run_id: 1,
                payload,
            }
        );
    }
}
