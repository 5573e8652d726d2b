use std::future::Future;
use std::time::Duration;

use ingest_core::{descriptor, JobKind, KnowledgeBaseStats, RunId, StatsGeneration};
use ingest_logging::{ingest_debug, ingest_info, ingest_warn};
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, JobClient};

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// How a run ended. Every variant except `Cancelled` holds the run's final
/// event, which [`run_job`] leaves to the caller to emit.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEnd {
    /// Start refused or start request failed; holds the `StartResponded` event.
    NotStarted(EngineEvent),
    /// The job went inactive; holds `PollFinished`.
    Finished(EngineEvent),
    /// A status request failed; holds `PollFailed`.
    PollFailed(EngineEvent),
    Cancelled,
}

impl RunEnd {
    pub fn outcome(&self) -> &'static str {
        match self {
            RunEnd::NotStarted(_) => "not started",
            RunEnd::Finished(_) => "finished",
            RunEnd::PollFailed(_) => "poll failed",
            RunEnd::Cancelled => "cancelled",
        }
    }

    pub fn into_final_event(self) -> Option<EngineEvent> {
        match self {
            RunEnd::NotStarted(event) | RunEnd::Finished(event) | RunEnd::PollFailed(event) => {
                Some(event)
            }
            RunEnd::Cancelled => None,
        }
    }
}

/// Launches one run of `kind` and polls it until it is no longer active.
///
/// Every request waits for the previous one to resolve, so status events are
/// emitted in request order. No event is emitted once `cancel` has fired.
/// The final event is returned instead of emitted, so the caller can release
/// the run before anyone observes its end.
pub async fn run_job(
    client: &dyn JobClient,
    kind: JobKind,
    run_id: RunId,
    poll_interval: Duration,
    cancel: &CancellationToken,
    sink: &dyn EventSink,
) -> RunEnd {
    let job = descriptor(kind);

    ingest_info!("Starting {} run={}", kind, run_id);
    let Some(start) = until_cancelled(cancel, client.start(kind)).await else {
        return RunEnd::Cancelled;
    };
    if cancel.is_cancelled() {
        return RunEnd::Cancelled;
    }
    let accepted = match &start {
        Ok(response) => {
            let outcome = (job.classify_start)(response);
            ingest_info!("{} run={} start answered {:?}", kind, run_id, outcome);
            outcome.is_accepted()
        }
        Err(err) => {
            ingest_warn!("{} run={} start request failed: {}", kind, run_id, err);
            false
        }
    };
    let responded = EngineEvent::StartResponded {
        kind,
        run_id,
        result: start,
    };
    if !accepted {
        return RunEnd::NotStarted(responded);
    }
    sink.emit(responded);

    let mut tick: u64 = 0;
    loop {
        if until_cancelled(cancel, tokio::time::sleep(poll_interval))
            .await
            .is_none()
        {
            return RunEnd::Cancelled;
        }
        tick += 1;

        let Some(status) = until_cancelled(cancel, client.status(kind)).await else {
            return RunEnd::Cancelled;
        };
        if cancel.is_cancelled() {
            return RunEnd::Cancelled;
        }
        match status {
            Ok(payload) if (job.is_active)(&payload) => {
                ingest_debug!(
                    "{} run={} tick={} active progress={:?}",
                    kind,
                    run_id,
                    tick,
                    payload.progress
                );
                sink.emit(EngineEvent::StatusObserved {
                    kind,
                    run_id,
                    payload,
                });
            }
            Ok(payload) => {
                ingest_info!("{} run={} inactive after {} polls", kind, run_id, tick);
                return RunEnd::Finished(EngineEvent::PollFinished {
                    kind,
                    run_id,
                    payload,
                });
            }
            Err(error) => {
                ingest_warn!("{} run={} status poll failed: {}", kind, run_id, error);
                return RunEnd::PollFailed(EngineEvent::PollFailed {
                    kind,
                    run_id,
                    error,
                });
            }
        }
    }
}

/// Fetches the knowledge-base snapshot and emits its counts tagged with `generation`.
pub async fn refresh_stats(
    client: &dyn JobClient,
    generation: StatsGeneration,
    sink: &dyn EventSink,
) {
    let result = client
        .snapshot()
        .await
        .map(|snapshot| KnowledgeBaseStats::from_snapshot(&snapshot));
    match &result {
        Ok(stats) => ingest_info!(
            "Knowledge base: {} symptoms, {} conditions",
            stats.symptoms,
            stats.conditions
        ),
        Err(err) => ingest_warn!("Knowledge base snapshot unavailable: {}", err),
    }
    sink.emit(EngineEvent::StatsRefreshed { generation, result });
}

async fn until_cancelled<F: Future>(cancel: &CancellationToken, future: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        output = future => Some(output),
    }
}
