use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use ingest_core::{JobKind, RunId, StatsGeneration};
use ingest_logging::{ingest_debug, ingest_error, ingest_info, ingest_warn};
use tokio::sync::mpsc as async_mpsc;
use tokio_util::sync::CancellationToken;

use crate::monitor::{refresh_stats, run_job, ChannelEventSink, EventSink, RunEnd};
use crate::{ClientError, EngineEvent, JobClient, MonitorSettings, ReqwestJobClient};

enum EngineCommand {
    Start { kind: JobKind, run_id: RunId },
    Cancel { kind: JobKind },
    RefreshStats { generation: StatsGeneration },
}

/// Handle to the engine thread. Commands are fire-and-forget; outcomes arrive
/// as [`EngineEvent`]s. Dropping every handle cancels all live runs.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: async_mpsc::UnboundedSender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(settings: MonitorSettings) -> Result<Self, ClientError> {
        let client = ReqwestJobClient::new(&settings)?;
        Ok(Self::with_client(Arc::new(client), settings.poll_interval))
    }

    pub fn with_client(client: Arc<dyn JobClient>, poll_interval: Duration) -> Self {
        let (cmd_tx, cmd_rx) = async_mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();
        let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    ingest_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };
            let dispatcher = Dispatcher::new(client, sink, poll_interval);
            runtime.block_on(dispatcher.run(cmd_rx));
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    /// Starts a run unless one is already live for `kind`, in which case the
    /// command is ignored. A run stops being live before its final event is
    /// delivered, so a start issued in reaction to that event is honoured.
    pub fn start(&self, kind: JobKind, run_id: RunId) {
        let _ = self.cmd_tx.send(EngineCommand::Start { kind, run_id });
    }

    /// Stops the live run of `kind`, if any. Safe to call at any time.
    pub fn cancel(&self, kind: JobKind) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel { kind });
    }

    pub fn refresh_stats(&self, generation: StatsGeneration) {
        let _ = self.cmd_tx.send(EngineCommand::RefreshStats { generation });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }
}

struct LiveRun {
    run_id: RunId,
    cancel: CancellationToken,
}

struct Released {
    kind: JobKind,
    run_id: RunId,
    end: RunEnd,
}

/// Owns the table of live runs. Runs hand their final event back over
/// `release_tx`; the dispatcher frees the slot and only then emits it.
struct Dispatcher {
    client: Arc<dyn JobClient>,
    sink: Arc<dyn EventSink>,
    poll_interval: Duration,
    live: HashMap<JobKind, LiveRun>,
    release_tx: async_mpsc::UnboundedSender<Released>,
    release_rx: async_mpsc::UnboundedReceiver<Released>,
}

impl Dispatcher {
    fn new(client: Arc<dyn JobClient>, sink: Arc<dyn EventSink>, poll_interval: Duration) -> Self {
        let (release_tx, release_rx) = async_mpsc::unbounded_channel();
        Self {
            client,
            sink,
            poll_interval,
            live: HashMap::new(),
            release_tx,
            release_rx,
        }
    }

    async fn run(mut self, mut cmd_rx: async_mpsc::UnboundedReceiver<EngineCommand>) {
        loop {
            tokio::select! {
                command = cmd_rx.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                Some(released) = self.release_rx.recv() => self.release(released),
            }
        }
        ingest_debug!("Engine handle dropped; cancelling {} live runs", self.live.len());
        for (_, run) in self.live.drain() {
            run.cancel.cancel();
        }
    }

    fn handle(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Start { kind, run_id } => self.start(kind, run_id),
            EngineCommand::Cancel { kind } => {
                if let Some(run) = self.live.remove(&kind) {
                    ingest_info!("Cancelling {} run={}", kind, run.run_id);
                    run.cancel.cancel();
                }
            }
            EngineCommand::RefreshStats { generation } => {
                let client = self.client.clone();
                let sink = self.sink.clone();
                tokio::spawn(async move {
                    refresh_stats(client.as_ref(), generation, sink.as_ref()).await;
                });
            }
        }
    }

    fn start(&mut self, kind: JobKind, run_id: RunId) {
        if let Some(existing) = self.live.get(&kind) {
            ingest_warn!(
                "Ignoring start of {} run={}: run={} is still live",
                kind,
                run_id,
                existing.run_id
            );
            return;
        }

        let cancel = CancellationToken::new();
        self.live.insert(
            kind,
            LiveRun {
                run_id,
                cancel: cancel.clone(),
            },
        );

        let client = self.client.clone();
        let sink = self.sink.clone();
        let release_tx = self.release_tx.clone();
        let poll_interval = self.poll_interval;
        tokio::spawn(async move {
            let end = run_job(
                client.as_ref(),
                kind,
                run_id,
                poll_interval,
                &cancel,
                sink.as_ref(),
            )
            .await;
            ingest_info!("{} run={} ended: {}", kind, run_id, end.outcome());
            let _ = release_tx.send(Released { kind, run_id, end });
        });
    }

    fn release(&mut self, released: Released) {
        let Released { kind, run_id, end } = released;
        // A cancelled run may report after a newer run for the same kind took its slot.
        if !self.live.get(&kind).is_some_and(|run| run.run_id == run_id) {
            ingest_debug!("Dropping end of {} run={}: no longer live", kind, run_id);
            return;
        }
        self.live.remove(&kind);
        if let Some(event) = end.into_final_event() {
            self.sink.emit(event);
        }
    }
}
