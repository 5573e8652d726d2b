use crate::payload::{StartResponse, StatusPayload};
use crate::registry::JobKind;
use crate::state::{RunId, StatsGeneration};
use crate::stats::KnowledgeBaseStats;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Admin surface became visible; statistics are refreshed eagerly.
    AdminOpened,
    /// Admin surface is going away; every live poll loop is cancelled.
    AdminClosed,
    /// User clicked the launch control of a job kind.
    LaunchClicked { kind: JobKind },
    /// User asked to stop watching a job kind.
    CancelClicked { kind: JobKind },
    /// Engine got an answer (or a transport error) for a start request.
    StartResponded {
        kind: JobKind,
        run_id: RunId,
        result: Result<StartResponse, String>,
    },
    /// Engine observed a status payload for a job that is still active.
    StatusObserved {
        kind: JobKind,
        run_id: RunId,
        payload: StatusPayload,
    },
    /// Engine observed the first inactive status payload; its loop has exited.
    PollFinished {
        kind: JobKind,
        run_id: RunId,
        payload: StatusPayload,
    },
    /// A status request failed; the engine loop has exited.
    PollFailed {
        kind: JobKind,
        run_id: RunId,
        error: String,
    },
    /// Engine finished the knowledge-base snapshot fetch tagged `generation`.
    StatsRefreshed {
        generation: StatsGeneration,
        result: Result<KnowledgeBaseStats, String>,
    },
    /// Render tick used to coalesce view updates.
    Tick,
}
