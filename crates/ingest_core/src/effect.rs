use crate::registry::JobKind;
use crate::state::{RunId, StatsGeneration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Send the start request and, once accepted, poll until the job is inactive.
    StartJob { kind: JobKind, run_id: RunId },
    /// Stop the live poll loop of a kind. Harmless if none is live.
    CancelJob { kind: JobKind },
    /// Fetch the knowledge-base snapshot and report its counts under `generation`.
    RefreshStats { generation: StatsGeneration },
}
