use thiserror::Error;

use crate::registry::JobKind;

/// Every failure the monitor can surface. None of these propagate past the
/// monitor; they end up as a message on the job panel or the stats panel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonitorError {
    #[error("{kind} start rejected by server (status `{status}`){}", with_message(.message))]
    LaunchRejected {
        kind: JobKind,
        status: String,
        message: Option<String>,
    },
    #[error("{kind} request failed: {detail}")]
    Transport { kind: JobKind, detail: String },
    /// Carries the server message verbatim.
    #[error("{0}")]
    JobFailed(String),
    #[error("knowledge base statistics unavailable: {0}")]
    StatsUnavailable(String),
}

fn with_message(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}
