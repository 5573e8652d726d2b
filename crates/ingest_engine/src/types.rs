use std::fmt;

use ingest_core::{
    JobKind, KnowledgeBaseStats, RunId, StartResponse, StatsGeneration, StatusPayload,
};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    StartResponded {
        kind: JobKind,
        run_id: RunId,
        result: Result<StartResponse, ClientError>,
    },
    StatusObserved {
        kind: JobKind,
        run_id: RunId,
        payload: StatusPayload,
    },
    /// Final event of a run whose job is no longer active.
    PollFinished {
        kind: JobKind,
        run_id: RunId,
        payload: StatusPayload,
    },
    PollFailed {
        kind: JobKind,
        run_id: RunId,
        error: ClientError,
    },
    StatsRefreshed {
        generation: StatsGeneration,
        result: Result<KnowledgeBaseStats, ClientError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ClientError {
    pub kind: FailureKind,
    pub message: String,
}

impl ClientError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    MalformedBody,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::MalformedBody => write!(f, "malformed response body"),
        }
    }
}
