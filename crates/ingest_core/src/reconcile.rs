use crate::payload::StatusPayload;
use crate::registry::{descriptor, JobKind};

const GENERIC_FAILURE: &str = "processing failed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalState {
    Succeeded,
    Failed(String),
}

/// Maps the final payload of a job that is no longer active to its terminal state.
///
/// Only the kind's completion predicate decides success. A job that stopped
/// without satisfying it is a failure, even if the backend sent no message.
pub fn reconcile(kind: JobKind, payload: &StatusPayload) -> TerminalState {
    if (descriptor(kind).is_done)(payload) {
        TerminalState::Succeeded
    } else {
        let message = payload
            .message
            .clone()
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());
        TerminalState::Failed(message)
    }
}
