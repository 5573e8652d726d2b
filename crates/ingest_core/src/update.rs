use crate::payload::{ProgressReport, StartResponse};
use crate::reconcile::{reconcile, TerminalState};
use crate::registry::{descriptor, JobKind, StartOutcome};
use crate::state::{AdminState, JobRunState, RunId, StatsState};
use crate::{Effect, MonitorError, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AdminState, msg: Msg) -> (AdminState, Vec<Effect>) {
    let effects = match msg {
        Msg::AdminOpened => {
            let generation = state.request_stats();
            state.mark_dirty();
            vec![Effect::RefreshStats { generation }]
        }
        Msg::AdminClosed => {
            let kinds = state.active_kinds();
            for kind in &kinds {
                state.monitor_mut(*kind).detach();
            }
            if !kinds.is_empty() {
                state.mark_dirty();
            }
            kinds
                .into_iter()
                .map(|kind| Effect::CancelJob { kind })
                .collect()
        }
        Msg::LaunchClicked { kind } => {
            if state.monitor(kind).is_active() {
                // Attach to the live run instead of issuing a second start request.
                return (state, Vec::new());
            }
            let run_id = state.allocate_run_id();
            state.monitor_mut(kind).begin(run_id);
            state.mark_dirty();
            vec![Effect::StartJob { kind, run_id }]
        }
        Msg::CancelClicked { kind } => {
            if state.monitor_mut(kind).detach().is_some() {
                state.mark_dirty();
                vec![Effect::CancelJob { kind }]
            } else {
                Vec::new()
            }
        }
        Msg::StartResponded {
            kind,
            run_id,
            result,
        } => {
            if !is_current(&state, kind, run_id) {
                return (state, Vec::new());
            }
            apply_start_response(&mut state, kind, result);
            Vec::new()
        }
        Msg::StatusObserved {
            kind,
            run_id,
            payload,
        } => {
            if !is_current(&state, kind, run_id) {
                return (state, Vec::new());
            }
            state
                .monitor_mut(kind)
                .set_running(ProgressReport::from_payload(&payload));
            state.mark_dirty();
            Vec::new()
        }
        Msg::PollFinished {
            kind,
            run_id,
            payload,
        } => {
            if !is_current(&state, kind, run_id) {
                return (state, Vec::new());
            }
            let monitor = state.monitor_mut(kind);
            monitor.record_progress(ProgressReport::from_payload(&payload));
            let effects = match reconcile(kind, &payload) {
                TerminalState::Succeeded => {
                    monitor.finish(JobRunState::Succeeded);
                    let generation = state.request_stats();
                    vec![Effect::RefreshStats { generation }]
                }
                TerminalState::Failed(message) => {
                    let message = MonitorError::JobFailed(message).to_string();
                    monitor.finish(JobRunState::Failed(message));
                    Vec::new()
                }
            };
            state.mark_dirty();
            effects
        }
        Msg::PollFailed {
            kind,
            run_id,
            error,
        } => {
            if !is_current(&state, kind, run_id) {
                return (state, Vec::new());
            }
            let message = MonitorError::Transport {
                kind,
                detail: error,
            }
            .to_string();
            state.monitor_mut(kind).finish(JobRunState::Failed(message));
            state.mark_dirty();
            Vec::new()
        }
        Msg::StatsRefreshed { generation, result } => {
            let stats = match result {
                Ok(stats) => StatsState::Loaded(stats),
                Err(detail) => {
                    StatsState::Unavailable(MonitorError::StatsUnavailable(detail).to_string())
                }
            };
            // Answers to superseded requests are dropped.
            if state.settle_stats(generation, stats) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

/// Events from a cancelled or superseded run are dropped.
fn is_current(state: &AdminState, kind: JobKind, run_id: RunId) -> bool {
    state.monitor(kind).accepts(run_id)
}

fn apply_start_response(
    state: &mut AdminState,
    kind: JobKind,
    result: Result<StartResponse, String>,
) {
    let monitor = state.monitor_mut(kind);
    match result {
        Ok(response) => match (descriptor(kind).classify_start)(&response) {
            StartOutcome::Started | StartOutcome::AlreadyRunning => monitor.set_running(None),
            StartOutcome::Rejected { status } => {
                let error = MonitorError::LaunchRejected {
                    kind,
                    status,
                    message: response.message,
                };
                monitor.finish(JobRunState::Failed(error.to_string()));
            }
        },
        Err(detail) => {
            let error = MonitorError::Transport { kind, detail };
            monitor.finish(JobRunState::Failed(error.to_string()));
        }
    }
    state.mark_dirty();
}
