//! Ingestion monitor core: pure state machine, job registry and view-model helpers.
//!
//! Nothing in this crate performs IO. The engine executes [`Effect`]s and feeds
//! the outcomes back as [`Msg`]s through [`update`].
mod effect;
mod error;
mod msg;
mod payload;
mod reconcile;
mod registry;
mod state;
mod stats;
mod update;
mod view_model;

pub use effect::Effect;
pub use error::MonitorError;
pub use msg::Msg;
pub use payload::{ProgressReport, StartResponse, StatusPayload};
pub use reconcile::{reconcile, TerminalState};
pub use registry::{descriptor, JobDescriptor, JobKind, ParseJobKindError, StartOutcome};
pub use state::{AdminState, JobMonitor, JobRunState, RunId, StatsGeneration};
pub use stats::{Collection, KnowledgeBaseSnapshot, KnowledgeBaseStats, RegionalDisease};
pub use update::update;
pub use view_model::{AdminViewModel, JobPanelView, StatsView};
