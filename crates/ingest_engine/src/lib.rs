//! Ingestion monitor engine: HTTP client, launch/poll tasks and effect execution.
mod client;
mod engine;
mod monitor;
mod settings;
mod types;

pub use client::{JobClient, ReqwestJobClient};
pub use engine::EngineHandle;
pub use monitor::{refresh_stats, run_job, ChannelEventSink, EventSink, RunEnd};
pub use settings::MonitorSettings;
pub use types::{ClientError, EngineEvent, FailureKind};
