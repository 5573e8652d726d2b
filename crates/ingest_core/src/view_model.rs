use crate::payload::ProgressReport;
use crate::registry::JobKind;
use crate::state::JobRunState;
use crate::stats::KnowledgeBaseStats;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AdminViewModel {
    pub jobs: Vec<JobPanelView>,
    pub stats: StatsView,
    pub dirty: bool,
}

impl AdminViewModel {
    pub fn job(&self, kind: JobKind) -> Option<&JobPanelView> {
        self.jobs.iter().find(|job| job.kind == kind)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobPanelView {
    pub kind: JobKind,
    pub label: &'static str,
    pub state: JobRunState,
    /// Most recent progress reported by the server, kept after the job ends.
    pub progress: Option<ProgressReport>,
    /// False while a run is starting or running.
    pub launch_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum StatsView {
    #[default]
    NotLoaded,
    Loading,
    Available(KnowledgeBaseStats),
    Unavailable(String),
}
