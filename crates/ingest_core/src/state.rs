use std::collections::BTreeMap;

use crate::payload::ProgressReport;
use crate::registry::{descriptor, JobKind};
use crate::stats::KnowledgeBaseStats;
use crate::view_model::{AdminViewModel, JobPanelView, StatsView};

pub type RunId = u64;

/// Tags a stats fetch; only the answer to the latest request is applied.
pub type StatsGeneration = u64;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum JobRunState {
    #[default]
    Idle,
    /// Start request in flight.
    Starting,
    Running {
        progress: Option<ProgressReport>,
    },
    Succeeded,
    Failed(String),
}

impl JobRunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobRunState::Succeeded | JobRunState::Failed(_))
    }
}

/// Per-kind monitor. `active_run` is set from launch until the run reaches a
/// terminal state or is cancelled; while set, further launches attach to it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobMonitor {
    run_state: JobRunState,
    last_progress: Option<ProgressReport>,
    active_run: Option<RunId>,
}

impl JobMonitor {
    pub fn run_state(&self) -> &JobRunState {
        &self.run_state
    }

    pub fn last_progress(&self) -> Option<&ProgressReport> {
        self.last_progress.as_ref()
    }

    pub fn active_run(&self) -> Option<RunId> {
        self.active_run
    }

    pub fn is_active(&self) -> bool {
        self.active_run.is_some()
    }

    pub(crate) fn accepts(&self, run_id: RunId) -> bool {
        self.active_run == Some(run_id)
    }

    pub(crate) fn begin(&mut self, run_id: RunId) {
        self.run_state = JobRunState::Starting;
        self.last_progress = None;
        self.active_run = Some(run_id);
    }

    pub(crate) fn set_running(&mut self, progress: Option<ProgressReport>) {
        self.record_progress(progress.clone());
        self.run_state = JobRunState::Running { progress };
    }

    pub(crate) fn record_progress(&mut self, progress: Option<ProgressReport>) {
        if progress.is_some() {
            self.last_progress = progress;
        }
    }

    pub(crate) fn finish(&mut self, state: JobRunState) {
        debug_assert!(state.is_terminal());
        self.run_state = state;
        self.active_run = None;
    }

    /// Detaches from the run without touching the visible state.
    pub(crate) fn detach(&mut self) -> Option<RunId> {
        self.active_run.take()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) enum StatsState {
    #[default]
    NotLoaded,
    Loading,
    Loaded(KnowledgeBaseStats),
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdminState {
    monitors: BTreeMap<JobKind, JobMonitor>,
    stats: StatsState,
    stats_generation: StatsGeneration,
    next_run_id: RunId,
    dirty: bool,
}

impl Default for AdminState {
    fn default() -> Self {
        Self {
            monitors: JobKind::ALL
                .into_iter()
                .map(|kind| (kind, JobMonitor::default()))
                .collect(),
            stats: StatsState::default(),
            stats_generation: 0,
            next_run_id: 1,
            dirty: false,
        }
    }
}

impl AdminState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn monitor(&self, kind: JobKind) -> &JobMonitor {
        // Every kind is inserted at construction and never removed.
        &self.monitors[&kind]
    }

    pub fn run_state(&self, kind: JobKind) -> &JobRunState {
        self.monitor(kind).run_state()
    }

    pub fn any_active(&self) -> bool {
        self.monitors.values().any(JobMonitor::is_active)
    }

    pub fn stats_settled(&self) -> bool {
        !matches!(self.stats, StatsState::Loading)
    }

    pub fn view(&self) -> AdminViewModel {
        let jobs = self
            .monitors
            .iter()
            .map(|(&kind, monitor)| JobPanelView {
                kind,
                label: descriptor(kind).label,
                state: monitor.run_state.clone(),
                progress: monitor.last_progress.clone(),
                launch_enabled: !monitor.is_active(),
            })
            .collect();
        let stats = match &self.stats {
            StatsState::NotLoaded => StatsView::NotLoaded,
            StatsState::Loading => StatsView::Loading,
            StatsState::Loaded(stats) => StatsView::Available(*stats),
            StatsState::Unavailable(message) => StatsView::Unavailable(message.clone()),
        };
        AdminViewModel {
            jobs,
            stats,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn monitor_mut(&mut self, kind: JobKind) -> &mut JobMonitor {
        self.monitors.entry(kind).or_default()
    }

    pub(crate) fn allocate_run_id(&mut self) -> RunId {
        let id = self.next_run_id;
        self.next_run_id += 1;
        id
    }

    pub(crate) fn active_kinds(&self) -> Vec<JobKind> {
        self.monitors
            .iter()
            .filter(|(_, monitor)| monitor.is_active())
            .map(|(&kind, _)| kind)
            .collect()
    }

    /// Marks stats as loading and returns the generation of the new request.
    pub(crate) fn request_stats(&mut self) -> StatsGeneration {
        self.stats_generation += 1;
        self.stats = StatsState::Loading;
        self.stats_generation
    }

    /// Applies a fetch result unless a newer request superseded it.
    pub(crate) fn settle_stats(&mut self, generation: StatsGeneration, stats: StatsState) -> bool {
        if generation != self.stats_generation {
            return false;
        }
        self.stats = stats;
        true
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
