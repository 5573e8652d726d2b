use std::fmt;
use std::str::FromStr;

use crate::payload::{ProgressReport, StartResponse, StatusPayload};

/// Backend ingestion task categories the admin surface can launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JobKind {
    /// PDF text extraction into the knowledge base. Reports a percentage.
    PdfIngestion,
    /// Regional-disease text parsing. Reports a discrete `completed` flag.
    TextIngestion,
    /// Common-disease medical text processing. Reports a status string.
    MedicalText,
}

impl JobKind {
    pub const ALL: [JobKind; 3] = [
        JobKind::PdfIngestion,
        JobKind::TextIngestion,
        JobKind::MedicalText,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JobKind::PdfIngestion => "pdf_ingestion",
            JobKind::TextIngestion => "text_ingestion",
            JobKind::MedicalText => "medical_text",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown job kind `{0}` (expected one of pdf_ingestion, text_ingestion, medical_text)")]
pub struct ParseJobKindError(pub String);

impl FromStr for JobKind {
    type Err = ParseJobKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseJobKindError(s.to_string()))
    }
}

/// Classification of the immediate response to a start request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// The backend was already working on this kind; attach to it.
    AlreadyRunning,
    /// Anything else. Carries the reported status for the error message.
    Rejected { status: String },
}

impl StartOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, StartOutcome::Started | StartOutcome::AlreadyRunning)
    }
}

/// Static description of one job kind: where to talk to it and how to read its status.
pub struct JobDescriptor {
    pub kind: JobKind,
    pub label: &'static str,
    pub start_path: &'static str,
    pub status_path: &'static str,
    /// True while the backend still works on the job; polling continues.
    pub is_active: fn(&StatusPayload) -> bool,
    /// Completion predicate, consulted only once the job is no longer active.
    pub is_done: fn(&StatusPayload) -> bool,
    pub classify_start: fn(&StartResponse) -> StartOutcome,
}

impl fmt::Debug for JobDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobDescriptor")
            .field("kind", &self.kind)
            .field("start_path", &self.start_path)
            .field("status_path", &self.status_path)
            .finish_non_exhaustive()
    }
}

static DESCRIPTORS: [JobDescriptor; 3] = [
    JobDescriptor {
        kind: JobKind::PdfIngestion,
        label: "PDF ingestion",
        start_path: "/process_pdfs",
        status_path: "/pdf_status",
        is_active: running_flag,
        is_done: progress_complete,
        classify_start: classify_by_status,
    },
    JobDescriptor {
        kind: JobKind::TextIngestion,
        label: "Regional disease text",
        start_path: "/process_text",
        status_path: "/text_status",
        is_active: running_flag,
        is_done: completed_flag,
        classify_start: classify_by_status,
    },
    JobDescriptor {
        kind: JobKind::MedicalText,
        label: "Medical text",
        start_path: "/start_process_medical_data",
        status_path: "/get_medical_data_status",
        is_active: status_in_progress,
        is_done: status_completed,
        classify_start: classify_with_in_progress_error,
    },
];

pub fn descriptor(kind: JobKind) -> &'static JobDescriptor {
    match kind {
        JobKind::PdfIngestion => &DESCRIPTORS[0],
        JobKind::TextIngestion => &DESCRIPTORS[1],
        JobKind::MedicalText => &DESCRIPTORS[2],
    }
}

fn running_flag(payload: &StatusPayload) -> bool {
    payload.is_running.unwrap_or(false)
}

fn progress_complete(payload: &StatusPayload) -> bool {
    payload.progress.map(ProgressReport::clamp_percent) == Some(100.0)
}

fn completed_flag(payload: &StatusPayload) -> bool {
    payload.completed == Some(true)
}

// The worker sets `processing` as soon as it runs; `not_started` seen while polling
// means the backend lost the run (e.g. it restarted).
fn status_in_progress(payload: &StatusPayload) -> bool {
    payload.status.as_deref() == Some("processing")
}

fn status_completed(payload: &StatusPayload) -> bool {
    payload.status.as_deref() == Some("completed")
}

fn classify_by_status(response: &StartResponse) -> StartOutcome {
    match response.status.as_str() {
        "started" => StartOutcome::Started,
        "already_running" => StartOutcome::AlreadyRunning,
        other => StartOutcome::Rejected {
            status: other.to_string(),
        },
    }
}

// The medical-text endpoint reports a duplicate start as an error with a fixed message.
fn classify_with_in_progress_error(response: &StartResponse) -> StartOutcome {
    let in_progress = response.status == "error"
        && response
            .message
            .as_deref()
            .is_some_and(|message| message.to_ascii_lowercase().contains("already in progress"));
    if in_progress {
        StartOutcome::AlreadyRunning
    } else {
        classify_by_status(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> StatusPayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn registry_covers_every_kind() {
        for kind in JobKind::ALL {
            assert_eq!(descriptor(kind).kind, kind);
        }
    }

    #[test]
    fn job_kind_parses_its_own_name() {
        for kind in JobKind::ALL {
            assert_eq!(kind.to_string().parse::<JobKind>(), Ok(kind));
        }
        assert!("pdf".parse::<JobKind>().is_err());
    }

    #[test]
    fn pdf_done_means_progress_reached_100() {
        let pdf = descriptor(JobKind::PdfIngestion);
        assert!((pdf.is_done)(&payload(r#"{"is_running":false,"progress":100}"#)));
        assert!(!(pdf.is_done)(&payload(r#"{"is_running":false,"progress":99.5}"#)));
        assert!(!(pdf.is_done)(&payload(r#"{"is_running":false}"#)));
    }

    #[test]
    fn text_done_ignores_progress() {
        let text = descriptor(JobKind::TextIngestion);
        assert!(!(text.is_done)(&payload(r#"{"progress":100,"completed":false}"#)));
        assert!((text.is_done)(&payload(r#"{"completed":true}"#)));
    }

    #[test]
    fn medical_text_is_active_only_while_processing() {
        let medical = descriptor(JobKind::MedicalText);
        assert!((medical.is_active)(&payload(r#"{"status":"processing"}"#)));
        assert!(!(medical.is_active)(&payload(r#"{"status":"not_started"}"#)));
        assert!(!(medical.is_active)(&payload(r#"{"status":"error"}"#)));
        assert!((medical.is_done)(&payload(r#"{"status":"completed"}"#)));
    }

    #[test]
    fn medical_text_duplicate_start_is_already_running() {
        let medical = descriptor(JobKind::MedicalText);
        let response = StartResponse {
            status: "error".to_string(),
            message: Some("Processing already in progress".to_string()),
        };
        assert_eq!((medical.classify_start)(&response), StartOutcome::AlreadyRunning);

        let other = StartResponse {
            status: "error".to_string(),
            message: Some("disk full".to_string()),
        };
        assert_eq!(
            (medical.classify_start)(&other),
            StartOutcome::Rejected {
                status: "error".to_string()
            }
        );
    }
}
