use serde::Deserialize;

/// Body of a start request response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StartResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of a status request response. Every field is optional because each job
/// kind reports a different subset.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct StatusPayload {
    pub is_running: Option<bool>,
    pub progress: Option<f64>,
    pub processed: Option<u64>,
    pub total: Option<u64>,
    pub message: Option<String>,
    pub completed: Option<bool>,
    pub status: Option<String>,
}

/// Advisory progress for display. A missing field means "not reported", never zero.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressReport {
    pub percent: Option<f64>,
    pub processed: Option<u64>,
    pub total: Option<u64>,
    pub message: Option<String>,
}

impl ProgressReport {
    /// Extracts whatever progress the payload carries, or `None` if it carries none.
    ///
    /// The percentage is passed through as received apart from clamping to 0..=100.
    pub fn from_payload(payload: &StatusPayload) -> Option<Self> {
        let report = Self {
            percent: payload.progress.map(Self::clamp_percent),
            processed: payload.processed,
            total: payload.total,
            message: payload.message.clone(),
        };
        if report == Self::default() {
            None
        } else {
            Some(report)
        }
    }

    pub fn clamp_percent(value: f64) -> f64 {
        value.clamp(0.0, 100.0)
    }
}
