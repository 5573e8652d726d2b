use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_SNAPSHOT_PATH: &str = "/static/data/medical_data.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSettings {
    pub base_url: String,
    /// Delay between the previous status response and the next status request.
    pub poll_interval: Duration,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub snapshot_path: String,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            snapshot_path: DEFAULT_SNAPSHOT_PATH.to_string(),
        }
    }
}
