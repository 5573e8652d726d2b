use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use ingest_engine::MonitorSettings;
use ingest_logging::ingest_info;
use serde::{Deserialize, Serialize};

use super::cli::AdminArgs;

const DEFAULT_CONFIG_FILE: &str = "ingest_admin.ron";

/// Admin shell configuration loaded from a RON file. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    /// Path of the knowledge-base snapshot, relative to `base_url`.
    pub snapshot_path: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        let settings = MonitorSettings::default();
        Self {
            base_url: settings.base_url,
            poll_interval_ms: millis(settings.poll_interval),
            connect_timeout_ms: millis(settings.connect_timeout),
            request_timeout_ms: millis(settings.request_timeout),
            snapshot_path: settings.snapshot_path,
        }
    }
}

impl AdminConfig {
    /// Loads `path`, or `./ingest_admin.ron` when no path is given.
    ///
    /// An explicitly named file must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound && !required => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read config {:?}", path));
            }
        };

        let config = ron::from_str(&content)
            .with_context(|| format!("failed to parse config {:?}", path))?;
        ingest_info!("Loaded admin config from {:?}", path);
        Ok(config)
    }

    /// Applies command-line overrides.
    pub fn merge_args(mut self, args: &AdminArgs) -> Self {
        if let Some(base_url) = &args.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(interval) = args.poll_interval_ms {
            self.poll_interval_ms = interval;
        }
        self
    }

    pub fn to_settings(&self) -> MonitorSettings {
        MonitorSettings {
            base_url: self.base_url.clone(),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            snapshot_path: self.snapshot_path.clone(),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("admin.ron");
        fs::write(&path, r#"(base_url: "http://kb.local:8080", poll_interval_ms: 500)"#).unwrap();

        let config = AdminConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(config.base_url, "http://kb.local:8080");
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.request_timeout_ms, 30_000);
        assert_eq!(config.snapshot_path, "/static/data/medical_data.json");
    }

    #[test]
    fn named_file_must_exist() {
        let temp = TempDir::new().unwrap();
        assert!(AdminConfig::load(Some(temp.path().join("missing.ron").as_path())).is_err());
    }

    #[test]
    fn parse_error_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("admin.ron");
        fs::write(&path, "(base_url: 42)").unwrap();
        assert!(AdminConfig::load(Some(path.as_path())).is_err());
    }

    #[test]
    fn args_override_file_values() {
        let args = AdminArgs::try_parse_from([
            "ingest-admin",
            "--base-url",
            "http://override:1",
            "--poll-interval-ms",
            "250",
        ])
        .unwrap();
        let settings = AdminConfig::default().merge_args(&args).to_settings();

        assert_eq!(settings.base_url, "http://override:1");
        assert_eq!(settings.poll_interval, Duration::from_millis(250));
        assert_eq!(settings.connect_timeout, Duration::from_secs(10));
    }
}
