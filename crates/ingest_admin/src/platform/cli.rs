use std::path::PathBuf;

use clap::Parser;
use ingest_core::JobKind;

use super::logging::LogDestination;

/// Launch knowledge-base ingestion jobs and follow them until they finish.
///
/// Opens the admin surface (which refreshes the knowledge-base statistics),
/// launches every KIND given, and prints each state change.
#[derive(Parser, Debug)]
#[command(name = "ingest-admin", about = "Launch and monitor knowledge-base ingestion jobs")]
pub struct AdminArgs {
    /// Job kinds to launch: pdf_ingestion, text_ingestion, medical_text
    pub kinds: Vec<JobKind>,

    /// Path to a RON config file (default: ./ingest_admin.ron if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Backend base URL (overrides the config file)
    #[arg(long, env = "INGEST_ADMIN_BASE_URL")]
    pub base_url: Option<String>,

    /// Status poll interval in milliseconds (overrides the config file)
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Give up and cancel live runs after this many seconds
    #[arg(long)]
    pub max_wait_secs: Option<u64>,

    /// Where log output goes
    #[arg(long, value_enum, default_value = "file")]
    pub log: LogDestination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kinds_and_overrides() {
        let args = AdminArgs::try_parse_from([
            "ingest-admin",
            "pdf_ingestion",
            "medical_text",
            "--base-url",
            "http://kb.local:8080",
            "--poll-interval-ms",
            "500",
        ])
        .unwrap();

        assert_eq!(args.kinds, vec![JobKind::PdfIngestion, JobKind::MedicalText]);
        assert_eq!(args.base_url.as_deref(), Some("http://kb.local:8080"));
        assert_eq!(args.poll_interval_ms, Some(500));
        assert_eq!(args.log, LogDestination::File);
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!(AdminArgs::try_parse_from(["ingest-admin", "video"]).is_err());
    }
}
