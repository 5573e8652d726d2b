use std::process::ExitCode;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use ingest_core::{update, AdminState, JobKind, JobRunState, Msg};
use ingest_logging::{ingest_info, ingest_warn};

use super::cli::AdminArgs;
use super::config::AdminConfig;
use super::effects::EffectRunner;
use super::{logging, render};

const TICK: Duration = Duration::from_millis(75);

pub fn run_app() -> Result<ExitCode> {
    let args = AdminArgs::parse();
    logging::initialize(args.log);

    let config = AdminConfig::load(args.config.as_deref())?.merge_args(&args);
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(config.to_settings(), msg_tx.clone())
        .context("failed to set up backend client")?;

    let _ = msg_tx.send(Msg::AdminOpened);
    for &kind in &args.kinds {
        let _ = msg_tx.send(Msg::LaunchClicked { kind });
    }

    let deadline = args
        .max_wait_secs
        .map(|secs| Instant::now() + Duration::from_secs(secs));
    let mut shell = Shell {
        state: AdminState::new(),
        runner,
    };

    loop {
        let msg = msg_rx.recv_timeout(TICK).unwrap_or(Msg::Tick);
        shell.dispatch(msg);

        if !shell.state.any_active() && shell.state.stats_settled() {
            break;
        }
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            ingest_warn!("Gave up waiting; cancelling live runs");
            println!("Timed out waiting for jobs to finish.");
            break;
        }
    }
    shell.dispatch(Msg::AdminClosed);

    Ok(exit_code(&shell.state, &args.kinds))
}

struct Shell {
    state: AdminState,
    runner: EffectRunner,
}

impl Shell {
    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.runner.enqueue(effects);

        if state.consume_dirty() {
            let stamp = Local::now().format("%H:%M:%S");
            for line in render::render(&state.view()) {
                println!("[{stamp}] {line}");
            }
            println!();
        }
        self.state = state;
    }
}

/// Failure if any launched kind did not end in `Succeeded`.
fn exit_code(state: &AdminState, launched: &[JobKind]) -> ExitCode {
    let failed: Vec<JobKind> = launched
        .iter()
        .copied()
        .filter(|&kind| state.run_state(kind) != &JobRunState::Succeeded)
        .collect();
    if failed.is_empty() {
        ingest_info!("All launched jobs succeeded");
        ExitCode::SUCCESS
    } else {
        ingest_warn!("Jobs not succeeded: {:?}", failed);
        ExitCode::FAILURE
    }
}
