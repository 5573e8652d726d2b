//! Headless admin shell: drives the core state machine against a live backend.
mod app;
mod cli;
mod config;
mod effects;
mod logging;
mod render;

pub use app::run_app;
