//! Pipeline orchestration module.

mod orchestrator;
mod stats;

pub use orchestrator::{plan_run, run_once, RunPlan};
