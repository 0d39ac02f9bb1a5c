//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace: the task
//! data model, the external client traits, the settings model and the unified
//! error type. Business crates depend on this crate; it depends on none of them.
//!
//! ## Task model
//! - A task is an open JSON object with a case-insensitive `type` field
//! - `age` tasks carry `name` + `country`, keyed as an [`AgeKey`]
//! - Every resolved payload is acknowledged by the echo sink before it is persisted

mod client;
mod error;
mod settings;
mod task;

pub use client::*;
pub use error::*;
pub use settings::*;
pub use task::*;
