//! Command implementations.

mod run;
mod schedule;
mod signal;
mod validate;

pub use run::run_command;
pub use schedule::run_schedule;
pub use validate::run_validate;
