//! # Ingestion
//!
//! Task file ingestion module.
//!
//! Responsibilities:
//! - Discover `*.json` task files in a nested input tree
//! - Read, parse and validate task records
//! - Preload age lookups, then dispatch every file concurrently
//! - Write `<stem>_processed.json` outputs and remove processed inputs
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{JsonProcessor, ProcessorConfig};
//!
//! let processor = JsonProcessor::new(ProcessorConfig::from_settings(&settings.input));
//! let report = processor.process_all(Arc::new(dispatcher)).await?;
//! println!("{} files processed", report.succeeded);
//! ```

mod discover;
mod error;
mod files;
mod processor;
mod validator;

// Re-exports
pub use discover::{discover_task_files, is_task_file};
pub use error::{IngestionError, Result};
pub use files::output_path;
pub use processor::{
    FileIssue, JsonProcessor, ProcessingReport, ProcessorConfig, ScanResult, TaskFile,
};
pub use validator::{validate_task, violations};
