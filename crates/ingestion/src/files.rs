//! 任务文件读写

use std::path::{Path, PathBuf};

use contracts::TaskRecord;
use serde_json::Value;

use crate::error::{IngestionError, Result};

/// Output path for an input file: `<stem><suffix>.json` in the same directory
pub fn output_path(input: &Path, processed_suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{processed_suffix}.json"))
}

/// Read and parse a task file
pub async fn read_task(path: &Path) -> Result<TaskRecord> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| IngestionError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let value: Value = serde_json::from_str(&content).map_err(|source| IngestionError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    TaskRecord::from_value(value).map_err(|source| IngestionError::Invalid {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a response as pretty JSON (2-space indent, UTF-8 kept as is)
pub async fn write_response(path: &Path, response: &Value) -> Result<()> {
    let content = serde_json::to_string_pretty(response).map_err(|e| IngestionError::Write {
        path: path.to_path_buf(),
        source: std::io::Error::other(e),
    })?;
    tokio::fs::write(path, content)
        .await
        .map_err(|source| IngestionError::Write {
            path: path.to_path_buf(),
            source,
        })
}

/// Remove a processed input file
pub async fn delete_input(path: &Path) -> Result<()> {
    tokio::fs::remove_file(path)
        .await
        .map_err(|source| IngestionError::Delete {
            path: path.to_path_buf(),
            source,
        })
}
