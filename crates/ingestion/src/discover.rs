//! 输入文件发现
//!
//! 递归扫描输入目录（任意层级，例如按日期分的子目录），
//! 返回排序后的 `*.json` 任务文件，跳过已处理的输出文件。

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{IngestionError, Result};

/// Whether `path` is a task file rather than an earlier output
pub fn is_task_file(path: &Path, processed_suffix: &str) -> bool {
    let is_json = path.extension().is_some_and(|ext| ext == "json");
    let is_output = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.ends_with(processed_suffix));
    is_json && !is_output
}

/// Collect task files under `root`, sorted by path
///
/// A missing root yields an empty list.
pub async fn discover_task_files(root: &Path, processed_suffix: &str) -> Result<Vec<PathBuf>> {
    if !tokio::fs::try_exists(root).await.unwrap_or(false) {
        warn!(path = %root.display(), "Input directory does not exist, nothing to do");
        return Ok(Vec::new());
    }

    let root_buf = root.to_path_buf();
    let suffix = processed_suffix.to_string();
    let files = tokio::task::spawn_blocking(move || walk(&root_buf, &suffix))
        .await
        .map_err(|e| IngestionError::Discover {
            path: root.to_path_buf(),
            message: e.to_string(),
        })?;

    debug!(path = %root.display(), count = files.len(), "Task files discovered");
    Ok(files)
}

fn walk(root: &Path, processed_suffix: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable directory entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_task_file(path, processed_suffix))
        .collect();
    files.sort();
    files
}
