//! Ingestion 错误类型

use std::path::{Path, PathBuf};

use contracts::ContractError;
use dispatcher::DispatcherError;
use thiserror::Error;

/// Ingestion 错误
///
/// 每个变体都带有出错的文件路径。
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 输入目录遍历失败
    #[error("failed to scan {}: {message}", path.display())]
    Discover {
        /// 输入目录
        path: PathBuf,
        /// 错误消息
        message: String,
    },

    /// 文件读取失败
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON 解析失败
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// 任务校验失败
    #[error("invalid task in {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: ContractError,
    },

    /// 任务分发失败
    #[error("dispatch failed for {}: {source}", path.display())]
    Dispatch {
        path: PathBuf,
        #[source]
        source: DispatcherError,
    },

    /// 输出写入失败
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 输入删除失败
    #[error("failed to delete {}: {source}", path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IngestionError {
    /// 出错的文件路径
    pub fn path(&self) -> &Path {
        match self {
            Self::Discover { path, .. }
            | Self::Read { path, .. }
            | Self::Parse { path, .. }
            | Self::Invalid { path, .. }
            | Self::Dispatch { path, .. }
            | Self::Write { path, .. }
            | Self::Delete { path, .. } => path,
        }
    }
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
