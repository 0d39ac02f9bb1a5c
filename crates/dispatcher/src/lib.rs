//! # Dispatcher
//!
//! 任务分发模块。
//!
//! 负责：
//! - 按任务类型解析负载 (age / joke / 原样透传)
//! - 维护运行期年龄缓存
//! - 按国家分组批量预加载年龄
//! - 所有结果经回显 sink 确认后返回

pub mod cache;
pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod preload;

pub use cache::DispatchCache;
pub use contracts::{AgeKey, TaskKind, TaskRecord};
pub use dispatcher::TaskDispatcher;
pub use error::DispatcherError;
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use preload::{BatchPreloader, Chunk, PreloadReport};
