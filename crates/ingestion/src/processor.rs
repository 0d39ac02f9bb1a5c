//! JSON 任务处理器
//!
//! 一次运行的完整流程：发现文件 → 读取与校验 → 批量预加载 → 并发分发 →
//! 写出 `<stem>_processed.json` 并删除输入文件。
//! 单个文件失败不会影响其它文件，失败的输入保留在原处。

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use contracts::{AgeKey, EchoClient, InputConfig, JokeClient, LookupClient, TaskRecord};
use dispatcher::{PreloadReport, TaskDispatcher};
use observability::RunningStats;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, instrument, warn};

use crate::discover::discover_task_files;
use crate::error::{IngestionError, Result};
use crate::files::{delete_input, output_path, read_task, write_response};
use crate::validator::validate_task;

/// 处理器配置
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// 输入根目录
    pub input_dir: PathBuf,
    /// 输出文件名后缀
    pub processed_suffix: String,
    /// 同时处理的文件数上限
    pub max_concurrent_files: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self::from_settings(&InputConfig::default())
    }
}

impl ProcessorConfig {
    /// 从 input 配置段构建
    pub fn from_settings(input: &InputConfig) -> Self {
        Self {
            input_dir: input.dir.clone(),
            processed_suffix: input.processed_suffix.clone(),
            max_concurrent_files: input.max_concurrent_files.max(1),
        }
    }
}

/// 读取并通过校验的任务文件
#[derive(Debug, Clone)]
pub struct TaskFile {
    pub path: PathBuf,
    pub task: TaskRecord,
}

/// 被跳过的文件及原因
#[derive(Debug, Clone, Serialize)]
pub struct FileIssue {
    pub path: PathBuf,
    pub reason: String,
}

impl FileIssue {
    fn from_error(error: &IngestionError) -> Self {
        Self {
            path: error.path().to_path_buf(),
            reason: error.to_string(),
        }
    }
}

/// 扫描结果：可处理的任务与被跳过的文件
#[derive(Debug, Default)]
pub struct ScanResult {
    /// 发现的任务文件数
    pub discovered: usize,
    /// 可分发的任务
    pub ready: Vec<TaskFile>,
    /// 无法读取或解析的文件
    pub skipped: Vec<FileIssue>,
    /// 校验失败的文件
    pub invalid: Vec<FileIssue>,
}

impl ScanResult {
    /// age 任务的缓存键，按首次出现顺序去重
    pub fn age_keys(&self) -> Vec<AgeKey> {
        let mut seen = HashSet::new();
        self.ready
            .iter()
            .filter_map(|file| file.task.age_key())
            .filter(|key| seen.insert(key.clone()))
            .collect()
    }
}

/// 一次运行的统计
#[derive(Debug, Default)]
pub struct ProcessingReport {
    pub discovered: usize,
    pub skipped: usize,
    pub invalid: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub preload: PreloadReport,
    pub elapsed: Duration,
    /// 每个已分发文件的耗时 (ms)
    pub durations: RunningStats,
    /// 失败文件及原因
    pub failures: Vec<FileIssue>,
}

impl ProcessingReport {
    /// 是否所有发现的文件都处理成功
    pub fn is_clean(&self) -> bool {
        self.skipped == 0 && self.invalid == 0 && self.failed == 0
    }
}

/// JSON 任务处理器
#[derive(Debug, Clone, Default)]
pub struct JsonProcessor {
    config: ProcessorConfig,
}

impl JsonProcessor {
    pub fn new(config: ProcessorConfig) -> Self {
        Self { config }
    }

    /// 发现、读取并校验所有输入文件，不做任何网络调用
    #[instrument(name = "processor_scan", skip(self), fields(input = %self.config.input_dir.display()))]
    pub async fn scan(&self) -> Result<ScanResult> {
        let paths =
            discover_task_files(&self.config.input_dir, &self.config.processed_suffix).await?;
        let mut scan = ScanResult {
            discovered: paths.len(),
            ..Default::default()
        };

        for path in paths {
            let task = match read_task(&path).await {
                Ok(task) => task,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipped unreadable task file");
                    scan.skipped.push(FileIssue::from_error(&e));
                    continue;
                }
            };

            if let Err(source) = validate_task(&task) {
                let e = IngestionError::Invalid { path, source };
                error!(path = %e.path().display(), error = %e, "Task failed validation");
                scan.invalid.push(FileIssue::from_error(&e));
                continue;
            }

            scan.ready.push(TaskFile { path, task });
        }

        Ok(scan)
    }

    /// 处理输入目录下的所有任务文件
    ///
    /// 预加载完成后才开始分发。
    #[instrument(name = "processor_run", skip_all, fields(input = %self.config.input_dir.display()))]
    pub async fn process_all<L, J, E>(
        &self,
        dispatcher: Arc<TaskDispatcher<L, J, E>>,
    ) -> Result<ProcessingReport>
    where
        L: LookupClient + 'static,
        J: JokeClient + 'static,
        E: EchoClient + 'static,
    {
        let started = Instant::now();
        let scan = self.scan().await?;

        let mut report = ProcessingReport {
            discovered: scan.discovered,
            skipped: scan.skipped.len(),
            invalid: scan.invalid.len(),
            ..Default::default()
        };
        info!(
            discovered = report.discovered,
            ready = scan.ready.len(),
            skipped = report.skipped,
            invalid = report.invalid,
            "Input scanned"
        );

        report.preload = dispatcher.preload(scan.age_keys()).await;

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_files));
        let mut join_set = JoinSet::new();

        for file in scan.ready {
            let dispatcher = Arc::clone(&dispatcher);
            let semaphore = Arc::clone(&semaphore);
            let suffix = self.config.processed_suffix.clone();

            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let file_started = Instant::now();
                let result = process_file(&dispatcher, &file, &suffix).await;
                (file.path, result, file_started.elapsed())
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((path, result, elapsed)) => {
                    let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
                    observability::record_file_processed(result.is_ok(), elapsed_ms);
                    report.durations.push(elapsed_ms);

                    match result {
                        Ok(output) => {
                            report.succeeded += 1;
                            info!(
                                path = %path.display(),
                                output = %output.display(),
                                elapsed_ms,
                                "File processed"
                            );
                        }
                        Err(e) => {
                            report.failed += 1;
                            error!(
                                path = %path.display(),
                                error = %e,
                                elapsed_ms,
                                "File failed, input kept"
                            );
                            report.failures.push(FileIssue::from_error(&e));
                        }
                    }
                }
                Err(e) => {
                    report.failed += 1;
                    error!(error = %e, "File task aborted");
                }
            }
        }

        report.elapsed = started.elapsed();
        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Run finished"
        );
        Ok(report)
    }
}

/// Dispatch one file, write its output, then remove the input
async fn process_file<L, J, E>(
    dispatcher: &TaskDispatcher<L, J, E>,
    file: &TaskFile,
    processed_suffix: &str,
) -> Result<PathBuf>
where
    L: LookupClient,
    J: JokeClient,
    E: EchoClient,
{
    info!(path = %file.path.display(), task_type = %file.task.task_type(), "Processing file");

    let response = dispatcher
        .dispatch(&file.task)
        .await
        .map_err(|source| IngestionError::Dispatch {
            path: file.path.clone(),
            source,
        })?;

    let output = output_path(&file.path, processed_suffix);
    write_response(&output, &response).await?;
    delete_input(&file.path).await?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_clients::{MockEchoClient, MockJokeClient, MockLookupClient};
    use serde_json::{json, Value};
    use std::fs;
    use std::path::Path;

    type MockDispatcher = TaskDispatcher<MockLookupClient, MockJokeClient, MockEchoClient>;

    fn write(root: &Path, rel: &str, value: Value) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, serde_json::to_string(&value).unwrap()).unwrap();
    }

    fn processor(root: &Path) -> JsonProcessor {
        JsonProcessor::new(ProcessorConfig {
            input_dir: root.to_path_buf(),
            ..Default::default()
        })
    }

    fn read(path: PathBuf) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_process_all_writes_outputs_and_deletes_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "day1/a.json", json!({"type": "age", "name": "Ana", "country": "es"}));
        write(root, "day1/b.json", json!({"type": "joke"}));
        write(root, "day2/c.json", json!({"type": "note", "text": "hi"}));

        let dispatcher: Arc<MockDispatcher> = Arc::new(TaskDispatcher::new(
            MockLookupClient::new().with_age("Ana", 37),
            MockJokeClient::new(),
            MockEchoClient::new(),
        ));
        let report = processor(root).process_all(Arc::clone(&dispatcher)).await.unwrap();

        assert_eq!(report.discovered, 3);
        assert_eq!(report.succeeded, 3);
        assert!(report.is_clean());
        assert_eq!(report.durations.count(), 3);
        assert_eq!(report.preload.chunks, 1);

        assert!(!root.join("day1/a.json").exists());
        assert_eq!(read(root.join("day1/a_processed.json"))["age"], 37);
        assert!(read(root.join("day1/b_processed.json")).get("punchline").is_some());
        assert_eq!(
            read(root.join("day2/c_processed.json")),
            json!({"type": "note", "text": "hi"})
        );

        // preloaded, so no single lookups
        assert!(dispatcher.lookup_client().single_calls().is_empty());
    }

    #[tokio::test]
    async fn test_failures_keep_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "ok.json", json!({"type": "note"}));
        write(root, "sink_fails.json", json!({"type": "note", "fail": true}));
        write(root, "invalid.json", json!({"type": "age", "name": "X1", "country": "US"}));
        fs::write(root.join("broken.json"), "{oops").unwrap();

        let dispatcher: Arc<MockDispatcher> = Arc::new(TaskDispatcher::new(
            MockLookupClient::new(),
            MockJokeClient::new(),
            MockEchoClient::failing_when(|v| v["fail"] == true),
        ));
        let report = processor(root).process_all(dispatcher).await.unwrap();

        assert_eq!(report.discovered, 4);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.invalid, 1);
        assert_eq!(report.skipped, 1);
        assert!(!report.is_clean());
        assert_eq!(report.failures[0].path, root.join("sink_fails.json"));

        assert!(root.join("ok_processed.json").exists());
        assert!(root.join("sink_fails.json").exists());
        assert!(!root.join("sink_fails_processed.json").exists());
        assert!(root.join("invalid.json").exists());
        assert!(root.join("broken.json").exists());
    }

    #[tokio::test]
    async fn test_second_run_does_not_reingest_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "a.json", json!({"type": "note"}));

        let dispatcher: Arc<MockDispatcher> = Arc::new(TaskDispatcher::new(
            MockLookupClient::new(),
            MockJokeClient::new(),
            MockEchoClient::new(),
        ));
        let first = processor(root).process_all(Arc::clone(&dispatcher)).await.unwrap();
        let second = processor(root).process_all(Arc::clone(&dispatcher)).await.unwrap();

        assert_eq!(first.succeeded, 1);
        assert_eq!(second.discovered, 0);
        assert_eq!(dispatcher.echo_client().call_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_input_dir_is_empty_run() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher: Arc<MockDispatcher> = Arc::new(TaskDispatcher::new(
            MockLookupClient::new(),
            MockJokeClient::new(),
            MockEchoClient::new(),
        ));

        let report = processor(&dir.path().join("INPUT"))
            .process_all(dispatcher)
            .await
            .unwrap();
        assert_eq!(report.discovered, 0);
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_scan_dedupes_age_keys() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "1.json", json!({"type": "age", "name": "Bob", "country": "us"}));
        write(root, "2.json", json!({"type": "age", "name": "Bob", "country": "US"}));
        write(root, "3.json", json!({"type": "age", "name": "Ann", "country": "us"}));

        let scan = processor(root).scan().await.unwrap();
        assert_eq!(
            scan.age_keys(),
            vec![AgeKey::new("Bob", "US"), AgeKey::new("Ann", "US")]
        );
    }

    #[test]
    fn test_age_keys_first_seen_order_over_many_files() {
        let ready: Vec<TaskFile> = (0..500)
            .flat_map(|i| {
                let age = json!({"type": "age", "name": format!("N{}", i % 50), "country": "de"});
                let joke = (i % 7 == 0).then(|| json!({"type": "joke"}));
                std::iter::once(age).chain(joke)
            })
            .enumerate()
            .map(|(i, task)| TaskFile {
                path: PathBuf::from(format!("{i}.json")),
                task: TaskRecord::from_value(task).unwrap(),
            })
            .collect();
        let scan = ScanResult {
            ready,
            ..Default::default()
        };

        let keys = scan.age_keys();
        let expected: Vec<AgeKey> = (0..50)
            .map(|i| AgeKey::new(format!("N{i}"), "DE"))
            .collect();
        assert_eq!(keys, expected);
    }

    #[tokio::test]
    async fn test_concurrency_limit_of_one_still_completes() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for i in 0..5 {
            write(root, &format!("t{i}.json"), json!({"type": "note", "i": i}));
        }

        let dispatcher: Arc<MockDispatcher> = Arc::new(TaskDispatcher::new(
            MockLookupClient::new(),
            MockJokeClient::new(),
            MockEchoClient::new(),
        ));
        let report = JsonProcessor::new(ProcessorConfig {
            input_dir: root.to_path_buf(),
            max_concurrent_files: 1,
            ..Default::default()
        })
        .process_all(dispatcher)
        .await
        .unwrap();

        assert_eq!(report.succeeded, 5);
    }
}
