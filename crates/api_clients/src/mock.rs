//! Mock 服务客户端
//!
//! 用于单元测试与端到端测试的 mock 实现，支持注入失败场景并记录调用。

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use contracts::{
    AgeKey, AgeRecord, ContractError, EchoClient, JokeClient, LookupClient, SinkEnvelope,
    MAX_BATCH_NAMES,
};
use serde_json::{json, Value};
use tracing::instrument;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 确定性的年龄估计，同名同国家总是得到相同结果
pub fn deterministic_age(name: &str) -> u64 {
    let sum: u64 = name.bytes().map(u64::from).sum();
    18 + sum % 60
}

/// Mock 年龄查询配置
#[derive(Debug, Default, Clone)]
pub struct MockLookupConfig {
    /// 单个查询应该失败的名字
    pub fail_names: HashSet<String>,
    /// 批量查询应该失败的国家（大写）
    pub fail_countries: HashSet<String>,
    /// 批量结果中故意省略的名字
    pub omit_from_batch: HashSet<String>,
    /// 批量结果中缺少 `name` 字段的名字
    pub nameless_in_batch: HashSet<String>,
    /// 固定年龄覆盖 (name -> age)
    pub ages: HashMap<String, u64>,
    /// 每次调用的人为延迟
    pub delay: Option<Duration>,
}

/// Mock 年龄查询客户端
#[derive(Debug, Default)]
pub struct MockLookupClient {
    config: MockLookupConfig,
    /// 单个查询记录
    single_calls: Mutex<Vec<AgeKey>>,
    /// 批量查询记录 (country, names)
    batch_calls: Mutex<Vec<(String, Vec<String>)>>,
    /// 当前并发的批量调用数
    in_flight: AtomicUsize,
    /// 观察到的最大并发批量调用数
    max_in_flight: AtomicUsize,
}

impl MockLookupClient {
    /// 创建默认 mock 客户端
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用配置创建 mock 客户端
    pub fn with_config(config: MockLookupConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// 固定某个名字的年龄
    pub fn with_age(mut self, name: impl Into<String>, age: u64) -> Self {
        self.config.ages.insert(name.into(), age);
        self
    }

    /// 令某个名字的单个查询失败
    pub fn failing_name(mut self, name: impl Into<String>) -> Self {
        self.config.fail_names.insert(name.into());
        self
    }

    /// 令某个国家的批量查询失败
    pub fn failing_country(mut self, country: impl AsRef<str>) -> Self {
        self.config
            .fail_countries
            .insert(country.as_ref().to_uppercase());
        self
    }

    /// 单个查询调用记录
    pub fn single_calls(&self) -> Vec<AgeKey> {
        lock(&self.single_calls).clone()
    }

    /// 批量查询调用记录
    pub fn batch_calls(&self) -> Vec<(String, Vec<String>)> {
        lock(&self.batch_calls).clone()
    }

    /// 观察到的最大并发批量调用数
    pub fn max_concurrent_batches(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, name: &str, country: &str) -> AgeRecord {
        let age = self
            .config
            .ages
            .get(name)
            .copied()
            .unwrap_or_else(|| deterministic_age(name));
        json!({
            "count": 1000,
            "name": name,
            "age": age,
            "country_id": country,
        })
    }

    async fn pause(&self) {
        if let Some(delay) = self.config.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl LookupClient for MockLookupClient {
    #[instrument(name = "mock_lookup_single", skip(self, key), fields(key = %key))]
    async fn single(&self, key: &AgeKey) -> Result<AgeRecord, ContractError> {
        lock(&self.single_calls).push(key.clone());
        self.pause().await;

        if self.config.fail_names.contains(&key.name) {
            return Err(ContractError::remote("mock-lookup", 500, "mock failure"));
        }
        Ok(self.record(&key.name, &key.country))
    }

    #[instrument(name = "mock_lookup_batch", skip(self, names), fields(size = names.len()))]
    async fn batch(&self, names: &[String], country: &str) -> Result<Vec<AgeRecord>, ContractError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        if names.len() > MAX_BATCH_NAMES {
            return Err(ContractError::BatchTooLarge {
                size: names.len(),
                max: MAX_BATCH_NAMES,
            });
        }

        lock(&self.batch_calls).push((country.to_string(), names.to_vec()));

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        self.pause().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.config.fail_countries.contains(country) {
            return Err(ContractError::remote("mock-lookup", 429, "mock failure"));
        }

        Ok(names
            .iter()
            .filter(|name| !self.config.omit_from_batch.contains(*name))
            .map(|name| {
                let mut record = self.record(name, country);
                if self.config.nameless_in_batch.contains(name) {
                    if let Some(fields) = record.as_object_mut() {
                        fields.remove("name");
                    }
                }
                record
            })
            .collect())
    }
}

/// Mock 笑话客户端
#[derive(Debug, Default)]
pub struct MockJokeClient {
    /// 是否失败
    fail: bool,
    /// 调用计数
    calls: AtomicUsize,
}

impl MockJokeClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 每次调用都失败的客户端
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl JokeClient for MockJokeClient {
    #[instrument(name = "mock_joke_random", skip(self))]
    async fn random(&self) -> Result<Value, ContractError> {
        let id = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail {
            return Err(ContractError::network("mock-joke", "mock failure"));
        }
        Ok(json!({
            "id": id,
            "type": "general",
            "setup": format!("Mock setup #{id}"),
            "punchline": "Mock punchline",
        }))
    }
}

type FailPredicate = Box<dyn Fn(&Value) -> bool + Send + Sync>;

/// Mock 回显客户端
///
/// 原样返回收到的记录，包装在 `json` 字段中。
#[derive(Default)]
pub struct MockEchoClient {
    /// 判断某条记录是否应该失败
    fail_when: Option<FailPredicate>,
    /// 已发送的记录
    sent: Mutex<Vec<Value>>,
}

impl MockEchoClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 对满足条件的记录注入失败
    pub fn failing_when<F>(predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            fail_when: Some(Box::new(predicate)),
            ..Default::default()
        }
    }

    /// 已发送记录数
    pub fn call_count(&self) -> usize {
        lock(&self.sent).len()
    }

    /// 已发送的记录
    pub fn sent(&self) -> Vec<Value> {
        lock(&self.sent).clone()
    }
}

impl std::fmt::Debug for MockEchoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockEchoClient")
            .field("fail_when", &self.fail_when.is_some())
            .field("calls", &self.call_count())
            .finish()
    }
}

impl EchoClient for MockEchoClient {
    #[instrument(name = "mock_echo_send", skip(self, record))]
    async fn send(&self, record: &Value) -> Result<SinkEnvelope, ContractError> {
        lock(&self.sent).push(record.clone());

        if self.fail_when.as_ref().is_some_and(|fail| fail(record)) {
            return Err(ContractError::remote("mock-echo", 502, "mock failure"));
        }

        let mut envelope = SinkEnvelope::new(record.clone());
        envelope.url = Some("mock://echo".to_string());
        Ok(envelope)
    }
}
