//! TaskDispatcher - resolves one task record into its acknowledged payload

use std::sync::Arc;

use contracts::{AgeKey, EchoClient, JokeClient, LookupClient, TaskKind, TaskRecord};
use serde_json::Value;
use tracing::{debug, error, info, instrument};

use crate::cache::DispatchCache;
use crate::error::DispatcherError;
use crate::metrics::{DispatchMetrics, MetricsSnapshot};
use crate::preload::{BatchPreloader, PreloadReport};

/// Routes tasks to the lookup, joke and echo services
///
/// The dispatcher owns its clients and a run-scoped [`DispatchCache`].
/// It is shared across per-file tasks behind an `Arc`.
pub struct TaskDispatcher<L, J, E> {
    lookup: L,
    joke: J,
    echo: E,
    cache: Arc<DispatchCache>,
    preloader: BatchPreloader,
    metrics: DispatchMetrics,
}

impl<L, J, E> TaskDispatcher<L, J, E>
where
    L: LookupClient,
    J: JokeClient,
    E: EchoClient,
{
    /// Create a dispatcher with an empty cache
    pub fn new(lookup: L, joke: J, echo: E) -> Self {
        Self {
            lookup,
            joke,
            echo,
            cache: Arc::new(DispatchCache::new()),
            preloader: BatchPreloader::default(),
            metrics: DispatchMetrics::new(),
        }
    }

    /// Use a smaller preload chunk size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.preloader = BatchPreloader::new(batch_size);
        self
    }

    pub fn cache(&self) -> &Arc<DispatchCache> {
        &self.cache
    }

    pub fn lookup_client(&self) -> &L {
        &self.lookup
    }

    pub fn echo_client(&self) -> &E {
        &self.echo
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Warm the cache for the given keys
    ///
    /// Must complete before the first [`dispatch`](Self::dispatch) of a run.
    pub async fn preload<I>(&self, keys: I) -> PreloadReport
    where
        I: IntoIterator<Item = AgeKey>,
    {
        let report = self.preloader.preload(&self.lookup, &self.cache, keys).await;
        self.metrics
            .add_batch_calls(report.chunks as u64, report.failed_chunks as u64);
        report
    }

    /// Resolve a task and send the result through the echo sink
    ///
    /// Returns the `json` member of the sink envelope.
    #[instrument(
        name = "dispatch_task",
        skip(self, task),
        fields(task_type = %task.task_type())
    )]
    pub async fn dispatch(&self, task: &TaskRecord) -> Result<Value, DispatcherError> {
        let kind = task.kind();
        let result = self.resolve_and_sink(task, &kind).await;

        let success = result.is_ok();
        observability::record_task_dispatched(kind.label(), success);
        match &result {
            Ok(_) => self.metrics.inc_dispatched(),
            Err(e) => {
                self.metrics.inc_failed();
                match &kind {
                    TaskKind::Age(key) => error!(
                        task_type = kind.label(),
                        name = %key.name,
                        country = %key.country,
                        error = %e,
                        "[TASK] failed to handle task"
                    ),
                    _ => error!(task_type = kind.label(), error = %e, "[TASK] failed to handle task"),
                }
            }
        }
        result
    }

    async fn resolve_and_sink(&self, task: &TaskRecord, kind: &TaskKind) -> Result<Value, DispatcherError> {
        let payload = match kind {
            TaskKind::Age(key) => self.resolve_age(key).await?,
            TaskKind::Joke => {
                let joke = self
                    .joke
                    .random()
                    .await
                    .map_err(|source| DispatcherError::Joke { source })?;
                info!("[JOKE] random joke fetched");
                joke
            }
            TaskKind::Passthrough => {
                info!("[RAW] unrecognized task type, record used as response");
                task.to_value()
            }
        };

        let envelope = self
            .echo
            .send(&payload)
            .await
            .map_err(|source| DispatcherError::Sink {
                task_type: kind.label().to_string(),
                source,
            })?;
        Ok(envelope.into_payload())
    }

    async fn resolve_age(&self, key: &AgeKey) -> Result<Value, DispatcherError> {
        if let Some(record) = self.cache.get_key(key) {
            self.metrics.inc_cache_hit();
            observability::record_cache_lookup(true);
            debug!(key = %key, "Age served from cache");
            return Ok(record);
        }

        self.metrics.inc_cache_miss();
        observability::record_cache_lookup(false);

        let record = self
            .lookup
            .single(key)
            .await
            .map_err(|source| DispatcherError::Lookup {
                key: key.clone(),
                source,
            })?;
        info!(name = %key.name, country = %key.country, "[SINGLE] age fetched");
        self.cache.insert(key.clone(), record.clone());
        Ok(record)
    }
}
