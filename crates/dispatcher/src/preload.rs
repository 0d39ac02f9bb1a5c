//! Batch preloader
//!
//! 按国家分组，将年龄查询切分为不超过批量上限的块并发请求，
//! 结果写入缓存。单个块失败只记录日志，不影响其它块。

use std::collections::HashSet;

use contracts::{AgeKey, LookupClient, MAX_BATCH_NAMES};
use futures::future::join_all;
use serde_json::Value;
use tracing::{error, info, instrument};

use crate::cache::DispatchCache;

/// Names sharing one country, sent in a single batch call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub country: String,
    pub names: Vec<String>,
}

/// Outcome of one preload pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreloadReport {
    /// Distinct uncached keys that needed fetching
    pub requested: usize,
    /// Batch calls issued
    pub chunks: usize,
    /// Batch calls that failed
    pub failed_chunks: usize,
    /// Records written to the cache
    pub cached: usize,
}

/// Groups age keys by country and fetches them in bounded chunks
#[derive(Debug, Clone, Copy)]
pub struct BatchPreloader {
    batch_size: usize,
}

impl Default for BatchPreloader {
    fn default() -> Self {
        Self {
            batch_size: MAX_BATCH_NAMES,
        }
    }
}

impl BatchPreloader {
    /// Create a preloader; the size is clamped to `1..=MAX_BATCH_NAMES`
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.clamp(1, MAX_BATCH_NAMES),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Group names by country
    ///
    /// Duplicate keys collapse onto their first occurrence. Groups keep
    /// first-seen country order, names keep input order.
    pub fn group_by_country<I>(keys: I) -> Vec<(String, Vec<String>)>
    where
        I: IntoIterator<Item = AgeKey>,
    {
        let mut seen = HashSet::new();
        let mut groups: Vec<(String, Vec<String>)> = Vec::new();

        for key in keys {
            if !seen.insert(key.clone()) {
                continue;
            }
            match groups.iter_mut().find(|(country, _)| *country == key.country) {
                Some((_, names)) => names.push(key.name),
                None => groups.push((key.country, vec![key.name])),
            }
        }
        groups
    }

    /// Plan the batch calls for keys not yet in `cache`
    pub fn plan<I>(&self, keys: I, cache: &DispatchCache) -> Vec<Chunk>
    where
        I: IntoIterator<Item = AgeKey>,
    {
        let pending = keys.into_iter().filter(|key| !cache.contains(key));

        Self::group_by_country(pending)
            .into_iter()
            .flat_map(|(country, names)| {
                names
                    .chunks(self.batch_size)
                    .map(|chunk| Chunk {
                        country: country.clone(),
                        names: chunk.to_vec(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Fetch every uncached key and fill the cache
    ///
    /// All chunks run concurrently; returns once each was attempted.
    #[instrument(name = "batch_preload", skip_all, fields(batch_size = self.batch_size))]
    pub async fn preload<L, I>(&self, client: &L, cache: &DispatchCache, keys: I) -> PreloadReport
    where
        L: LookupClient,
        I: IntoIterator<Item = AgeKey>,
    {
        let chunks = self.plan(keys, cache);
        let mut report = PreloadReport {
            requested: chunks.iter().map(|c| c.names.len()).sum(),
            chunks: chunks.len(),
            ..Default::default()
        };
        if chunks.is_empty() {
            return report;
        }

        let outcomes = join_all(chunks.iter().map(|chunk| fetch_chunk(client, cache, chunk))).await;
        for outcome in outcomes {
            report.cached += outcome.cached;
            if outcome.failed {
                report.failed_chunks += 1;
            }
        }

        info!(
            requested = report.requested,
            chunks = report.chunks,
            failed_chunks = report.failed_chunks,
            cached = report.cached,
            "Preload finished"
        );
        report
    }
}

struct ChunkOutcome {
    cached: usize,
    failed: bool,
}

/// Run one batch call and cache every named element
///
/// A reply holding elements without a `name` counts as a failed chunk; its
/// named elements are still cached.
async fn fetch_chunk<L: LookupClient>(client: &L, cache: &DispatchCache, chunk: &Chunk) -> ChunkOutcome {
    let names = chunk.names.join(", ");

    let records = match client.batch(&chunk.names, &chunk.country).await {
        Ok(records) => records,
        Err(e) => {
            observability::record_batch_chunk(&chunk.country, chunk.names.len(), false);
            error!(
                country = %chunk.country,
                names = %names,
                error = %e,
                "[BATCH] batch request failed"
            );
            return ChunkOutcome {
                cached: 0,
                failed: true,
            };
        }
    };

    let mut cached = 0;
    let mut nameless = 0;
    for record in records {
        match record.get("name").and_then(Value::as_str) {
            Some(name) => {
                cache.insert(AgeKey::new(name, &chunk.country), record.clone());
                cached += 1;
            }
            None => nameless += 1,
        }
    }

    let failed = nameless > 0;
    observability::record_batch_chunk(&chunk.country, chunk.names.len(), !failed);
    if failed {
        error!(
            country = %chunk.country,
            names = %names,
            nameless,
            cached,
            "[BATCH] malformed batch response"
        );
    } else {
        info!(
            country = %chunk.country,
            size = chunk.names.len(),
            names = %names,
            "[BATCH] names preloaded"
        );
    }
    ChunkOutcome { cached, failed }
}
