// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::error::AppError;
use crate::services::query::keys::QueryKey;
use dashmap::DashMap;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

type Value = Arc<dyn Any + Send + Sync>;
type SharedFetch = Shared<BoxFuture<'static, Result<Value, Arc<AppError>>>>;

#[derive(Default)]
struct Entry {
    generation: u64,
    cached: Option<(u64, Value)>,
    inflight: Option<(u64, SharedFetch)>,
}

impl Entry {
    /// Start a new generation. Callers already awaiting the old fetch keep
    /// their handle; the entry stops holding it.
    fn bump(&mut self) {
        self.generation = self.generation.saturating_add(1);
        self.cached = None;
        self.inflight = None;
    }
}

/// Key-addressed result cache with at most one in-flight fetch per key.
///
/// Every key carries a generation counter. Invalidating a key bumps it, which
/// both drops the cached value and marks any fetch still running for the old
/// generation as stale: its result is handed to the callers that awaited it but
/// never written back.
#[derive(Default)]
pub struct QueryClient {
    entries: DashMap<QueryKey, Entry>,
    fetches: AtomicU64,
}

impl QueryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self, key: &QueryKey) -> u64 {
        self.entries.get(key).map(|e| e.generation).unwrap_or(0)
    }

    /// Number of underlying fetches started so far.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    pub fn invalidate(&self, key: &QueryKey) {
        let mut entry = self.entries.entry(key.clone()).or_default();
        entry.bump();
        tracing::debug!(target: "query", key = %key, generation = entry.generation, "Invalidated query");
    }

    /// Invalidate every key of `operation`, whatever its arguments.
    pub fn invalidate_operation(&self, operation: &str) -> usize {
        let mut touched = 0;
        for mut entry in self.entries.iter_mut() {
            if entry.key().operation() == operation {
                entry.bump();
                touched += 1;
            }
        }
        tracing::debug!(target: "query", operation, touched, "Invalidated query operation");
        touched
    }

    pub fn cached<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let entry = self.entries.get(key)?;
        match &entry.cached {
            Some((generation, value)) if *generation == entry.generation => {
                value.clone().downcast::<T>().ok()
            }
            _ => None,
        }
    }

    #[cfg(test)]
    fn has_inflight(&self, key: &QueryKey) -> bool {
        self.entries.get(key).is_some_and(|e| e.inflight.is_some())
    }

    /// Resolve `key`, serving the cache when fresh and otherwise joining or
    /// starting the single fetch for the current generation. `future` is only
    /// polled if this call starts the fetch.
    pub async fn fetch<T, F>(&self, key: QueryKey, future: F) -> Result<Arc<T>, Arc<AppError>>
    where
        T: Send + Sync + 'static,
        F: Future<Output = Result<T, AppError>> + Send + 'static,
    {
        let (generation, shared) = {
            let mut entry = self.entries.entry(key.clone()).or_default();
            let generation = entry.generation;
            if let Some((cached_gen, value)) = &entry.cached
                && *cached_gen == generation
            {
                return downcast(&key, value.clone());
            }
            match &entry.inflight {
                Some((inflight_gen, shared)) if *inflight_gen == generation => {
                    tracing::trace!(target: "query", key = %key, "Joining in-flight fetch");
                    (generation, shared.clone())
                }
                _ => {
                    let shared = future
                        .map(|result| {
                            result
                                .map(|value| Arc::new(value) as Value)
                                .map_err(Arc::new)
                        })
                        .boxed()
                        .shared();
                    entry.inflight = Some((generation, shared.clone()));
                    self.fetches.fetch_add(1, Ordering::Relaxed);
                    (generation, shared)
                }
            }
        };

        let result = shared.await;

        if let Some(mut entry) = self.entries.get_mut(&key) {
            if entry.generation == generation {
                if let Ok(value) = &result {
                    entry.cached = Some((generation, value.clone()));
                }
                if matches!(&entry.inflight, Some((g, _)) if *g == generation) {
                    entry.inflight = None;
                }
            } else {
                if matches!(&entry.inflight, Some((g, _)) if *g < entry.generation) {
                    entry.inflight = None;
                }
                tracing::debug!(target: "query", key = %key, generation, "Discarding stale fetch result");
            }
        }

        downcast(&key, result?)
    }
}

fn downcast<T: Send + Sync + 'static>(key: &QueryKey, value: Value) -> Result<Arc<T>, Arc<AppError>> {
    value.downcast::<T>().map_err(|_| {
        Arc::new(AppError::Unknown(anyhow::anyhow!(
            "cached value for {} has an unexpected type",
            key
        )))
    })
}
