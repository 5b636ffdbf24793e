// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::error::AppError;
use crate::services::query::client::QueryClient;
use crate::services::query::keys::QueryKey;
use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// Observable state of one node. `revision` counts successful results and is
/// what downstream nodes compare to notice a new upstream value.
#[derive(Debug)]
pub struct NodeState<T> {
    pub status: QueryStatus,
    pub data: Option<Arc<T>>,
    pub error: Option<Arc<AppError>>,
    pub revision: u64,
}

impl<T> Clone for NodeState<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            revision: self.revision,
        }
    }
}

impl<T> NodeState<T> {
    fn idle() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            revision: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }
}

/// What a node fetches for its current inputs.
pub struct Fetch<T> {
    key: QueryKey,
    future: BoxFuture<'static, Result<T, AppError>>,
}

impl<T> Fetch<T> {
    pub fn new<F>(key: QueryKey, future: F) -> Self
    where
        F: Future<Output = Result<T, AppError>> + Send + 'static,
    {
        Self {
            key,
            future: future.boxed(),
        }
    }
}

/// Type-erased view of a node used for dependency checks and scheduling.
pub trait GraphNode: Send + Sync {
    fn name(&self) -> &'static str;
    fn status(&self) -> QueryStatus;
    fn revision(&self) -> u64;
    /// Longest upstream path; roots are 0.
    fn depth(&self) -> usize;
    fn evaluate(&self) -> BoxFuture<'_, ()>;
}

type Planner<T> = Box<dyn Fn() -> Option<Fetch<T>> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Done,
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LastRun {
    key: QueryKey,
    upstream: Vec<u64>,
    generation: u64,
}

/// A cached, dependency-aware query.
///
/// The node is enabled only while every declared upstream node is in
/// `Success` and its planner yields a fetch; otherwise it sits in `Idle` with
/// no data. It refetches when the planned key changes, when an upstream
/// revision moves, or when the key's generation is bumped on the client.
pub struct Query<T> {
    name: &'static str,
    depth: usize,
    upstream: Vec<Arc<dyn GraphNode>>,
    planner: Planner<T>,
    client: Arc<QueryClient>,
    state: watch::Sender<NodeState<T>>,
    last: Mutex<Option<LastRun>>,
}

impl<T: Send + Sync + 'static> Query<T> {
    pub fn new<P>(
        name: &'static str,
        client: &Arc<QueryClient>,
        upstream: Vec<Arc<dyn GraphNode>>,
        planner: P,
    ) -> Arc<Self>
    where
        P: Fn() -> Option<Fetch<T>> + Send + Sync + 'static,
    {
        let depth = upstream
            .iter()
            .map(|node| node.depth() + 1)
            .max()
            .unwrap_or(0);
        let (state, _) = watch::channel(NodeState::idle());
        Arc::new(Self {
            name,
            depth,
            upstream,
            planner: Box::new(planner),
            client: client.clone(),
            state,
            last: Mutex::new(None),
        })
    }

    pub fn state(&self) -> NodeState<T> {
        self.state.borrow().clone()
    }

    /// Current result, only while the node is in `Success`.
    pub fn data(&self) -> Option<Arc<T>> {
        let state = self.state.borrow();
        if state.is_success() {
            state.data.clone()
        } else {
            None
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<NodeState<T>> {
        self.state.subscribe()
    }

    fn last_run(&self) -> MutexGuard<'_, Option<LastRun>> {
        self.last.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn disable(&self) {
        *self.last_run() = None;
        self.state.send_if_modified(|state| {
            if state.status == QueryStatus::Idle && state.data.is_none() && state.error.is_none() {
                return false;
            }
            state.status = QueryStatus::Idle;
            state.data = None;
            state.error = None;
            true
        });
    }

    /// Plans and fetches until a result for the key's current generation lands.
    async fn run(&self) {
        while self.run_once().await == Pass::Superseded {}
    }

    async fn run_once(&self) -> Pass {
        let enabled = self
            .upstream
            .iter()
            .all(|node| node.status() == QueryStatus::Success);
        if !enabled {
            self.disable();
            return Pass::Done;
        }
        let Some(fetch) = (self.planner)() else {
            self.disable();
            return Pass::Done;
        };

        let upstream: Vec<u64> = self.upstream.iter().map(|node| node.revision()).collect();
        let previous = self.last_run().clone();
        if let Some(prev) = &previous
            && prev.key == fetch.key
            && prev.upstream != upstream
            && prev.generation == self.client.generation(&fetch.key)
        {
            // Same key, new upstream value: the cached entry was derived from the old one.
            self.client.invalidate(&fetch.key);
        }
        let run = LastRun {
            generation: self.client.generation(&fetch.key),
            key: fetch.key,
            upstream,
        };
        if previous.as_ref() == Some(&run) {
            return Pass::Done;
        }

        *self.last_run() = Some(run.clone());
        let same_key = previous.is_some_and(|prev| prev.key == run.key);
        self.state.send_modify(|state| {
            state.status = QueryStatus::Loading;
            state.error = None;
            if !same_key {
                state.data = None;
            }
        });
        tracing::debug!(target: "query", node = self.name, key = %run.key, "Fetching query");

        let result = self.client.fetch(run.key.clone(), fetch.future).await;

        if self.client.generation(&run.key) != run.generation {
            tracing::debug!(target: "query", node = self.name, key = %run.key, "Superseded while loading");
            return Pass::Superseded;
        }
        match result {
            Ok(data) => self.state.send_modify(|state| {
                state.status = QueryStatus::Success;
                state.data = Some(data);
                state.error = None;
                state.revision += 1;
            }),
            Err(error) => {
                tracing::warn!(target: "query", node = self.name, key = %run.key, error = %error, "Query failed");
                self.state.send_modify(|state| {
                    state.status = QueryStatus::Error;
                    state.data = None;
                    state.error = Some(error);
                });
            }
        }
        Pass::Done
    }
}

impl<T: Send + Sync + 'static> GraphNode for Query<T> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn status(&self) -> QueryStatus {
        self.state.borrow().status
    }

    fn revision(&self) -> u64 {
        self.state.borrow().revision
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn evaluate(&self) -> BoxFuture<'_, ()> {
        self.run().boxed()
    }
}

/// Nodes evaluated level by level: every node of a depth runs concurrently
/// once all shallower nodes have settled.
#[derive(Default)]
pub struct QueryGraph {
    nodes: Vec<Arc<dyn GraphNode>>,
}

impl QueryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<T: Send + Sync + 'static>(&mut self, node: &Arc<Query<T>>) {
        self.nodes.push(node.clone());
    }

    pub async fn tick(&self) {
        let Some(max_depth) = self.nodes.iter().map(|node| node.depth()).max() else {
            return;
        };
        for depth in 0..=max_depth {
            join_all(
                self.nodes
                    .iter()
                    .filter(|node| node.depth() == depth)
                    .map(|node| node.evaluate()),
            )
            .await;
        }
    }

    pub fn statuses(&self) -> Vec<(&'static str, QueryStatus)> {
        self.nodes
            .iter()
            .map(|node| (node.name(), node.status()))
            .collect()
    }

    pub fn is_settled(&self) -> bool {
        self.nodes
            .iter()
            .all(|node| node.status() != QueryStatus::Loading)
    }
}
