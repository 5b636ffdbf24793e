// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

pub mod client;
pub mod graph;
pub mod keys;
pub mod subscription;

pub use client::QueryClient;
pub use graph::{Fetch, GraphNode, NodeState, Query, QueryGraph, QueryStatus};
pub use keys::{QueryKey, erc20_keys, subscription_keys};
pub use subscription::{SubscriptionQueries, subscription_queries};
