// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

//! The dependency chain behind a subscription contract view:
//! contract handle -> contract snapshot -> funding token handle -> balances,
//! allowance, token metadata -> price; warnings hang off the snapshot.

use crate::common::session::Session;
use crate::domain::snapshot::{ContractSnapshot, Erc20Data, Price, TokenSnapshot};
use crate::network::price_feed::find_price;
use crate::services::query::client::QueryClient;
use crate::services::query::graph::{Fetch, GraphNode, Query, QueryGraph};
use crate::services::query::keys::{erc20_keys, subscription_keys};
use crate::services::readers::analytics::{WarningMessage, analyze_contract};
use crate::services::readers::erc20::{Erc20Handle, get_allowance, get_balance, get_erc20_data};
use crate::services::readers::subscription::{SubscriptionHandle, get_contract_data, get_token_data};
use alloy::primitives::{Address, U256};
use std::sync::Arc;

pub struct SubscriptionQueries {
    pub subscription_contract: Arc<Query<SubscriptionHandle>>,
    pub subscription_data: Arc<Query<ContractSnapshot>>,
    pub subscription_erc20_balance: Arc<Query<U256>>,
    pub erc20_contract: Arc<Query<Erc20Handle>>,
    pub erc20_data: Arc<Query<Erc20Data>>,
    pub erc20_allowance: Arc<Query<U256>>,
    pub erc20_balance: Arc<Query<U256>>,
    pub token_price: Arc<Query<Option<Price>>>,
    pub warnings: Arc<Query<Vec<WarningMessage>>>,
    client: Arc<QueryClient>,
    graph: QueryGraph,
}

impl SubscriptionQueries {
    pub fn graph(&self) -> &QueryGraph {
        &self.graph
    }

    /// Evaluate every node once, roots first.
    pub async fn refresh(&self) {
        self.graph.tick().await;
    }

    /// Snapshot of one token, keyed by contract and token id and gated on the
    /// contract handle. The node is not part of `graph()`; evaluate it directly
    /// or add it to a graph of its own.
    pub fn token(&self, token_id: U256) -> Arc<Query<TokenSnapshot>> {
        let contract = self.subscription_contract.clone();
        Query::new(
            "subscription_token",
            &self.client,
            vec![upstream(&self.subscription_contract)],
            move || {
                let handle = contract.data()?;
                Some(Fetch::new(
                    subscription_keys::token(handle.address(), token_id),
                    async move { get_token_data(&handle, token_id).await },
                ))
            },
        )
    }
}

fn upstream<T: Send + Sync + 'static>(node: &Arc<Query<T>>) -> Arc<dyn GraphNode> {
    node.clone()
}

pub fn subscription_queries(
    session: &Session,
    client: &Arc<QueryClient>,
    address: Address,
) -> SubscriptionQueries {
    let subscription_contract = {
        let session = session.clone();
        Query::new("subscription_contract", client, vec![], move || {
            let session = session.clone();
            Some(Fetch::new(
                subscription_keys::contract(address),
                async move { SubscriptionHandle::resolve(&session, address).await },
            ))
        })
    };

    let subscription_data = {
        let contract = subscription_contract.clone();
        Query::new(
            "subscription_data",
            client,
            vec![upstream(&subscription_contract)],
            move || {
                let handle = contract.data()?;
                Some(Fetch::new(subscription_keys::contract_uri(address), async move {
                    tracing::debug!(target: "query", address = %format!("{:#x}", address), "Querying subscription contract data");
                    get_contract_data(&handle).await
                }))
            },
        )
    };

    let erc20_contract = {
        let session = session.clone();
        let data = subscription_data.clone();
        Query::new(
            "erc20_contract",
            client,
            vec![upstream(&subscription_data)],
            move || {
                let token = data.data()?.token;
                if token == Address::ZERO {
                    return None;
                }
                let session = session.clone();
                Some(Fetch::new(erc20_keys::contract(token), async move {
                    Erc20Handle::resolve(&session, token).await
                }))
            },
        )
    };

    let subscription_erc20_balance = {
        let erc20 = erc20_contract.clone();
        Query::new(
            "subscription_erc20_balance",
            client,
            vec![upstream(&erc20_contract)],
            move || {
                let handle = erc20.data()?;
                Some(Fetch::new(
                    erc20_keys::balance(handle.address(), address),
                    async move { get_balance(&handle, address).await },
                ))
            },
        )
    };

    let erc20_data = {
        let erc20 = erc20_contract.clone();
        Query::new(
            "erc20_data",
            client,
            vec![upstream(&erc20_contract)],
            move || {
                let handle = erc20.data()?;
                Some(Fetch::new(erc20_keys::metadata(handle.address()), async move {
                    get_erc20_data(&handle).await
                }))
            },
        )
    };

    let erc20_allowance = {
        let account = session.account();
        let erc20 = erc20_contract.clone();
        Query::new(
            "erc20_allowance",
            client,
            vec![upstream(&erc20_contract), upstream(&subscription_contract)],
            move || {
                let owner = account?;
                let handle = erc20.data()?;
                Some(Fetch::new(
                    erc20_keys::allowance(handle.address(), owner, address),
                    async move { get_allowance(&handle, owner, address).await },
                ))
            },
        )
    };

    let erc20_balance = {
        let account = session.account();
        let erc20 = erc20_contract.clone();
        Query::new(
            "erc20_balance",
            client,
            vec![upstream(&erc20_contract)],
            move || {
                let owner = account?;
                let handle = erc20.data()?;
                Some(Fetch::new(
                    erc20_keys::balance(handle.address(), owner),
                    async move { get_balance(&handle, owner).await },
                ))
            },
        )
    };

    let token_price = {
        let session = session.clone();
        let metadata = erc20_data.clone();
        Query::new(
            "token_price",
            client,
            vec![upstream(&erc20_data)],
            move || {
                let token = metadata.data()?.address;
                let session = session.clone();
                Some(Fetch::new(erc20_keys::price(token), async move {
                    find_price(session.ledger().as_ref(), token, session.price_feeds()).await
                }))
            },
        )
    };

    let warnings = {
        let data = subscription_data.clone();
        Query::new(
            "warnings",
            client,
            vec![upstream(&subscription_data)],
            move || {
                let snapshot = data.data();
                Some(Fetch::new(subscription_keys::warnings(address), async move {
                    let warnings = snapshot
                        .map(|snapshot| analyze_contract(&snapshot))
                        .unwrap_or_default();
                    tracing::debug!(target: "query", count = warnings.len(), "Warnings found");
                    Ok(warnings)
                }))
            },
        )
    };

    let mut graph = QueryGraph::new();
    graph.add(&subscription_contract);
    graph.add(&subscription_data);
    graph.add(&erc20_contract);
    graph.add(&subscription_erc20_balance);
    graph.add(&erc20_data);
    graph.add(&erc20_allowance);
    graph.add(&erc20_balance);
    graph.add(&token_price);
    graph.add(&warnings);

    SubscriptionQueries {
        subscription_contract,
        subscription_data,
        subscription_erc20_balance,
        erc20_contract,
        erc20_data,
        erc20_allowance,
        erc20_balance,
        token_price,
        warnings,
        client: client.clone(),
        graph,
    }
}
