// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::common::session::Session;
use crate::data::abi::ISubscription;
use crate::domain::snapshot::{ContractSnapshot, TokenSnapshot};
use crate::network::ledger::read;
use crate::services::codec::{MetadataSchema, decode};
use crate::services::readers::ensure_deployed;
use alloy::primitives::{Address, U256};
use std::fmt;

/// A subscription contract bound to the session it is read and written through.
#[derive(Clone)]
pub struct SubscriptionHandle {
    address: Address,
    session: Session,
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("address", &self.address)
            .field("account", &self.session.account())
            .finish()
    }
}

impl SubscriptionHandle {
    pub async fn resolve(session: &Session, address: Address) -> Result<Self, AppError> {
        ensure_deployed(session, address, "subscription").await?;
        tracing::debug!(
            target: "reader",
            address = %format!("{:#x}", address),
            "Created subscription contract handle"
        );
        Ok(Self {
            address,
            session: session.clone(),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

async fn fetch_document<S: MetadataSchema>(
    handle: &SubscriptionHandle,
    reference: String,
    context: &str,
) -> Result<S, AppError> {
    let result = match handle.session.documents().resolve(&reference).await {
        Ok(doc) => decode::<S>(&doc),
        Err(err) => Err(err),
    };
    if let Err(AppError::MalformedMetadata { reason, payload }) = &result {
        tracing::error!(
            target: "reader",
            address = %format!("{:#x}", handle.address),
            context,
            reason = %reason,
            payload_len = payload.len(),
            "Malformed on-chain metadata document"
        );
    }
    result
}

pub async fn get_contract_data(handle: &SubscriptionHandle) -> Result<ContractSnapshot, AppError> {
    let ledger = handle.session.ledger().as_ref();
    let reference = read(ledger, handle.address, &ISubscription::contractURICall {}).await?;
    fetch_document(handle, reference, "contractURI").await
}

pub async fn get_token_data(
    handle: &SubscriptionHandle,
    token_id: U256,
) -> Result<TokenSnapshot, AppError> {
    let ledger = handle.session.ledger().as_ref();
    let reference = read(
        ledger,
        handle.address,
        &ISubscription::tokenURICall { tokenId: token_id },
    )
    .await?;
    fetch_document(handle, reference, "tokenURI").await
}

pub async fn total_supply(handle: &SubscriptionHandle) -> Result<U256, AppError> {
    read(
        handle.session.ledger().as_ref(),
        handle.address,
        &ISubscription::totalSupplyCall {},
    )
    .await
}

pub async fn token_by_index(handle: &SubscriptionHandle, index: u64) -> Result<U256, AppError> {
    read(
        handle.session.ledger().as_ref(),
        handle.address,
        &ISubscription::tokenByIndexCall {
            index: U256::from(index),
        },
    )
    .await
}

pub async fn owned_count(handle: &SubscriptionHandle, owner: Address) -> Result<U256, AppError> {
    read(
        handle.session.ledger().as_ref(),
        handle.address,
        &ISubscription::balanceOfCall { owner },
    )
    .await
}

pub async fn owned_token_by_index(
    handle: &SubscriptionHandle,
    owner: Address,
    index: u64,
) -> Result<U256, AppError> {
    read(
        handle.session.ledger().as_ref(),
        handle.address,
        &ISubscription::tokenOfOwnerByIndexCall {
            owner,
            index: U256::from(index),
        },
    )
    .await
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::data::metadata::DocumentResolver;
    use crate::domain::constants::DATA_URI_JSON;
    use crate::network::scripted::ScriptedLedger;
    use serde_json::{Value, json};
    use std::sync::Arc;

    pub fn contract_document(token: Address, flags: u64) -> Value {
        json!({
            "name": "Tier 1 Sub to Jane",
            "description": "Monthly access",
            "attributes": [
                {"trait_type": "token", "value": format!("{:#x}", token)},
                {"trait_type": "rate", "value": 100},
                {"trait_type": "lock", "value": 10},
                {"trait_type": "epoch_size", "value": 86400},
                {"trait_type": "total_supply", "value": 3},
                {"trait_type": "owner_contract", "value": "0x0000000000000000000000000000000000000000"},
                {"trait_type": "owner_id", "value": 1},
                {"trait_type": "owner_address", "value": "0x0000000000000000000000000000000000000000"},
                {"trait_type": "claimable", "value": 0},
                {"trait_type": "total_claimed", "value": 0},
                {"trait_type": "flags", "value": flags}
            ]
        })
    }

    pub fn token_document(id: u64) -> Value {
        json!({
            "name": format!("Subscription #{id}"),
            "attributes": [
                {"trait_type": "deposited", "value": 1000 * id},
                {"trait_type": "spent", "value": 0},
                {"trait_type": "unspent", "value": 1000 * id},
                {"trait_type": "withdrawable", "value": 1000 * id},
                {"trait_type": "active", "value": 1},
                {"trait_type": "expire", "value": 1760000000u64 + id}
            ]
        })
    }

    pub fn inline(doc: &Value) -> String {
        format!("{}{}", DATA_URI_JSON, doc)
    }

    pub fn session(ledger: Arc<ScriptedLedger>) -> Session {
        Session::new(ledger, DocumentResolver::with_default_timeout().unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::network::scripted::ScriptedLedger;
    use alloy::primitives::address;
    use serde_json::json;
    use std::sync::Arc;

    const SUB: Address = address!("1000000000000000000000000000000000000001");
    const TOKEN: Address = address!("3000000000000000000000000000000000000003");

    #[tokio::test]
    async fn resolve_requires_deployed_code() {
        let ledger = Arc::new(ScriptedLedger::new());
        let session = session(ledger.clone());
        assert!(matches!(
            SubscriptionHandle::resolve(&session, SUB).await,
            Err(AppError::Validation { .. })
        ));
        ledger.deploy(SUB);
        let handle = SubscriptionHandle::resolve(&session, SUB).await.unwrap();
        assert_eq!(handle.address(), SUB);
    }

    #[tokio::test]
    async fn reads_contract_and_token_snapshots() {
        let ledger = Arc::new(ScriptedLedger::new());
        ledger
            .deploy(SUB)
            .on_call(
                SUB,
                &ISubscription::contractURICall {},
                &inline(&contract_document(TOKEN, 0)),
            )
            .on_call(
                SUB,
                &ISubscription::tokenURICall {
                    tokenId: U256::from(2u64),
                },
                &inline(&token_document(2)),
            );
        let handle = SubscriptionHandle::resolve(&session(ledger), SUB)
            .await
            .unwrap();

        let contract = get_contract_data(&handle).await.unwrap();
        assert_eq!(contract.token, TOKEN);
        assert_eq!(contract.epoch_size, 86_400);

        let token = get_token_data(&handle, U256::from(2u64)).await.unwrap();
        assert_eq!(token.metadata.name, "Subscription #2");
        assert_eq!(token.deposited, U256::from(2000u64));
    }

    #[tokio::test]
    async fn malformed_document_is_reraised() {
        let ledger = Arc::new(ScriptedLedger::new());
        ledger.deploy(SUB).on_call(
            SUB,
            &ISubscription::contractURICall {},
            &inline(&json!({"name": "Tier 1", "attributes": []})),
        );
        let handle = SubscriptionHandle::resolve(&session(ledger), SUB)
            .await
            .unwrap();
        assert!(matches!(
            get_contract_data(&handle).await,
            Err(AppError::MalformedMetadata { .. })
        ));
    }

    #[tokio::test]
    async fn transport_failures_pass_through() {
        let ledger = Arc::new(ScriptedLedger::new());
        ledger
            .deploy(SUB)
            .fail_call(SUB, &ISubscription::contractURICall {}, "node timeout");
        let handle = SubscriptionHandle::resolve(&session(ledger.clone()), SUB)
            .await
            .unwrap();
        match get_contract_data(&handle).await {
            Err(AppError::Connection(reason)) => assert_eq!(reason, "node timeout"),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(ledger.call_count(), 1);
    }
}
