// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use alloy::primitives::{Address, B256, Bytes, Log, U256};
use alloy::rpc::types::eth::{TransactionInput, TransactionRequest};
use alloy::sol_types::{SolCall, SolEvent};
use async_trait::async_trait;

/// Finalized outcome of a submission with its logs in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedReceipt {
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
    pub success: bool,
    pub logs: Vec<Log>,
}

/// The remote ledger as seen by readers and the action pipeline. Implementations
/// never retry on behalf of the caller except where noted.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Read-only call returning raw ABI-encoded return data.
    async fn call(&self, tx: TransactionRequest) -> Result<Bytes, AppError>;

    async fn code_at(&self, address: Address) -> Result<Bytes, AppError>;

    async fn estimate_gas(&self, tx: TransactionRequest) -> Result<u64, AppError>;

    /// Dispatch a mutating call; returns the submission identifier.
    async fn send(&self, tx: TransactionRequest) -> Result<B256, AppError>;

    /// Wait until `hash` is finalized. Polling for an absent receipt is the
    /// implementation's concern.
    async fn wait(&self, hash: B256) -> Result<FinalizedReceipt, AppError>;
}

pub fn call_request<C: SolCall>(to: Address, call: &C) -> TransactionRequest {
    TransactionRequest::default()
        .to(to)
        .input(TransactionInput::new(Bytes::from(call.abi_encode())))
}

/// Typed read: encodes `call`, dispatches it and decodes the return value.
pub async fn read<C: SolCall>(
    ledger: &dyn LedgerClient,
    to: Address,
    call: &C,
) -> Result<C::Return, AppError> {
    let raw = ledger.call(call_request(to, call)).await?;
    C::abi_decode_returns(&raw).map_err(|e| AppError::AbiDecode {
        context: format!("{} on {:#x}", C::SIGNATURE, to),
        message: e.to_string(),
    })
}

pub fn address_topic(address: Address) -> B256 {
    address.into_word()
}

pub fn u256_topic(value: U256) -> B256 {
    B256::from(value.to_be_bytes::<32>())
}

/// Selects logs by event signature, optional emitter and optional indexed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    signature: &'static str,
    signature_hash: B256,
    address: Option<Address>,
    topics: [Option<B256>; 3],
}

impl LogFilter {
    pub fn event<E: SolEvent>() -> Self {
        Self {
            signature: E::SIGNATURE,
            signature_hash: E::SIGNATURE_HASH,
            address: None,
            topics: [None; 3],
        }
    }

    pub fn address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    /// Constrain the indexed argument at `position` (1-based, after the signature topic).
    pub fn indexed(mut self, position: usize, topic: B256) -> Self {
        if let Some(slot) = position
            .checked_sub(1)
            .and_then(|idx| self.topics.get_mut(idx))
        {
            *slot = Some(topic);
        }
        self
    }

    pub fn event_name(&self) -> &'static str {
        self.signature
            .split_once('(')
            .map(|(name, _)| name)
            .unwrap_or(self.signature)
    }

    pub fn matches(&self, log: &Log) -> bool {
        if let Some(address) = self.address
            && log.address != address
        {
            return false;
        }
        let topics = log.data.topics();
        if topics.first() != Some(&self.signature_hash) {
            return false;
        }
        self.topics.iter().enumerate().all(|(idx, expected)| match expected {
            Some(topic) => topics.get(idx + 1) == Some(topic),
            None => true,
        })
    }

    /// First matching log in emission order.
    pub fn first_match<'a>(&self, logs: &'a [Log]) -> Option<&'a Log> {
        logs.iter().find(|log| self.matches(log))
    }
}
