// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

//! Offline `LedgerClient` driven by pre-scripted responses. Used by tests and
//! dry runs; every request it receives is recorded for later inspection.

use crate::common::error::AppError;
use crate::network::ledger::{FinalizedReceipt, LedgerClient, call_request};
use alloy::primitives::{Address, B256, Bytes, Log, keccak256};
use alloy::rpc::types::eth::TransactionRequest;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone)]
pub enum ScriptedReceipt {
    Finalized { success: bool, logs: Vec<Log> },
    Failed(String),
}

#[derive(Default)]
pub struct ScriptedLedger {
    calls: Mutex<HashMap<(Address, Bytes), Result<Bytes, String>>>,
    deployed: Mutex<HashSet<Address>>,
    gas_estimate: Mutex<Option<Result<u64, String>>>,
    send_rejection: Mutex<Option<String>>,
    receipts: Mutex<VecDeque<ScriptedReceipt>>,
    sent: Mutex<Vec<TransactionRequest>>,
    call_count: AtomicUsize,
    estimate_count: AtomicUsize,
}

impl ScriptedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `call` on `to` with `ret`, encoded the way the contract would.
    pub fn on_call<C: SolCall>(&self, to: Address, call: &C, ret: &C::Return) -> &Self {
        let request = call_request(to, call);
        let data = request.input.input().cloned().unwrap_or_default();
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((to, data), Ok(Bytes::from(C::abi_encode_returns(ret))));
        self
    }

    pub fn fail_call<C: SolCall>(&self, to: Address, call: &C, reason: &str) -> &Self {
        let request = call_request(to, call);
        let data = request.input.input().cloned().unwrap_or_default();
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((to, data), Err(reason.to_string()));
        self
    }

    pub fn deploy(&self, address: Address) -> &Self {
        self.deployed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(address);
        self
    }

    pub fn set_gas_estimate(&self, estimate: Result<u64, String>) -> &Self {
        *self.gas_estimate.lock().unwrap_or_else(|e| e.into_inner()) = Some(estimate);
        self
    }

    pub fn reject_sends(&self, reason: &str) -> &Self {
        *self.send_rejection.lock().unwrap_or_else(|e| e.into_inner()) = Some(reason.to_string());
        self
    }

    /// Queue the outcome of the next `wait`.
    pub fn push_receipt(&self, receipt: ScriptedReceipt) -> &Self {
        self.receipts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(receipt);
        self
    }

    pub fn sent(&self) -> Vec<TransactionRequest> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn estimate_count(&self) -> usize {
        self.estimate_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl LedgerClient for ScriptedLedger {
    async fn call(&self, tx: TransactionRequest) -> Result<Bytes, AppError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        tokio::task::yield_now().await;
        let to = tx.to.and_then(|kind| kind.to().copied()).unwrap_or_default();
        let data = tx.input.input().cloned().unwrap_or_default();
        let scripted = self
            .calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(to, data))
            .cloned();
        match scripted {
            Some(Ok(bytes)) => Ok(bytes),
            Some(Err(reason)) => Err(AppError::Connection(reason)),
            None => Err(AppError::Connection(format!(
                "no scripted response for call to {:#x}",
                to
            ))),
        }
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, AppError> {
        let deployed = self
            .deployed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&address);
        Ok(if deployed {
            Bytes::from_static(&[0x60, 0x80, 0x60, 0x40])
        } else {
            Bytes::new()
        })
    }

    async fn estimate_gas(&self, _tx: TransactionRequest) -> Result<u64, AppError> {
        self.estimate_count.fetch_add(1, Ordering::Relaxed);
        match self
            .gas_estimate
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        {
            Some(Ok(gas)) => Ok(gas),
            Some(Err(reason)) => Err(AppError::Connection(reason)),
            None => Err(AppError::Connection("no scripted gas estimate".into())),
        }
    }

    async fn send(&self, tx: TransactionRequest) -> Result<B256, AppError> {
        if let Some(reason) = self
            .send_rejection
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        {
            return Err(AppError::Connection(reason));
        }
        let mut sent = self.sent.lock().unwrap_or_else(|e| e.into_inner());
        sent.push(tx);
        Ok(keccak256((sent.len() as u64).to_be_bytes()))
    }

    async fn wait(&self, hash: B256) -> Result<FinalizedReceipt, AppError> {
        tokio::task::yield_now().await;
        let next = self
            .receipts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match next {
            Some(ScriptedReceipt::Finalized { success, logs }) => Ok(FinalizedReceipt {
                transaction_hash: hash,
                block_number: Some(1),
                success,
                logs,
            }),
            Some(ScriptedReceipt::Failed(reason)) => Err(AppError::Connection(reason)),
            None => Err(AppError::Connection(format!(
                "no receipt scripted for {:#x}",
                hash
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::abi::ISubscription;
    use crate::network::ledger::read;
    use alloy::primitives::address;

    #[tokio::test]
    async fn scripted_reads_round_through_abi() {
        let sub = address!("1000000000000000000000000000000000000001");
        let ledger = ScriptedLedger::new();
        ledger.on_call(
            sub,
            &ISubscription::contractURICall {},
            &"data:application/json,{}".to_string(),
        );

        let uri = read(&ledger, sub, &ISubscription::contractURICall {})
            .await
            .unwrap();
        assert_eq!(uri, "data:application/json,{}");
        assert_eq!(ledger.call_count(), 1);

        let missing = read(&ledger, sub, &ISubscription::totalSupplyCall {}).await;
        assert!(matches!(missing, Err(AppError::Connection(_))));
    }

    #[tokio::test]
    async fn sends_are_recorded_with_distinct_hashes() {
        let ledger = ScriptedLedger::new();
        let a = ledger.send(TransactionRequest::default()).await.unwrap();
        let b = ledger.send(TransactionRequest::default()).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(ledger.sent().len(), 2);

        ledger.reject_sends("user denied");
        assert!(ledger.send(TransactionRequest::default()).await.is_err());
        assert_eq!(ledger.sent().len(), 2);
    }
}
