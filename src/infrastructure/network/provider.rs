// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::error::AppError;
use crate::common::retry::{RetryPolicy, retry_when};
use crate::network::ledger::{FinalizedReceipt, LedgerClient};
use alloy::primitives::{Address, B256, Bytes};
use alloy::providers::{DynProvider, Provider, ProviderBuilder, RootProvider};
use alloy::rpc::types::eth::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

pub struct ConnectionFactory;

impl ConnectionFactory {
    pub fn http(rpc_url: &str) -> Result<DynProvider, AppError> {
        let url =
            Url::parse(rpc_url).map_err(|e| AppError::Config(format!("Invalid RPC URL: {}", e)))?;

        Ok(RootProvider::new_http(url).erased())
    }

    /// HTTP provider that signs and fills outgoing transactions with `wallet_key`.
    pub fn http_with_wallet(
        rpc_url: &str,
        wallet_key: &str,
    ) -> Result<(DynProvider, Address), AppError> {
        let url =
            Url::parse(rpc_url).map_err(|e| AppError::Config(format!("Invalid RPC URL: {}", e)))?;
        let signer = PrivateKeySigner::from_str(wallet_key)
            .map_err(|e| AppError::Config(format!("Invalid wallet key: {}", e)))?;
        let address = signer.address();

        let provider = ProviderBuilder::new()
            .wallet(signer)
            .connect_http(url)
            .erased();
        Ok((provider, address))
    }
}

/// `LedgerClient` over an alloy provider.
#[derive(Clone)]
pub struct AlloyLedger {
    provider: DynProvider,
    sender: Option<Address>,
    receipt_policy: RetryPolicy,
}

impl AlloyLedger {
    pub fn new(provider: DynProvider, sender: Option<Address>) -> Self {
        Self {
            provider,
            sender,
            receipt_policy: RetryPolicy::polling(
                Duration::from_millis(crate::domain::constants::DEFAULT_RECEIPT_POLL_MS),
                Duration::from_millis(crate::domain::constants::DEFAULT_RECEIPT_TIMEOUT_MS),
            ),
        }
    }

    pub fn with_receipt_polling(mut self, poll: Duration, timeout: Duration) -> Self {
        self.receipt_policy = RetryPolicy::polling(poll, timeout);
        self
    }

    fn with_sender(&self, mut tx: TransactionRequest) -> TransactionRequest {
        if tx.from.is_none() {
            tx.from = self.sender;
        }
        tx
    }
}

#[async_trait]
impl LedgerClient for AlloyLedger {
    async fn call(&self, tx: TransactionRequest) -> Result<Bytes, AppError> {
        self.provider
            .call(tx)
            .await
            .map_err(|e| AppError::Connection(format!("eth_call failed: {}", e)))
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, AppError> {
        self.provider
            .get_code_at(address)
            .await
            .map_err(|e| AppError::Connection(format!("eth_getCode failed: {}", e)))
    }

    async fn estimate_gas(&self, tx: TransactionRequest) -> Result<u64, AppError> {
        self.provider
            .estimate_gas(self.with_sender(tx))
            .await
            .map_err(|e| AppError::Connection(format!("estimate_gas failed: {}", e)))
    }

    async fn send(&self, tx: TransactionRequest) -> Result<B256, AppError> {
        let pending = self
            .provider
            .send_transaction(self.with_sender(tx))
            .await
            .map_err(|e| AppError::Connection(format!("send_transaction failed: {}", e)))?;
        Ok(*pending.tx_hash())
    }

    async fn wait(&self, hash: B256) -> Result<FinalizedReceipt, AppError> {
        let provider = self.provider.clone();
        let receipt = retry_when(
            move |_| {
                let provider = provider.clone();
                async move {
                    match provider.get_transaction_receipt(hash).await {
                        Ok(Some(rcpt)) => Ok(rcpt),
                        Ok(None) => Err(AppError::Connection(format!(
                            "receipt for {:#x} not available yet",
                            hash
                        ))),
                        Err(e) => Err(AppError::Connection(format!(
                            "receipt fetch failed: {}",
                            e
                        ))),
                    }
                }
            },
            self.receipt_policy,
            AppError::is_retryable,
        )
        .await?;

        tracing::debug!(
            target: "ledger",
            hash = %format!("{:#x}", hash),
            block = ?receipt.block_number,
            status = receipt.status(),
            "Receipt finalized"
        );

        Ok(FinalizedReceipt {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            success: receipt.status(),
            logs: receipt
                .inner
                .logs()
                .iter()
                .map(|log| log.inner.clone())
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_rpc_url() {
        assert!(matches!(
            ConnectionFactory::http("not a url"),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn rejects_malformed_wallet_key() {
        let res = ConnectionFactory::http_with_wallet("http://127.0.0.1:8545", "0x1234");
        assert!(matches!(res, Err(AppError::Config(msg)) if msg.contains("wallet key")));
    }
}
