// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

//! Token-bound accounts (ERC6551): registry lookups, account detection and
//! signer checks.

use crate::common::error::AppError;
use crate::common::session::Session;
use crate::data::abi::{IERC6551Account, IERC6551Registry};
use crate::domain::constants::ERC6551_VALID_SIGNER_MAGIC;
use crate::network::ledger::read;
use crate::services::readers::ensure_deployed;
use alloy::primitives::{Address, B256, Bytes, U256};
use std::fmt;

/// A deployed registry together with the account implementation and chain it
/// derives addresses for. Accounts are derived with a zero salt.
#[derive(Clone)]
pub struct RegistryHandle {
    address: Address,
    implementation: Address,
    chain_id: u64,
    session: Session,
}

impl fmt::Debug for RegistryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryHandle")
            .field("address", &self.address)
            .field("implementation", &self.implementation)
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

impl RegistryHandle {
    pub async fn resolve(
        session: &Session,
        address: Address,
        implementation: Address,
        chain_id: u64,
    ) -> Result<Self, AppError> {
        ensure_deployed(session, address, "erc6551_registry").await?;
        Ok(Self {
            address,
            implementation,
            chain_id,
            session: session.clone(),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn implementation(&self) -> Address {
        self.implementation
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

/// A token-bound account known to answer `state()`.
#[derive(Clone)]
pub struct TokenBoundAccount {
    address: Address,
    session: Session,
}

impl fmt::Debug for TokenBoundAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenBoundAccount")
            .field("address", &self.address)
            .finish()
    }
}

impl TokenBoundAccount {
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

/// Counterfactual account address of `token_id` on `token_contract`. The
/// account need not exist yet.
pub async fn find_account(
    registry: &RegistryHandle,
    token_contract: Address,
    token_id: U256,
) -> Result<Address, AppError> {
    let account = read(
        registry.session.ledger().as_ref(),
        registry.address,
        &IERC6551Registry::accountCall {
            implementation: registry.implementation,
            salt: B256::ZERO,
            chainId: U256::from(registry.chain_id),
            tokenContract: token_contract,
            tokenId: token_id,
        },
    )
    .await?;
    tracing::debug!(
        target: "reader",
        token_contract = %format!("{:#x}", token_contract),
        token_id = %token_id,
        account = %format!("{:#x}", account),
        "Token-bound account for token"
    );
    Ok(account)
}

/// `None` unless `address` holds code that answers `state()`.
pub async fn get_account(session: &Session, address: Address) -> Result<Option<TokenBoundAccount>, AppError> {
    if session.ledger().code_at(address).await?.is_empty() {
        tracing::debug!(target: "reader", address = %format!("{:#x}", address), "No account deployed at address");
        return Ok(None);
    }
    if let Err(error) = read(session.ledger().as_ref(), address, &IERC6551Account::stateCall {}).await {
        tracing::debug!(
            target: "reader",
            address = %format!("{:#x}", address),
            error = %error,
            "state() failed; not a token-bound account"
        );
        return Ok(None);
    }
    Ok(Some(TokenBoundAccount {
        address,
        session: session.clone(),
    }))
}

/// Whether `signer` may act for `candidate`: either they are the same address,
/// or `candidate` is a token-bound account that accepts `signer`.
pub async fn is_valid_signer(session: &Session, signer: Address, candidate: Address) -> Result<bool, AppError> {
    if signer == candidate {
        return Ok(true);
    }
    let Some(account) = get_account(session, candidate).await? else {
        return Ok(false);
    };
    let magic = read(
        session.ledger().as_ref(),
        account.address,
        &IERC6551Account::isValidSignerCall {
            signer,
            context: Bytes::from_static(&[0x00]),
        },
    )
    .await
    .inspect_err(|error| {
        tracing::error!(
            target: "reader",
            signer = %format!("{:#x}", signer),
            account = %format!("{:#x}", candidate),
            error = %error,
            "isValidSigner failed"
        );
    })?;
    Ok(magic.0 == ERC6551_VALID_SIGNER_MAGIC)
}
