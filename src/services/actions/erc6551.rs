// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::data::abi::{IERC6551Executable, IERC6551Registry};
use crate::domain::constants::ERC6551_OPERATION_CALL;
use crate::network::ledger::{LogFilter, address_topic, call_request, u256_topic};
use crate::services::actions::pipeline::{ActionKind, TxAction};
use crate::services::readers::erc6551::{RegistryHandle, TokenBoundAccount};
use alloy::primitives::{Address, B256, U256};

/// Deploy the token-bound account of `token_id`; completes with the account
/// address from the registry's `ERC6551AccountCreated` log.
pub fn create_account(
    registry: &RegistryHandle,
    token_contract: Address,
    token_id: U256,
) -> Result<TxAction<Address>, AppError> {
    let sender = registry.session().require_account()?;
    let call = IERC6551Registry::createAccountCall {
        implementation: registry.implementation(),
        salt: B256::ZERO,
        chainId: U256::from(registry.chain_id()),
        tokenContract: token_contract,
        tokenId: token_id,
    };
    let filter = LogFilter::event::<IERC6551Registry::ERC6551AccountCreated>()
        .address(registry.address())
        .indexed(1, address_topic(registry.implementation()))
        .indexed(2, address_topic(token_contract))
        .indexed(3, u256_topic(token_id));
    Ok(TxAction::new(
        ActionKind::CreateAccount,
        call_request(registry.address(), &call).from(sender),
        filter,
        |event: IERC6551Registry::ERC6551AccountCreated| event.account,
    ))
}

/// Route `action` through `account`: the same call is made by the account via
/// `execute`, forwarding `value` from the account's balance. The expected log
/// and result of `action` are kept, so it must not depend on who the caller is.
pub fn execute<R>(account: &TokenBoundAccount, action: TxAction<R>, value: U256) -> Result<TxAction<R>, AppError> {
    let sender = account.session().require_account()?;
    let inner = action.request();
    let Some(target) = inner.to.and_then(|kind| kind.to().copied()) else {
        return Err(AppError::invalid_parameter("action", "has no call target"));
    };
    let call = IERC6551Executable::executeCall {
        to: target,
        value,
        data: inner.input.input().cloned().unwrap_or_default(),
        operation: ERC6551_OPERATION_CALL,
    };
    tracing::debug!(
        target: "tx",
        action = %action.kind(),
        account = %format!("{:#x}", account.address()),
        target = %format!("{:#x}", target),
        "Routing action through token-bound account"
    );
    let request = call_request(account.address(), &call).from(sender);
    Ok(action.with_request(request))
}
