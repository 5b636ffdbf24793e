// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::data::abi::IERC20;
use crate::network::ledger::{LogFilter, address_topic, call_request};
use crate::services::actions::pipeline::{ActionKind, TxAction};
use crate::services::actions::require_positive;
use crate::services::readers::erc20::Erc20Handle;
use alloy::primitives::{Address, U256};

/// Approve `spender` for `amount`; completes with the approved value taken from
/// the `Approval(owner, spender)` log.
pub fn approve(handle: &Erc20Handle, spender: Address, amount: U256) -> Result<TxAction<U256>, AppError> {
    let amount = require_positive("amount", amount)?;
    let owner = handle.session().require_account()?;
    let request = call_request(handle.address(), &IERC20::approveCall { spender, amount }).from(owner);
    let filter = LogFilter::event::<IERC20::Approval>()
        .address(handle.address())
        .indexed(1, address_topic(owner))
        .indexed(2, address_topic(spender));
    Ok(TxAction::new(
        ActionKind::Approval,
        request,
        filter,
        |event: IERC20::Approval| event.value,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::scripted::{ScriptedLedger, ScriptedReceipt};
    use crate::services::actions::pipeline::{TxEvent, TxPipeline};
    use crate::services::readers::subscription::fixtures;
    use alloy::primitives::{Bytes, Log, LogData, address};
    use alloy::sol_types::SolEvent;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    const TOKEN: Address = address!("3000000000000000000000000000000000000003");
    const SPENDER: Address = address!("1000000000000000000000000000000000000001");
    const OWNER: Address = address!("2000000000000000000000000000000000000002");

    fn approval_log(owner: Address, value: u64) -> Log {
        let event = IERC20::Approval {
            owner,
            spender: SPENDER,
            value: U256::from(value),
        };
        Log {
            address: TOKEN,
            data: LogData::new_unchecked(
                vec![
                    IERC20::Approval::SIGNATURE_HASH,
                    address_topic(owner),
                    address_topic(SPENDER),
                ],
                Bytes::from(event.encode_data()),
            ),
        }
    }

    #[tokio::test]
    async fn approve_extracts_value_for_acting_owner() {
        let ledger = Arc::new(ScriptedLedger::new());
        ledger.deploy(TOKEN);
        let other = address!("4000000000000000000000000000000000000004");
        ledger.push_receipt(ScriptedReceipt::Finalized {
            success: true,
            logs: vec![approval_log(other, 1), approval_log(OWNER, 500)],
        });
        let session = fixtures::session(ledger.clone()).with_account(Some(OWNER));
        let handle = Erc20Handle::resolve(&session, TOKEN).await.unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let outcome = TxPipeline::new(ledger.clone())
            .run(approve(&handle, SPENDER, U256::from(500u64)).unwrap(), &tx)
            .await
            .unwrap();

        assert_eq!(outcome.result, U256::from(500u64));
        assert!(matches!(rx.recv().await, Some(TxEvent::Submitted { .. })));
        assert!(matches!(rx.recv().await, Some(TxEvent::Completed { result, .. }) if result == U256::from(500u64)));
        assert_eq!(ledger.sent()[0].from, Some(OWNER));
    }

    #[tokio::test]
    async fn approve_requires_amount_and_account() {
        let ledger = Arc::new(ScriptedLedger::new());
        ledger.deploy(TOKEN);
        let session = fixtures::session(ledger.clone());
        let handle = Erc20Handle::resolve(&session, TOKEN).await.unwrap();

        assert!(matches!(
            approve(&handle, SPENDER, U256::from(1u64)),
            Err(AppError::NoActiveAccount)
        ));
        assert!(matches!(
            approve(&handle, SPENDER, U256::ZERO),
            Err(AppError::InvalidParameter { .. })
        ));
    }
}
