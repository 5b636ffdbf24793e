// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

//! Mutating calls on a subscription contract. Each builder validates its
//! arguments and the acting account synchronously and returns a `TxAction`
//! that names the log proving the call's effect; `TxPipeline::run` submits it.

use crate::common::error::AppError;
use crate::data::abi::ISubscription;
use crate::domain::constants::BPS_DENOMINATOR;
use crate::domain::snapshot::FeatureFlags;
use crate::network::ledger::{LogFilter, address_topic, call_request, u256_topic};
use crate::services::actions::pipeline::{ActionKind, GasPolicy, TxAction};
use crate::services::actions::require_positive;
use crate::services::codec::LinkField;
use crate::services::readers::subscription::SubscriptionHandle;
use alloy::primitives::{Address, U256};
use alloy::rpc::types::eth::TransactionRequest;
use alloy::sol_types::SolCall;

fn request<C: SolCall>(handle: &SubscriptionHandle, call: &C) -> Result<TransactionRequest, AppError> {
    let account = handle.session().require_account()?;
    Ok(call_request(handle.address(), call).from(account))
}

fn token_filter<E: alloy::sol_types::SolEvent>(handle: &SubscriptionHandle, token_id: U256) -> LogFilter {
    LogFilter::event::<E>()
        .address(handle.address())
        .indexed(1, u256_topic(token_id))
}

/// Mint a new subscription funded with `amount`. Completes with the new token id
/// read from the `Transfer(0x0 -> account)` log of this contract.
pub fn mint(handle: &SubscriptionHandle, amount: U256, message: &str) -> Result<TxAction<U256>, AppError> {
    let amount = require_positive("amount", amount)?;
    let account = handle.session().require_account()?;
    let call = ISubscription::mintCall {
        amount,
        message: message.to_string(),
    };
    let request = request(handle, &call)?;
    let filter = LogFilter::event::<ISubscription::Transfer>()
        .address(handle.address())
        .indexed(1, address_topic(Address::ZERO))
        .indexed(2, address_topic(account));
    Ok(TxAction::new(
        ActionKind::Mint,
        request,
        filter,
        |event: ISubscription::Transfer| event.tokenId,
    ))
}

/// Top up `token_id`; completes with the added amount.
pub fn renew(
    handle: &SubscriptionHandle,
    token_id: U256,
    amount: U256,
    message: &str,
) -> Result<TxAction<U256>, AppError> {
    let amount = require_positive("amount", amount)?;
    let call = ISubscription::renewCall {
        tokenId: token_id,
        amount,
        message: message.to_string(),
    };
    Ok(TxAction::new(
        ActionKind::Deposit,
        request(handle, &call)?,
        token_filter::<ISubscription::SubscriptionRenewed>(handle, token_id),
        |event: ISubscription::SubscriptionRenewed| event.addedAmount,
    ))
}

pub fn withdraw(handle: &SubscriptionHandle, token_id: U256, amount: U256) -> Result<TxAction<U256>, AppError> {
    let amount = require_positive("amount", amount)?;
    let call = ISubscription::withdrawCall {
        tokenId: token_id,
        amount,
    };
    Ok(TxAction::new(
        ActionKind::Withdraw,
        request(handle, &call)?,
        token_filter::<ISubscription::SubscriptionWithdrawn>(handle, token_id),
        |event: ISubscription::SubscriptionWithdrawn| event.removedAmount,
    ))
}

/// Withdraw everything still withdrawable; completes with the removed amount.
pub fn cancel(handle: &SubscriptionHandle, token_id: U256) -> Result<TxAction<U256>, AppError> {
    let call = ISubscription::cancelCall { tokenId: token_id };
    Ok(TxAction::new(
        ActionKind::Cancel,
        request(handle, &call)?,
        token_filter::<ISubscription::SubscriptionWithdrawn>(handle, token_id),
        |event: ISubscription::SubscriptionWithdrawn| event.removedAmount,
    ))
}

pub fn tip(
    handle: &SubscriptionHandle,
    token_id: U256,
    amount: U256,
    message: &str,
) -> Result<TxAction<U256>, AppError> {
    let amount = require_positive("amount", amount)?;
    let call = ISubscription::tipCall {
        tokenId: token_id,
        amount,
        message: message.to_string(),
    };
    Ok(TxAction::new(
        ActionKind::Tip,
        request(handle, &call)?,
        token_filter::<ISubscription::Tipped>(handle, token_id),
        |event: ISubscription::Tipped| event.amount,
    ))
}

/// Claim accrued funds. Gas is estimated first and submitted with
/// `gas_buffer_bps` applied, since the claim walks every unprocessed epoch.
pub fn claim(handle: &SubscriptionHandle, gas_buffer_bps: u64) -> Result<TxAction<U256>, AppError> {
    if gas_buffer_bps < BPS_DENOMINATOR {
        return Err(AppError::invalid_parameter(
            "gas_buffer_bps",
            format!("must be at least {}", BPS_DENOMINATOR),
        ));
    }
    let filter = LogFilter::event::<ISubscription::FundsClaimed>().address(handle.address());
    Ok(TxAction::new(
        ActionKind::Claim,
        request(handle, &ISubscription::claimCall {})?,
        filter,
        |event: ISubscription::FundsClaimed| event.amount,
    )
    .with_gas(GasPolicy::Buffered { bps: gas_buffer_bps }))
}

pub fn set_flags(handle: &SubscriptionHandle, flags: FeatureFlags) -> Result<TxAction<FeatureFlags>, AppError> {
    let call = ISubscription::setFlagsCall {
        flags: U256::from(flags.0),
    };
    let filter = LogFilter::event::<ISubscription::FlagsUpdated>().address(handle.address());
    Ok(TxAction::new(
        ActionKind::Flags,
        request(handle, &call)?,
        filter,
        |event: ISubscription::FlagsUpdated| FeatureFlags(event.flags.saturating_to::<u64>()),
    ))
}

/// Flip one switch of `current`, leaving the others untouched.
pub fn set_paused(
    handle: &SubscriptionHandle,
    current: FeatureFlags,
    bit: u64,
    paused: bool,
) -> Result<TxAction<FeatureFlags>, AppError> {
    set_flags(handle, current.with(bit, paused))
}

pub fn set_description(handle: &SubscriptionHandle, description: &str) -> Result<TxAction<String>, AppError> {
    let call = ISubscription::setDescriptionCall {
        description: description.to_string(),
    };
    let filter = LogFilter::event::<ISubscription::DescriptionUpdated>().address(handle.address());
    Ok(TxAction::new(
        ActionKind::Description,
        request(handle, &call)?,
        filter,
        |event: ISubscription::DescriptionUpdated| event.description,
    ))
}

fn link_value(field: &str, raw: &str) -> Result<String, AppError> {
    LinkField::parse(field, Some(raw))?
        .encoded()
        .ok_or_else(|| AppError::invalid_parameter(field, "missing value"))
}

/// Empty `image` clears the link; anything else must parse as a URL.
pub fn set_image(handle: &SubscriptionHandle, image: &str) -> Result<TxAction<String>, AppError> {
    let call = ISubscription::setImageCall {
        image: link_value("image", image)?,
    };
    let filter = LogFilter::event::<ISubscription::ImageUpdated>().address(handle.address());
    Ok(TxAction::new(
        ActionKind::Image,
        request(handle, &call)?,
        filter,
        |event: ISubscription::ImageUpdated| event.image,
    ))
}

pub fn set_external_url(handle: &SubscriptionHandle, external_url: &str) -> Result<TxAction<String>, AppError> {
    let call = ISubscription::setExternalUrlCall {
        externalUrl: link_value("external_url", external_url)?,
    };
    let filter = LogFilter::event::<ISubscription::ExternalUrlUpdated>().address(handle.address());
    Ok(TxAction::new(
        ActionKind::ExternalUrl,
        request(handle, &call)?,
        filter,
        |event: ISubscription::ExternalUrlUpdated| event.externalUrl,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::constants::{CLAIM_GAS_BUFFER_BPS, FLAG_MINTING_PAUSED, FLAG_TIPPING_PAUSED};
    use crate::network::scripted::{ScriptedLedger, ScriptedReceipt};
    use crate::services::actions::pipeline::{TxEvent, TxPipeline};
    use crate::services::readers::subscription::fixtures;
    use alloy::primitives::{Bytes, Log, LogData, address};
    use alloy::sol_types::SolEvent;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    const SUB: Address = address!("1000000000000000000000000000000000000001");
    const ACCOUNT: Address = address!("2000000000000000000000000000000000000002");

    fn log_of<E: SolEvent>(emitter: Address, event: &E) -> Log {
        Log {
            address: emitter,
            data: event.encode_log_data(),
        }
    }

    async fn handle(ledger: &Arc<ScriptedLedger>, account: Option<Address>) -> SubscriptionHandle {
        ledger.deploy(SUB);
        let session = fixtures::session(ledger.clone()).with_account(account);
        SubscriptionHandle::resolve(&session, SUB).await.unwrap()
    }

    fn drain<R>(rx: &mut mpsc::UnboundedReceiver<TxEvent<R>>) -> Vec<TxEvent<R>> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn mint_yields_token_id_minted_to_account() {
        let ledger = Arc::new(ScriptedLedger::new());
        let handle = handle(&ledger, Some(ACCOUNT)).await;
        let erc20_transfer = Log {
            address: address!("3000000000000000000000000000000000000003"),
            data: LogData::new_unchecked(
                vec![
                    ISubscription::Transfer::SIGNATURE_HASH,
                    address_topic(Address::ZERO),
                    address_topic(ACCOUNT),
                ],
                Bytes::from(U256::from(99u64).to_be_bytes::<32>().to_vec()),
            ),
        };
        let minted = ISubscription::Transfer {
            from: Address::ZERO,
            to: ACCOUNT,
            tokenId: U256::from(12u64),
        };
        ledger.push_receipt(ScriptedReceipt::Finalized {
            success: true,
            logs: vec![erc20_transfer, log_of(SUB, &minted)],
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        let action = mint(&handle, U256::from(1_000u64), "hello").unwrap();
        let outcome = TxPipeline::new(ledger.clone()).run(action, &tx).await.unwrap();

        assert_eq!(outcome.result, U256::from(12u64));
        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], TxEvent::Submitted { action: ActionKind::Mint, .. }));
        assert!(matches!(&events[1], TxEvent::Completed { hash, .. } if *hash == outcome.hash));
    }

    #[tokio::test]
    async fn zero_amount_fails_before_any_submission() {
        let ledger = Arc::new(ScriptedLedger::new());
        let handle = handle(&ledger, Some(ACCOUNT)).await;

        for result in [
            mint(&handle, U256::ZERO, "").map(|_| ()),
            renew(&handle, U256::from(1u64), U256::ZERO, "").map(|_| ()),
            withdraw(&handle, U256::from(1u64), U256::ZERO).map(|_| ()),
            tip(&handle, U256::from(1u64), U256::ZERO, "").map(|_| ()),
        ] {
            assert!(matches!(result, Err(AppError::InvalidParameter { .. })));
        }
        assert!(ledger.sent().is_empty());
    }

    #[tokio::test]
    async fn every_action_requires_an_account() {
        let ledger = Arc::new(ScriptedLedger::new());
        let handle = handle(&ledger, None).await;
        let one = U256::from(1u64);

        for result in [
            mint(&handle, one, "").map(|_| ()),
            renew(&handle, one, one, "").map(|_| ()),
            withdraw(&handle, one, one).map(|_| ()),
            cancel(&handle, one).map(|_| ()),
            tip(&handle, one, one, "").map(|_| ()),
            claim(&handle, CLAIM_GAS_BUFFER_BPS).map(|_| ()),
            set_flags(&handle, FeatureFlags(0)).map(|_| ()),
            set_paused(&handle, FeatureFlags(0), FLAG_MINTING_PAUSED, true).map(|_| ()),
            set_description(&handle, "about").map(|_| ()),
            set_image(&handle, "https://example.com/a.png").map(|_| ()),
            set_external_url(&handle, "").map(|_| ()),
        ] {
            assert!(matches!(result, Err(AppError::NoActiveAccount)));
        }
        assert!(ledger.sent().is_empty());
        assert_eq!(ledger.estimate_count(), 0);
    }

    #[tokio::test]
    async fn requests_are_sent_from_the_acting_account() {
        let ledger = Arc::new(ScriptedLedger::new());
        let handle = handle(&ledger, Some(ACCOUNT)).await;
        let action = withdraw(&handle, U256::from(1u64), U256::from(5u64)).unwrap();
        assert_eq!(action.request().from, Some(ACCOUNT));
        assert_eq!(action.request().to, Some(SUB.into()));
    }

    #[tokio::test]
    async fn missing_withdraw_log_fails_after_submitted() {
        let ledger = Arc::new(ScriptedLedger::new());
        let handle = handle(&ledger, Some(ACCOUNT)).await;
        let other_token = ISubscription::SubscriptionWithdrawn {
            tokenId: U256::from(8u64),
            removedAmount: U256::from(5u64),
            refunded: U256::from(5u64),
        };
        ledger.push_receipt(ScriptedReceipt::Finalized {
            success: true,
            logs: vec![log_of(SUB, &other_token)],
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        let action = withdraw(&handle, U256::from(7u64), U256::from(5u64)).unwrap();
        let err = TxPipeline::new(ledger.clone()).run(action, &tx).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            AppError::ExpectedLogNotFound { event, .. } if event == "SubscriptionWithdrawn"
        ));
        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], TxEvent::Submitted { .. }));
        assert!(matches!(events[1], TxEvent::Failed { .. }));
        assert!(!events.iter().any(|e| matches!(e, TxEvent::Completed { .. })));
    }

    #[tokio::test]
    async fn claim_submits_buffered_gas_ceiling() {
        let ledger = Arc::new(ScriptedLedger::new());
        let handle = handle(&ledger, Some(ACCOUNT)).await;
        ledger.set_gas_estimate(Ok(100_000));
        let claimed = ISubscription::FundsClaimed {
            amount: U256::from(42u64),
            totalClaimed: U256::from(100u64),
        };
        ledger.push_receipt(ScriptedReceipt::Finalized {
            success: true,
            logs: vec![log_of(SUB, &claimed)],
        });

        let (tx, _rx) = mpsc::unbounded_channel();
        let action = claim(&handle, CLAIM_GAS_BUFFER_BPS).unwrap();
        let outcome = TxPipeline::new(ledger.clone()).run(action, &tx).await.unwrap();

        assert_eq!(outcome.result, U256::from(42u64));
        assert_eq!(ledger.estimate_count(), 1);
        assert_eq!(ledger.sent()[0].gas, Some(110_000));
        assert!(matches!(claim(&handle, 9_000), Err(AppError::InvalidParameter { .. })));
    }

    #[tokio::test]
    async fn failed_estimate_rejects_submission_without_events() {
        let ledger = Arc::new(ScriptedLedger::new());
        let handle = handle(&ledger, Some(ACCOUNT)).await;
        ledger.set_gas_estimate(Err("execution reverted".into()));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let err = TxPipeline::new(ledger.clone())
            .run(claim(&handle, CLAIM_GAS_BUFFER_BPS).unwrap(), &tx)
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), AppError::SubmissionRejected { .. }));
        assert!(ledger.sent().is_empty());
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], TxEvent::Failed { .. }));
    }

    #[tokio::test]
    async fn reverted_receipt_is_a_confirmation_failure() {
        let ledger = Arc::new(ScriptedLedger::new());
        let handle = handle(&ledger, Some(ACCOUNT)).await;
        ledger.push_receipt(ScriptedReceipt::Finalized {
            success: false,
            logs: vec![],
        });

        let (tx, _rx) = mpsc::unbounded_channel();
        let err = TxPipeline::new(ledger.clone())
            .run(cancel(&handle, U256::from(3u64)).unwrap(), &tx)
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), AppError::ConfirmationFailed { .. }));
    }

    #[tokio::test]
    async fn pause_toggles_a_single_flag() {
        let ledger = Arc::new(ScriptedLedger::new());
        let handle = handle(&ledger, Some(ACCOUNT)).await;
        let updated = ISubscription::FlagsUpdated {
            flags: U256::from(FLAG_MINTING_PAUSED | FLAG_TIPPING_PAUSED),
        };
        ledger.push_receipt(ScriptedReceipt::Finalized {
            success: true,
            logs: vec![log_of(SUB, &updated)],
        });

        let (tx, _rx) = mpsc::unbounded_channel();
        let action = set_paused(&handle, FeatureFlags(FLAG_MINTING_PAUSED), FLAG_TIPPING_PAUSED, true).unwrap();
        let outcome = TxPipeline::new(ledger.clone()).run(action, &tx).await.unwrap();

        assert!(outcome.result.minting_paused());
        assert!(outcome.result.tipping_paused());
        assert!(!outcome.result.renewal_paused());
    }

    #[tokio::test]
    async fn link_updates_validate_urls() {
        let ledger = Arc::new(ScriptedLedger::new());
        let handle = handle(&ledger, Some(ACCOUNT)).await;

        assert!(matches!(
            set_image(&handle, "not a url"),
            Err(AppError::Validation { .. })
        ));
        assert!(set_external_url(&handle, "").is_ok());
        assert!(set_image(&handle, "https://example.com/a.png").is_ok());
    }
}
