// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::error::AppError;
use crate::domain::constants::BPS_DENOMINATOR;
use crate::network::ledger::{LedgerClient, LogFilter};
use alloy::primitives::{B256, Log};
use alloy::rpc::types::eth::TransactionRequest;
use alloy::sol_types::SolEvent;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Approval,
    Mint,
    Deposit,
    Withdraw,
    Cancel,
    Tip,
    Claim,
    Flags,
    Description,
    Image,
    ExternalUrl,
    CreateAccount,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::Approval => "approval",
            ActionKind::Mint => "mint",
            ActionKind::Deposit => "deposit",
            ActionKind::Withdraw => "withdraw",
            ActionKind::Cancel => "cancel",
            ActionKind::Tip => "tip",
            ActionKind::Claim => "claim",
            ActionKind::Flags => "flags",
            ActionKind::Description => "description",
            ActionKind::Image => "image",
            ActionKind::ExternalUrl => "externalUrl",
            ActionKind::CreateAccount => "createAccount",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStage {
    Idle,
    Submitting,
    Submitted,
    Confirming,
    Extracting,
    Completed,
    Failed,
}

impl TxStage {
    pub fn can_advance_to(self, next: TxStage) -> bool {
        use TxStage::*;
        matches!(
            (self, next),
            (Idle, Submitting)
                | (Submitting, Submitted)
                | (Submitted, Confirming)
                | (Confirming, Extracting)
                | (Extracting, Completed)
        ) || (next == Failed && !matches!(self, Idle | Completed | Failed))
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TxStage::Completed | TxStage::Failed)
    }
}

/// Progress notifications: one `Submitted`, then exactly one terminal event.
/// A submission failure emits only `Failed`.
#[derive(Debug)]
pub enum TxEvent<R> {
    Submitted {
        action: ActionKind,
        hash: B256,
    },
    Completed {
        action: ActionKind,
        result: R,
        hash: B256,
    },
    Failed {
        action: ActionKind,
        error: Arc<AppError>,
    },
}

impl<R> TxEvent<R> {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TxEvent::Submitted { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutcome<R> {
    pub result: R,
    pub hash: B256,
    pub block_number: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasPolicy {
    Default,
    /// Estimate first, then submit with `estimate * bps / 10_000` as the ceiling.
    Buffered { bps: u64 },
}

pub fn buffered_gas(estimate: u64, bps: u64) -> u64 {
    let scaled = (estimate as u128) * (bps as u128) / (BPS_DENOMINATOR as u128);
    u64::try_from(scaled).unwrap_or(u64::MAX)
}

type Extractor<R> = Box<dyn Fn(&Log) -> Result<R, alloy::sol_types::Error> + Send + Sync>;

/// A validated mutating call plus the log that proves its effect.
pub struct TxAction<R> {
    kind: ActionKind,
    request: TransactionRequest,
    filter: LogFilter,
    extract: Extractor<R>,
    gas: GasPolicy,
}

impl<R> TxAction<R> {
    /// `map` turns the decoded event `E` into the action's domain result.
    pub fn new<E, F>(kind: ActionKind, request: TransactionRequest, filter: LogFilter, map: F) -> Self
    where
        E: SolEvent + 'static,
        R: 'static,
        F: Fn(E) -> R + Send + Sync + 'static,
    {
        Self {
            kind,
            request,
            filter,
            extract: Box::new(move |log: &Log| E::decode_log_data(&log.data).map(&map)),
            gas: GasPolicy::Default,
        }
    }

    /// Same expected log and result, submitted as `request` instead.
    pub(crate) fn with_request(mut self, request: TransactionRequest) -> Self {
        self.request = request;
        self
    }

    pub fn with_gas(mut self, gas: GasPolicy) -> Self {
        self.gas = gas;
        self
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn request(&self) -> &TransactionRequest {
        &self.request
    }

    pub fn filter(&self) -> &LogFilter {
        &self.filter
    }
}

/// Drives a `TxAction` from `Idle` to a terminal stage, publishing progress on
/// the caller's channel. Nothing is retried; the caller re-invokes on failure.
pub struct TxPipeline {
    ledger: Arc<dyn LedgerClient>,
}

struct Tracker {
    kind: ActionKind,
    stage: TxStage,
}

impl Tracker {
    fn advance(&mut self, next: TxStage) {
        debug_assert!(
            self.stage.can_advance_to(next),
            "illegal transition {:?} -> {:?}",
            self.stage,
            next
        );
        tracing::trace!(target: "tx", action = %self.kind, from = ?self.stage, to = ?next, "Stage transition");
        self.stage = next;
    }
}

impl TxPipeline {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self { ledger }
    }

    pub async fn run<R>(
        &self,
        action: TxAction<R>,
        events: &mpsc::UnboundedSender<TxEvent<R>>,
    ) -> Result<TxOutcome<R>, Arc<AppError>>
    where
        R: Clone + Send,
    {
        let kind = action.kind;
        let mut tracker = Tracker {
            kind,
            stage: TxStage::Idle,
        };

        match self.execute(action, &mut tracker, events).await {
            Ok(outcome) => {
                tracker.advance(TxStage::Completed);
                tracing::info!(
                    target: "tx",
                    action = %kind,
                    hash = %format!("{:#x}", outcome.hash),
                    "Action completed"
                );
                let _ = events.send(TxEvent::Completed {
                    action: kind,
                    result: outcome.result.clone(),
                    hash: outcome.hash,
                });
                Ok(outcome)
            }
            Err(error) => {
                tracker.advance(TxStage::Failed);
                let error = Arc::new(error);
                tracing::warn!(target: "tx", action = %kind, error = %error, "Action failed");
                let _ = events.send(TxEvent::Failed {
                    action: kind,
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    async fn execute<R>(
        &self,
        action: TxAction<R>,
        tracker: &mut Tracker,
        events: &mpsc::UnboundedSender<TxEvent<R>>,
    ) -> Result<TxOutcome<R>, AppError> {
        let kind = action.kind;
        let mut request = action.request;
        tracker.advance(TxStage::Submitting);

        if let GasPolicy::Buffered { bps } = action.gas {
            let estimate = self
                .ledger
                .estimate_gas(request.clone())
                .await
                .map_err(|e| AppError::SubmissionRejected {
                    action: kind.to_string(),
                    reason: format!("gas estimation failed: {}", e),
                })?;
            let ceiling = buffered_gas(estimate, bps);
            tracing::debug!(target: "tx", action = %kind, estimate, ceiling, "Buffered gas ceiling");
            request.gas = Some(ceiling);
        }

        let hash = self
            .ledger
            .send(request)
            .await
            .map_err(|e| AppError::SubmissionRejected {
                action: kind.to_string(),
                reason: e.to_string(),
            })?;
        tracker.advance(TxStage::Submitted);
        tracing::info!(target: "tx", action = %kind, hash = %format!("{:#x}", hash), "Transaction submitted");
        let _ = events.send(TxEvent::Submitted { action: kind, hash });

        tracker.advance(TxStage::Confirming);
        let receipt = self
            .ledger
            .wait(hash)
            .await
            .map_err(|e| AppError::ConfirmationFailed {
                action: kind.to_string(),
                hash: format!("{:#x}", hash),
                reason: e.to_string(),
            })?;
        if !receipt.success {
            return Err(AppError::ConfirmationFailed {
                action: kind.to_string(),
                hash: format!("{:#x}", hash),
                reason: "transaction reverted".into(),
            });
        }
        let final_hash = receipt.transaction_hash;

        tracker.advance(TxStage::Extracting);
        let not_found = || AppError::ExpectedLogNotFound {
            action: kind.to_string(),
            event: action.filter.event_name().to_string(),
            hash: format!("{:#x}", final_hash),
        };
        let log = action
            .filter
            .first_match(&receipt.logs)
            .ok_or_else(not_found)?;
        let result = (action.extract)(log).map_err(|e| {
            tracing::error!(target: "tx", action = %kind, error = %e, "Matched log failed to decode");
            not_found()
        })?;

        Ok(TxOutcome {
            result,
            hash: final_hash,
            block_number: receipt.block_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_transitions_follow_pipeline_order() {
        use TxStage::*;
        let order = [Idle, Submitting, Submitted, Confirming, Extracting, Completed];
        for pair in order.windows(2) {
            assert!(pair[0].can_advance_to(pair[1]), "{:?} -> {:?}", pair[0], pair[1]);
        }
        assert!(!Idle.can_advance_to(Submitted));
        assert!(!Idle.can_advance_to(Failed));
        for stage in [Submitting, Submitted, Confirming, Extracting] {
            assert!(stage.can_advance_to(Failed));
        }
        assert!(!Completed.can_advance_to(Failed));
        assert!(Failed.is_terminal() && Completed.is_terminal());
    }

    #[test]
    fn buffered_gas_scales_by_basis_points() {
        assert_eq!(buffered_gas(100_000, 11_000), 110_000);
        assert_eq!(buffered_gas(21_000, 10_000), 21_000);
        assert_eq!(buffered_gas(u64::MAX, 20_000), u64::MAX);
    }
}
