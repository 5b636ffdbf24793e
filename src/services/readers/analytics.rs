// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::domain::constants::{HIGH_LOCK_PERCENT, SHORT_EPOCH_SECS};
use crate::domain::snapshot::ContractSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarningMessage {
    pub severity: Severity,
    pub message: String,
}

impl WarningMessage {
    fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

/// Things a subscriber should know before committing funds, most severe first.
pub fn analyze_contract(snapshot: &ContractSnapshot) -> Vec<WarningMessage> {
    let mut warnings = Vec::new();

    if snapshot.flags.minting_paused() {
        warnings.push(WarningMessage::info("Minting of new subscriptions is paused"));
    }
    if snapshot.flags.renewal_paused() {
        warnings.push(WarningMessage::warning(
            "Renewals are paused; existing subscriptions cannot be extended",
        ));
    }
    if snapshot.flags.tipping_paused() {
        warnings.push(WarningMessage::info("Tipping is paused"));
    }
    if snapshot.lock > HIGH_LOCK_PERCENT {
        warnings.push(WarningMessage::warning(format!(
            "{}% of every deposit is locked and cannot be withdrawn",
            snapshot.lock
        )));
    }
    if snapshot.epoch_size < SHORT_EPOCH_SECS {
        warnings.push(WarningMessage::warning(format!(
            "Epochs last only {} seconds; the owner can claim funds almost immediately",
            snapshot.epoch_size
        )));
    }
    if snapshot.rate.is_zero() {
        warnings.push(WarningMessage::warning("Rate is zero; deposits buy no time"));
    }
    if !snapshot.max_supply.is_zero() && snapshot.total_supply >= snapshot.max_supply {
        warnings.push(WarningMessage::info("All subscriptions have been minted"));
    }

    warnings.sort_by(|a, b| b.severity.cmp(&a.severity));
    warnings
}
