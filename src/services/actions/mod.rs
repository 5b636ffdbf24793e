// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

pub mod erc20;
pub mod erc6551;
pub mod pipeline;
pub mod subscription;

pub use pipeline::{
    ActionKind, GasPolicy, TxAction, TxEvent, TxOutcome, TxPipeline, TxStage, buffered_gas,
};

use crate::common::error::AppError;
use alloy::primitives::U256;

/// Funds-moving actions never reach the ledger with a zero amount.
pub(crate) fn require_positive(field: &str, amount: U256) -> Result<U256, AppError> {
    if amount.is_zero() {
        return Err(AppError::invalid_parameter(field, "must be greater than zero"));
    }
    Ok(amount)
}
