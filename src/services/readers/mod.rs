// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

//! Stateless async readers producing immutable snapshots. Readers never cache
//! and never retry; both are the query graph's job.

pub mod analytics;
pub mod erc20;
pub mod erc6551;
pub mod subscription;

use crate::common::error::AppError;
use crate::common::session::Session;
use alloy::primitives::Address;

/// Fails unless bytecode is deployed at `address`.
pub(crate) async fn ensure_deployed(
    session: &Session,
    address: Address,
    kind: &str,
) -> Result<(), AppError> {
    let code = session.ledger().code_at(address).await?;
    if code.is_empty() {
        tracing::warn!(
            target: "reader",
            address = %format!("{:#x}", address),
            kind,
            "No contract deployed at address"
        );
        return Err(AppError::Validation {
            field: kind.to_string(),
            message: format!("no contract deployed at {:#x}", address),
        });
    }
    Ok(())
}
