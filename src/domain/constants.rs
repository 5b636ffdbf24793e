// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

// =============================================================================
// FEATURE FLAGS
// =============================================================================

pub const FLAG_MINTING_PAUSED: u64 = 0b001;
pub const FLAG_RENEWAL_PAUSED: u64 = 0b010;
pub const FLAG_TIPPING_PAUSED: u64 = 0b100;

// =============================================================================
// GAS & TRANSACTION CONSTANTS
// =============================================================================

/// Claim iterates an unbounded number of epochs, so its estimate is padded (110%).
pub const CLAIM_GAS_BUFFER_BPS: u64 = 11_000;
pub const BPS_DENOMINATOR: u64 = 10_000;

pub const DEFAULT_RECEIPT_POLL_MS: u64 = 1_000;
pub const DEFAULT_RECEIPT_TIMEOUT_MS: u64 = 120_000;

// =============================================================================
// METADATA
// =============================================================================

pub const CONTRACT_NAME_MIN_LEN: usize = 3;
pub const DEFAULT_METADATA_TIMEOUT_MS: u64 = 5_000;

pub const DATA_URI_JSON_BASE64: &str = "data:application/json;base64,";
pub const DATA_URI_JSON_UTF8: &str = "data:application/json;utf8,";
pub const DATA_URI_JSON: &str = "data:application/json,";

// =============================================================================
// ANALYTICS THRESHOLDS
// =============================================================================

/// Lock is expressed as a percentage of each deposit held back from withdrawal.
pub const HIGH_LOCK_PERCENT: u64 = 50;
pub const SHORT_EPOCH_SECS: u64 = 3_600;

pub const DEFAULT_PAGE_SIZE: u64 = 10;

// =============================================================================
// TOKEN-BOUND ACCOUNTS (ERC6551)
// =============================================================================

/// `isValidSigner` answers with its own selector when the signer is accepted.
pub const ERC6551_VALID_SIGNER_MAGIC: [u8; 4] = [0x52, 0x3e, 0x32, 0x60];
/// `execute` operation code for a plain call.
pub const ERC6551_OPERATION_CALL: u8 = 0;
