// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::domain::constants::{FLAG_MINTING_PAUSED, FLAG_RENEWAL_PAUSED, FLAG_TIPPING_PAUSED};
use alloy::primitives::{Address, I256, U256};
use url::Url;

/// `(flags & bit) == bit`; a multi-bit mask only matches when every bit is set.
pub fn is_flag_set(flags: u64, bit: u64) -> bool {
    flags & bit == bit
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FeatureFlags(pub u64);

impl FeatureFlags {
    pub fn is_set(&self, bit: u64) -> bool {
        is_flag_set(self.0, bit)
    }

    pub fn minting_paused(&self) -> bool {
        self.is_set(FLAG_MINTING_PAUSED)
    }

    pub fn renewal_paused(&self) -> bool {
        self.is_set(FLAG_RENEWAL_PAUSED)
    }

    pub fn tipping_paused(&self) -> bool {
        self.is_set(FLAG_TIPPING_PAUSED)
    }

    pub fn with(self, bit: u64, enabled: bool) -> Self {
        if enabled {
            FeatureFlags(self.0 | bit)
        } else {
            FeatureFlags(self.0 & !bit)
        }
    }
}

/// Display fields shared by contract and token documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayMetadata {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<Url>,
    pub external_url: Option<Url>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSnapshot {
    pub metadata: DisplayMetadata,
    /// Funding token every deposit is denominated in.
    pub token: Address,
    /// Token units per second of subscription time.
    pub rate: U256,
    pub lock: u64,
    pub epoch_size: u64,
    /// Zero means unlimited.
    pub max_supply: U256,
    pub total_supply: U256,
    pub owner_contract: Address,
    pub owner_id: U256,
    pub owner_address: Address,
    pub claimable: U256,
    pub total_claimed: U256,
    pub flags: FeatureFlags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSnapshot {
    pub metadata: DisplayMetadata,
    pub deposited: U256,
    pub spent: U256,
    pub unspent: U256,
    pub withdrawable: U256,
    pub tips: U256,
    pub active: bool,
    /// Unix timestamp the subscription runs out at.
    pub expire: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Erc20Data {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Integer mantissa plus decimal exponent as reported by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Price {
    pub price: I256,
    pub decimals: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_test_requires_every_bit() {
        assert!(is_flag_set(0b101, 0b100));
        assert!(!is_flag_set(0b101, 0b010));
        assert!(is_flag_set(0b101, 0b101));
        assert!(!is_flag_set(0b101, 0b111));
        assert!(is_flag_set(0, 0));
    }

    #[test]
    fn named_switches_follow_bits() {
        let flags = FeatureFlags(FLAG_MINTING_PAUSED | FLAG_TIPPING_PAUSED);
        assert!(flags.minting_paused());
        assert!(!flags.renewal_paused());
        assert!(flags.tipping_paused());

        let flags = flags.with(FLAG_MINTING_PAUSED, false).with(FLAG_RENEWAL_PAUSED, true);
        assert_eq!(flags.0, FLAG_RENEWAL_PAUSED | FLAG_TIPPING_PAUSED);
    }
}
