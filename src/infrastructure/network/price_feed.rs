// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::error::AppError;
use crate::data::abi::AggregatorV3Interface;
use crate::domain::snapshot::Price;
use crate::network::ledger::{LedgerClient, read};
use alloy::primitives::{Address, U256};
use std::collections::HashMap;

/// Look up `asset` in the local feed registry and read its latest answer.
///
/// Returns `Ok(None)` when no feed is registered or the aggregator reports a
/// negative answer.
pub async fn find_price(
    ledger: &dyn LedgerClient,
    asset: Address,
    price_feeds: &HashMap<Address, Address>,
) -> Result<Option<Price>, AppError> {
    let Some(feed) = price_feeds.get(&asset).copied() else {
        tracing::debug!(
            target: "price_feed",
            asset = %format!("{:#x}", asset),
            registry = price_feeds.len(),
            "Matching price feed not found in local registry"
        );
        return Ok(None);
    };

    let decimals = read(ledger, feed, &AggregatorV3Interface::decimalsCall {}).await?;
    let latest = read(ledger, feed, &AggregatorV3Interface::latestRoundDataCall {}).await?;

    // Chainlink answers are int256; negative indicates invalid.
    if latest.answer.is_negative() {
        tracing::warn!(
            target: "price_feed",
            feed = %format!("{:#x}", feed),
            answer = %latest.answer,
            "Aggregator returned negative answer"
        );
        return Ok(None);
    }

    tracing::debug!(
        target: "price_feed",
        asset = %format!("{:#x}", asset),
        answer = %latest.answer,
        decimals,
        "Found price for asset"
    );

    Ok(Some(Price {
        price: latest.answer,
        decimals,
    }))
}

impl Price {
    /// Lossy conversion for the display boundary only.
    pub fn to_f64(&self) -> f64 {
        let (sign, magnitude) = self.price.into_sign_and_abs();
        let raw = u256_to_f64(magnitude);
        let raw = if sign.is_negative() { -raw } else { raw };
        raw / 10f64.powi(self.decimals as i32)
    }
}

/// Nearest `f64`, most significant limb first. Never fails; precision drops
/// past 2^53.
pub fn u256_to_f64(value: U256) -> f64 {
    value
        .as_limbs()
        .iter()
        .rev()
        .fold(0.0, |acc, &limb| acc * 18_446_744_073_709_551_616.0 + limb as f64)
}

/// Human-readable `amount` expressed in the price's quote currency.
pub fn converted(amount: f64, price: &Price) -> f64 {
    amount * price.to_f64()
}

pub fn converted_pretty(amount: f64, price: &Price) -> String {
    pretty_number(converted(amount, price))
}

/// Converts a raw token amount with `decimals` to the quote currency.
pub fn converted_units_pretty(amount: U256, decimals: u8, price: &Price) -> String {
    converted_pretty(units_to_float(amount, decimals), price)
}

pub fn units_to_float(value: U256, decimals: u8) -> f64 {
    u256_to_f64(value) / 10f64.powi(decimals as i32)
}

pub fn pretty_number(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000_000.0 {
        format!("{:.2}B", value / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{:.2}M", value / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.2}K", value / 1_000.0)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::scripted::ScriptedLedger;
    use alloy::primitives::aliases::U80;
    use alloy::primitives::{I256, address};

    fn usd(mantissa: i64, decimals: u8) -> Price {
        Price {
            price: I256::try_from(mantissa).unwrap(),
            decimals,
        }
    }

    #[test]
    fn converts_at_display_boundary() {
        let price = usd(250_000_000, 8);
        assert!((price.to_f64() - 2.5).abs() < f64::EPSILON);
        assert_eq!(converted_pretty(4.0, &price), "10.00");
        assert_eq!(
            converted_units_pretty(U256::from(2_000_000_000_000_000_000u128), 18, &price),
            "5.00"
        );
        assert_eq!(pretty_number(1_234_567.0), "1.23M");
    }

    #[test]
    fn wide_values_convert_without_collapsing_to_zero() {
        assert_eq!(u256_to_f64(U256::ZERO), 0.0);
        assert_eq!(u256_to_f64(U256::from(12_345u64)), 12_345.0);
        assert_eq!(u256_to_f64(U256::from(1u128 << 64)), 18_446_744_073_709_551_616.0);
        let max = u256_to_f64(U256::MAX);
        assert!((max / 2f64.powi(256) - 1.0).abs() < 1e-12);

        let whale = U256::from(10u64).pow(U256::from(30u64));
        assert!((units_to_float(whale, 18) - 1e12).abs() < 1.0);
        assert!((usd(-150_000_000, 8).to_f64() + 1.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn unregistered_asset_has_no_price() {
        let ledger = ScriptedLedger::new();
        let price = find_price(&ledger, Address::ZERO, &HashMap::new())
            .await
            .unwrap();
        assert!(price.is_none());
        assert_eq!(ledger.call_count(), 0);
    }

    #[tokio::test]
    async fn reads_answer_and_decimals_from_registered_feed() {
        let asset = address!("3000000000000000000000000000000000000003");
        let feed = address!("4000000000000000000000000000000000000004");
        let ledger = ScriptedLedger::new();
        ledger
            .on_call(feed, &AggregatorV3Interface::decimalsCall {}, &8u8)
            .on_call(
                feed,
                &AggregatorV3Interface::latestRoundDataCall {},
                &AggregatorV3Interface::latestRoundDataReturn {
                    roundId: U80::from(1u64),
                    answer: I256::try_from(199_000_000i64).unwrap(),
                    startedAt: U256::ZERO,
                    updatedAt: U256::ZERO,
                    answeredInRound: U80::from(1u64),
                },
            );
        let feeds = HashMap::from([(asset, feed)]);

        let price = find_price(&ledger, asset, &feeds).await.unwrap().unwrap();
        assert_eq!(price, usd(199_000_000, 8));
    }
}
