// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use alloy::primitives::{Address, U256};
use std::str::FromStr;

pub fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// `0x` followed by exactly 40 hex digits, any casing.
pub fn is_address_shaped(s: &str) -> bool {
    let body = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(body) => body,
        None => return false,
    };
    body.len() == 40 && body.chars().all(|c| c.is_ascii_hexdigit())
}

pub fn parse_address_hex(s: &str) -> Option<Address> {
    let trimmed = s.trim();
    if !is_address_shaped(trimmed) {
        return None;
    }
    Address::from_str(strip_0x(trimmed)).ok()
}

/// Unsigned base-10 integer without sign, separators or exponent.
pub fn parse_u256_dec(s: &str) -> Option<U256> {
    let trimmed = s.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    U256::from_str_radix(trimmed, 10).ok()
}

pub fn checksum(address: &Address) -> String {
    address.to_checksum(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_parsing_ignores_casing() {
        let lower = "0x7a250d5630b4cf539739df2c5dacb4c659f2488d";
        let mixed = "0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D";
        assert_eq!(parse_address_hex(lower), parse_address_hex(mixed));
        assert!(parse_address_hex("not-an-address").is_none());
        assert_eq!(checksum(&parse_address_hex(lower).unwrap()), mixed);
    }

    #[test]
    fn address_shape_requires_prefix_and_length() {
        assert!(is_address_shaped("0X7a250d5630b4cf539739df2c5dacb4c659f2488d"));
        assert!(!is_address_shaped("7a250d5630b4cf539739df2c5dacb4c659f2488d"));
        assert!(!is_address_shaped("0x7a250d"));
        assert!(!is_address_shaped("0xzz250d5630b4cf539739df2c5dacb4c659f2488d"));
    }

    #[test]
    fn decimal_parser_rejects_signs_and_exponents() {
        assert_eq!(parse_u256_dec(" 42 "), Some(U256::from(42u64)));
        assert_eq!(parse_u256_dec("-1"), None);
        assert_eq!(parse_u256_dec("1e18"), None);
        assert_eq!(parse_u256_dec(""), None);
    }
}
