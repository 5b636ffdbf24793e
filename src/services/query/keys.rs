// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use alloy::primitives::{Address, U256};
use std::fmt;

/// Cache identity of a query: operation name plus its argument tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    operation: &'static str,
    args: Vec<String>,
}

impl QueryKey {
    pub fn new(operation: &'static str, args: Vec<String>) -> Self {
        Self { operation, args }
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.operation, self.args.join(","))
    }
}

fn addr(address: Address) -> String {
    format!("{:#x}", address)
}

pub mod subscription_keys {
    use super::*;

    pub const CONTRACT: &str = "subscription.contract";
    pub const CONTRACT_URI: &str = "subscription.contractUri";
    pub const WARNINGS: &str = "subscription.warnings";
    pub const TOKEN: &str = "subscription.token";

    pub fn contract(address: Address) -> QueryKey {
        QueryKey::new(CONTRACT, vec![addr(address)])
    }

    pub fn contract_uri(address: Address) -> QueryKey {
        QueryKey::new(CONTRACT_URI, vec![addr(address)])
    }

    pub fn warnings(address: Address) -> QueryKey {
        QueryKey::new(WARNINGS, vec![addr(address)])
    }

    pub fn token(address: Address, token_id: U256) -> QueryKey {
        QueryKey::new(TOKEN, vec![addr(address), token_id.to_string()])
    }
}

pub mod erc20_keys {
    use super::*;

    pub const CONTRACT: &str = "erc20.contract";
    pub const METADATA: &str = "erc20.metadata";
    pub const BALANCE: &str = "erc20.balance";
    pub const ALLOWANCE: &str = "erc20.allowance";
    pub const PRICE: &str = "erc20.price";

    pub fn contract(token: Address) -> QueryKey {
        QueryKey::new(CONTRACT, vec![addr(token)])
    }

    pub fn metadata(token: Address) -> QueryKey {
        QueryKey::new(METADATA, vec![addr(token)])
    }

    pub fn balance(token: Address, owner: Address) -> QueryKey {
        QueryKey::new(BALANCE, vec![addr(token), addr(owner)])
    }

    pub fn allowance(token: Address, owner: Address, spender: Address) -> QueryKey {
        QueryKey::new(ALLOWANCE, vec![addr(token), addr(owner), addr(spender)])
    }

    pub fn price(token: Address) -> QueryKey {
        QueryKey::new(PRICE, vec![addr(token)])
    }
}
