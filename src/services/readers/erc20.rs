// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::common::session::Session;
use crate::data::abi::IERC20;
use crate::domain::snapshot::Erc20Data;
use crate::network::ledger::read;
use crate::services::readers::ensure_deployed;
use alloy::primitives::{Address, U256};
use std::fmt;

#[derive(Clone)]
pub struct Erc20Handle {
    address: Address,
    session: Session,
}

impl fmt::Debug for Erc20Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Erc20Handle")
            .field("address", &self.address)
            .finish()
    }
}

impl Erc20Handle {
    pub async fn resolve(session: &Session, address: Address) -> Result<Self, AppError> {
        ensure_deployed(session, address, "erc20").await?;
        tracing::debug!(
            target: "reader",
            address = %format!("{:#x}", address),
            "Created ERC20 contract handle"
        );
        Ok(Self {
            address,
            session: session.clone(),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

pub async fn get_erc20_data(handle: &Erc20Handle) -> Result<Erc20Data, AppError> {
    let ledger = handle.session.ledger().as_ref();
    let name = read(ledger, handle.address, &IERC20::nameCall {}).await?;
    let symbol = read(ledger, handle.address, &IERC20::symbolCall {}).await?;
    let decimals = read(ledger, handle.address, &IERC20::decimalsCall {}).await?;

    Ok(Erc20Data {
        address: handle.address,
        name,
        symbol,
        decimals,
    })
}

pub async fn get_balance(handle: &Erc20Handle, owner: Address) -> Result<U256, AppError> {
    read(
        handle.session.ledger().as_ref(),
        handle.address,
        &IERC20::balanceOfCall { owner },
    )
    .await
}

pub async fn get_allowance(
    handle: &Erc20Handle,
    owner: Address,
    spender: Address,
) -> Result<U256, AppError> {
    read(
        handle.session.ledger().as_ref(),
        handle.address,
        &IERC20::allowanceCall { owner, spender },
    )
    .await
}
