// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::error::AppError;
use crate::domain::snapshot::TokenSnapshot;
use crate::services::readers::subscription::{
    SubscriptionHandle, get_token_data, owned_count, owned_token_by_index, token_by_index,
    total_supply,
};
use alloy::primitives::{Address, U256};
use futures::future::try_join_all;
use std::future::Future;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    Ascending,
    NewestFirst,
}

/// Half-open index range of `page`, clamped to `total`. Pages past the end are empty.
pub fn page_range(total: u64, page: u64, page_size: u64) -> Range<u64> {
    let start = page.saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);
    start..end
}

pub fn page_indices(total: u64, page: u64, page_size: u64, order: ListOrder) -> Vec<u64> {
    let range = page_range(total, page, page_size);
    match order {
        ListOrder::Ascending => range.collect(),
        ListOrder::NewestFirst => range.map(|i| total - 1 - i).collect(),
    }
}

/// Resolve every index concurrently; output keeps the order of `indices`.
pub async fn list_page<T, F, Fut>(indices: Vec<u64>, resolve: F) -> Result<Vec<T>, AppError>
where
    F: Fn(u64) -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    try_join_all(indices.into_iter().map(resolve)).await
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedToken {
    pub index: u64,
    pub token_id: U256,
    pub snapshot: TokenSnapshot,
}

fn check_page_size(page_size: u64) -> Result<(), AppError> {
    if page_size == 0 {
        return Err(AppError::invalid_parameter("page_size", "must be greater than zero"));
    }
    Ok(())
}

/// One page of all tokens of the contract, newest first.
pub async fn list_tokens(
    handle: &SubscriptionHandle,
    page: u64,
    page_size: u64,
) -> Result<Vec<ListedToken>, AppError> {
    check_page_size(page_size)?;
    let total = total_supply(handle).await?.saturating_to::<u64>();
    let indices = page_indices(total, page, page_size, ListOrder::NewestFirst);
    tracing::debug!(target: "listing", total, page, count = indices.len(), "Listing tokens");

    list_page(indices, |index| async move {
        let token_id = token_by_index(handle, index).await?;
        let snapshot = get_token_data(handle, token_id).await?;
        Ok(ListedToken {
            index,
            token_id,
            snapshot,
        })
    })
    .await
}

/// One page of the tokens held by `owner`, in the contract's owner index order.
pub async fn list_owned_tokens(
    handle: &SubscriptionHandle,
    owner: Address,
    page: u64,
    page_size: u64,
) -> Result<Vec<ListedToken>, AppError> {
    check_page_size(page_size)?;
    let total = owned_count(handle, owner).await?.saturating_to::<u64>();
    let indices = page_indices(total, page, page_size, ListOrder::Ascending);
    tracing::debug!(
        target: "listing",
        owner = %format!("{:#x}", owner),
        total,
        page,
        count = indices.len(),
        "Listing owned tokens"
    );

    list_page(indices, |index| async move {
        let token_id = owned_token_by_index(handle, owner, index).await?;
        let snapshot = get_token_data(handle, token_id).await?;
        Ok(ListedToken {
            index,
            token_id,
            snapshot,
        })
    })
    .await
}
