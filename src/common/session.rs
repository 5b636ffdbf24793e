// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::data::metadata::DocumentResolver;
use crate::network::ledger::LedgerClient;
use alloy::primitives::Address;
use std::collections::HashMap;
use std::sync::Arc;

/// Identity and collaborators threaded explicitly into readers, actions and
/// query nodes. A missing account is a normal state, not a fault.
#[derive(Clone)]
pub struct Session {
    ledger: Arc<dyn LedgerClient>,
    account: Option<Address>,
    documents: DocumentResolver,
    price_feeds: Arc<HashMap<Address, Address>>,
}

impl Session {
    pub fn new(ledger: Arc<dyn LedgerClient>, documents: DocumentResolver) -> Self {
        Self {
            ledger,
            account: None,
            documents,
            price_feeds: Arc::new(HashMap::new()),
        }
    }

    pub fn with_account(mut self, account: Option<Address>) -> Self {
        self.account = account;
        self
    }

    pub fn with_price_feeds(mut self, price_feeds: HashMap<Address, Address>) -> Self {
        self.price_feeds = Arc::new(price_feeds);
        self
    }

    pub fn ledger(&self) -> &Arc<dyn LedgerClient> {
        &self.ledger
    }

    pub fn documents(&self) -> &DocumentResolver {
        &self.documents
    }

    pub fn price_feeds(&self) -> &HashMap<Address, Address> {
        &self.price_feeds
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn require_account(&self) -> Result<Address, AppError> {
        self.account.ok_or(AppError::NoActiveAccount)
    }
}
