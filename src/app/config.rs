// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::parsing::parse_address_hex;
use crate::domain::constants;
use crate::domain::error::AppError;
use alloy::primitives::Address;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use url::Url;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    // General
    #[serde(default = "default_false")]
    pub debug: bool,
    #[serde(default = "default_false")]
    pub log_json: bool,

    // Network
    #[serde(default)]
    pub http_provider: String,
    pub chain_id: Option<u64>,

    // Identity. Signing is disabled when absent.
    pub wallet_key: Option<String>,

    // Transactions
    #[serde(default = "default_receipt_poll_ms")]
    pub receipt_poll_ms: u64,
    #[serde(default = "default_receipt_timeout_ms")]
    pub receipt_timeout_ms: u64,
    #[serde(default = "default_claim_gas_buffer_bps")]
    pub claim_gas_buffer_bps: u64,

    // Metadata
    #[serde(default = "default_metadata_timeout_ms")]
    pub metadata_timeout_ms: u64,

    /// Asset address -> price aggregator address.
    #[serde(default)]
    pub price_feeds: HashMap<String, String>,

    // Token-bound accounts. Both or neither.
    pub erc6551_registry: Option<String>,
    pub erc6551_implementation: Option<String>,
}

/// Registry and account implementation used to derive token-bound accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBoundSettings {
    pub registry: Address,
    pub implementation: Address,
}

fn default_false() -> bool {
    false
}

fn default_receipt_poll_ms() -> u64 {
    constants::DEFAULT_RECEIPT_POLL_MS
}

fn default_receipt_timeout_ms() -> u64 {
    constants::DEFAULT_RECEIPT_TIMEOUT_MS
}

fn default_claim_gas_buffer_bps() -> u64 {
    constants::CLAIM_GAS_BUFFER_BPS
}

fn default_metadata_timeout_ms() -> u64 {
    constants::DEFAULT_METADATA_TIMEOUT_MS
}

impl Settings {
    pub fn load_with_path(path: Option<&str>) -> Result<Self, AppError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let selected_config = resolve_config_path(path);
        let mut builder = Config::builder();

        if let Some(ref selected_path) = selected_config {
            builder = builder.add_source(File::from(Path::new(selected_path)).required(true));
        } else {
            builder = builder.add_source(File::with_name("config").required(false));
        }
        // Precedence: CLI (in main) > env/.env > selected file.
        builder = builder.add_source(Environment::default());

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;

        tracing::debug!(
            target: "config",
            file = selected_config.as_deref().unwrap_or("config.*"),
            signing = settings.wallet_key().is_some(),
            feeds = settings.price_feeds.len(),
            "Settings loaded"
        );
        Ok(settings)
    }

    pub fn load() -> Result<Self, AppError> {
        Self::load_with_path(None)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.http_url()?;
        if self.receipt_poll_ms == 0 {
            return Err(AppError::Config("RECEIPT_POLL_MS must be positive".into()));
        }
        if self.receipt_timeout_ms < self.receipt_poll_ms {
            return Err(AppError::Config(
                "RECEIPT_TIMEOUT_MS must not be shorter than RECEIPT_POLL_MS".into(),
            ));
        }
        if self.claim_gas_buffer_bps < constants::BPS_DENOMINATOR {
            return Err(AppError::Config(format!(
                "CLAIM_GAS_BUFFER_BPS must be at least {}",
                constants::BPS_DENOMINATOR
            )));
        }
        self.price_feed_map()?;
        self.token_bound()?;
        Ok(())
    }

    pub fn http_url(&self) -> Result<Url, AppError> {
        let raw = self.http_provider.trim();
        if raw.is_empty() {
            return Err(AppError::Config("HTTP_PROVIDER is missing".into()));
        }
        let url = Url::parse(raw)
            .map_err(|e| AppError::Config(format!("HTTP_PROVIDER is not a URL: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "HTTP_PROVIDER must be http(s), got '{}'",
                url.scheme()
            )));
        }
        Ok(url)
    }

    pub fn wallet_key(&self) -> Option<&str> {
        self.wallet_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn price_feed_map(&self) -> Result<HashMap<Address, Address>, AppError> {
        parse_address_map(&self.price_feeds, "price_feeds")
    }

    pub fn token_bound(&self) -> Result<Option<TokenBoundSettings>, AppError> {
        let parse = |field: &str, raw: &str| {
            parse_address_hex(raw)
                .ok_or_else(|| AppError::Config(format!("{field}: '{raw}' is not an address")))
        };
        match (self.erc6551_registry.as_deref(), self.erc6551_implementation.as_deref()) {
            (None, None) => Ok(None),
            (Some(registry), Some(implementation)) => Ok(Some(TokenBoundSettings {
                registry: parse("ERC6551_REGISTRY", registry)?,
                implementation: parse("ERC6551_IMPLEMENTATION", implementation)?,
            })),
            _ => Err(AppError::Config(
                "ERC6551_REGISTRY and ERC6551_IMPLEMENTATION must be set together".into(),
            )),
        }
    }

    pub fn log_level(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }

    pub fn receipt_poll(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_ms)
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_millis(self.receipt_timeout_ms)
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_millis(self.metadata_timeout_ms)
    }
}

fn resolve_config_path(path: Option<&str>) -> Option<String> {
    if let Some(path) = path {
        return Some(path.to_string());
    }
    detect_active_config_file()
}

fn detect_active_config_file() -> Option<String> {
    let priority_files = [
        "config.prod.toml",
        "config.dev.toml",
        "config.testnet.toml",
        "config.toml",
    ];

    priority_files
        .iter()
        .find(|file| config_has_active_flag(file) == Some(true))
        .map(|file| (*file).to_string())
}

fn config_has_active_flag(path: &str) -> Option<bool> {
    let p = Path::new(path);
    if !p.exists() {
        return None;
    }

    Config::builder()
        .add_source(File::from(p))
        .build()
        .ok()?
        .get_bool("THIS_ACTIVE")
        .ok()
}

fn parse_address_map(
    raw: &HashMap<String, String>,
    field: &str,
) -> Result<HashMap<Address, Address>, AppError> {
    raw.iter()
        .map(|(k, v)| {
            let asset = parse_address_hex(k);
            let feed = parse_address_hex(v);
            match (asset, feed) {
                (Some(asset), Some(feed)) => Ok((asset, feed)),
                _ => Err(AppError::Config(format!("{field}: invalid entry {k} -> {v}"))),
            }
        })
        .collect()
}
