// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use alloy::primitives::{Address, U256};
use alloy::providers::Provider;
use clap::Parser;
use std::sync::Arc;
use subscription_client::app::config::Settings;
use subscription_client::app::logging::setup_logging;
use subscription_client::common::parsing::parse_address_hex;
use subscription_client::common::session::Session;
use subscription_client::data::metadata::DocumentResolver;
use subscription_client::domain::constants::DEFAULT_PAGE_SIZE;
use subscription_client::domain::error::AppError;
use subscription_client::network::price_feed::converted_units_pretty;
use subscription_client::network::provider::{AlloyLedger, ConnectionFactory};
use subscription_client::services::listing::{ListedToken, list_owned_tokens, list_tokens};
use subscription_client::services::query::{GraphNode, QueryClient, subscription_queries};
use subscription_client::services::readers::erc6551::{RegistryHandle, find_account, get_account, is_valid_signer};

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect an on-chain subscription contract")]
struct Cli {
    /// Path to config file (default: config.{toml,yaml,...})
    #[arg(long)]
    config: Option<String>,

    /// Subscription contract address
    contract: String,

    /// Acting account for balance/allowance lookups (defaults to the wallet, if any)
    #[arg(long)]
    account: Option<String>,

    /// Token page to list, newest first
    #[arg(long, default_value_t = 0)]
    page: u64,

    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u64,

    /// Show a single token instead of a page
    #[arg(long)]
    token: Option<u64>,

    /// List the acting account's tokens instead of all tokens
    #[arg(long, default_value_t = false)]
    owned: bool,

    /// Emit JSON logs (overrides config/env)
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

fn print_token(token: &ListedToken) {
    println!(
        "  #{} deposited={} unspent={} active={} expire={}",
        token.token_id,
        token.snapshot.deposited,
        token.snapshot.unspent,
        token.snapshot.active,
        token.snapshot.expire
    );
}

fn parse_cli_address(field: &str, raw: &str) -> Result<Address, AppError> {
    parse_address_hex(raw).ok_or_else(|| AppError::Validation {
        field: field.to_string(),
        message: format!("'{}' is not an address", raw),
    })
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let settings = Settings::load_with_path(cli.config.as_deref())?;
    setup_logging(settings.log_level(), settings.log_json || cli.log_json);

    let contract = parse_cli_address("contract", &cli.contract)?;
    let http_url = settings.http_url()?;

    let (provider, wallet) = match settings.wallet_key() {
        Some(key) => {
            let (provider, address) = ConnectionFactory::http_with_wallet(http_url.as_str(), key)?;
            (provider, Some(address))
        }
        None => (ConnectionFactory::http(http_url.as_str())?, None),
    };

    let chain_id = provider
        .get_chain_id()
        .await
        .map_err(|e| AppError::Connection(format!("chain id lookup failed: {}", e)))?;
    if let Some(expected) = settings.chain_id
        && chain_id != expected
    {
        return Err(AppError::Config(format!(
            "CHAIN_ID mismatch: configured {}, node reports {}",
            expected, chain_id
        )));
    }

    let account = match cli.account.as_deref() {
        Some(raw) => Some(parse_cli_address("account", raw)?),
        None => wallet,
    };

    let ledger = AlloyLedger::new(provider, wallet)
        .with_receipt_polling(settings.receipt_poll(), settings.receipt_timeout());
    let documents = DocumentResolver::new(settings.metadata_timeout())?;
    let session = Session::new(Arc::new(ledger), documents)
        .with_account(account)
        .with_price_feeds(settings.price_feed_map()?);

    tracing::info!(
        target: "config",
        contract = %format!("{:#x}", contract),
        account = %account.map(|a| format!("{:#x}", a)).unwrap_or_else(|| "-".into()),
        "Inspecting subscription contract"
    );

    let client = Arc::new(QueryClient::new());
    let queries = subscription_queries(&session, &client, contract);
    queries.refresh().await;

    for (name, status) in queries.graph().statuses() {
        tracing::debug!(target: "query", node = name, status = ?status, "Node settled");
    }

    let snapshot = match queries.subscription_data.data() {
        Some(snapshot) => snapshot,
        None => {
            let state = queries.subscription_data.state();
            let contract_state = queries.subscription_contract.state();
            let error = state.error.or(contract_state.error);
            return Err(match error {
                Some(error) => AppError::Unknown(anyhow::anyhow!("{}", error)),
                None => AppError::Unknown(anyhow::anyhow!("contract data unavailable")),
            });
        }
    };

    println!("{}", snapshot.metadata.name);
    if let Some(description) = &snapshot.metadata.description {
        println!("  {}", description);
    }
    println!("  rate/epoch:     {} per {}s", snapshot.rate, snapshot.epoch_size);
    println!("  lock:           {}%", snapshot.lock);
    println!(
        "  supply:         {}{}",
        snapshot.total_supply,
        if snapshot.max_supply.is_zero() {
            String::new()
        } else {
            format!(" / {}", snapshot.max_supply)
        }
    );
    println!("  claimable:      {}", snapshot.claimable);
    println!("  total claimed:  {}", snapshot.total_claimed);
    println!(
        "  paused:         mint={} renew={} tip={}",
        snapshot.flags.minting_paused(),
        snapshot.flags.renewal_paused(),
        snapshot.flags.tipping_paused()
    );

    if let Some(token) = queries.erc20_data.data() {
        println!("  token:          {} ({}) {:#x}", token.name, token.symbol, token.address);
        if let Some(held) = queries.subscription_erc20_balance.data() {
            println!("  held:           {}", held);
        }
        if let Some(price) = queries.token_price.data().and_then(|p| *p) {
            println!(
                "  rate value:     {}",
                converted_units_pretty(snapshot.rate, token.decimals, &price)
            );
        }
        if let Some(balance) = queries.erc20_balance.data() {
            println!("  your balance:   {}", balance);
        }
        if let Some(allowance) = queries.erc20_allowance.data() {
            println!("  your allowance: {}", allowance);
        }
    }

    if let Some(warnings) = queries.warnings.data() {
        for warning in warnings.iter() {
            println!("  [{:?}] {}", warning.severity, warning.message);
        }
    }

    if let Some(token_id) = cli.token {
        let token_id = U256::from(token_id);
        let node = queries.token(token_id);
        node.evaluate().await;
        let state = node.state();
        match state.data {
            Some(snapshot) => print_token(&ListedToken {
                index: 0,
                token_id,
                snapshot: (*snapshot).clone(),
            }),
            None => {
                return Err(match state.error {
                    Some(error) => AppError::Unknown(anyhow::anyhow!("{}", error)),
                    None => AppError::Unknown(anyhow::anyhow!("token {} unavailable", token_id)),
                });
            }
        }
        if let Some(tba) = settings.token_bound()? {
            let registry = RegistryHandle::resolve(&session, tba.registry, tba.implementation, chain_id).await?;
            let bound = find_account(&registry, contract, token_id).await?;
            let deployed = get_account(&session, bound).await?.is_some();
            println!(
                "  account:        {:#x}{}",
                bound,
                if deployed { "" } else { " (not deployed)" }
            );
            if let Some(acting) = account
                && deployed
            {
                println!("  you can sign:   {}", is_valid_signer(&session, acting, bound).await?);
            }
        }
    } else if let Some(handle) = queries.subscription_contract.data() {
        let page = if cli.owned {
            let owner = session.require_account()?;
            println!("tokens of {:#x} (page {}):", owner, cli.page);
            list_owned_tokens(&handle, owner, cli.page, cli.page_size).await?
        } else {
            println!("tokens (page {}):", cli.page);
            list_tokens(&handle, cli.page, cli.page_size).await?
        };
        for token in &page {
            print_token(token);
        }
    }

    if !queries.graph().is_settled() {
        tracing::warn!(target: "query", "Some queries were still loading at exit");
    }
    Ok(())
}
