//! Live trading loop.

use anyhow::{bail, Result};
use clap::Args;
use sentiment_trader_alpaca::AlpacaClient;
use sentiment_trader_core::{ConfigLoader, SentimentClassifier};
use sentiment_trader_signals::classifier;
use sentiment_trader_strategy::{SentimentTrader, StateStore, TickOutcome};
use std::sync::Arc;

/// Arguments for the live trading loop.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml")]
    pub config: String,

    /// Optional log file path (logs to file instead of stderr)
    #[arg(long)]
    pub log_file: Option<String>,

    /// Run a single tick and exit
    #[arg(long)]
    pub once: bool,
}

pub async fn run_live(args: RunArgs) -> Result<()> {
    let config = ConfigLoader::load_from(&args.config)?;
    if config.alpaca.api_key.is_empty() || config.alpaca.api_secret.is_empty() {
        bail!("Alpaca credentials missing: set APP_ALPACA__API_KEY and APP_ALPACA__API_SECRET");
    }

    let client = Arc::new(AlpacaClient::new(&config.alpaca)?);
    let classifier = classifier::from_config(&config.classifier)?;
    tracing::info!(
        "Starting {} on {} with {} classifier, ticking every {}s",
        config.strategy.symbol,
        config.alpaca.api_url,
        classifier.name(),
        config.strategy.tick_interval_secs
    );

    let mut trader = SentimentTrader::new(
        &config.strategy,
        Arc::clone(&client),
        Arc::clone(&client),
        classifier,
        Arc::clone(&client),
    )?;
    if let Some(path) = &config.strategy.state_file {
        trader = trader.with_state_store(StateStore::new(path));
    }

    let mut interval = tokio::time::interval(config.strategy.tick_interval());
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, shutting down");
                break;
            }
        }

        let result = tokio::select! {
            result = trader.on_tick(chrono::Utc::now()) => result,
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!("Received Ctrl+C mid-tick, abandoning it; check broker positions before restarting");
                break;
            }
        };
        match result {
            Ok(TickOutcome::Opened { intent, receipt } | TickOutcome::Flipped { intent, receipt }) => {
                tracing::info!(
                    "Order {} placed: {} {} {}",
                    receipt.order_id,
                    intent.side,
                    intent.quantity,
                    intent.symbol
                );
            }
            Ok(outcome) => tracing::debug!("Tick finished: {:?}", outcome),
            Err(e) => tracing::error!("Tick failed: {}", e),
        }
        if args.once {
            break;
        }
    }

    tracing::info!("Stopped in {} state", trader.state());
    Ok(())
}
