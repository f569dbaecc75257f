//! Historical replay.

use anyhow::Result;
use clap::Args;
use rust_decimal::Decimal;
use sentiment_trader_backtest::{BacktestRunner, HistoricalBars, NewsArchive, ReportFormatter};
use sentiment_trader_core::ConfigLoader;
use sentiment_trader_signals::classifier;

/// Arguments for a backtest run.
#[derive(Args, Debug)]
pub struct BacktestArgs {
    /// Price CSV (timestamp,symbol,open,high,low,close,volume)
    #[arg(long)]
    pub prices: String,

    /// News archive JSON
    #[arg(long)]
    pub news: String,

    /// Starting cash
    #[arg(long, default_value = "100000")]
    pub initial_cash: Decimal,

    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml")]
    pub config: String,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run_backtest(args: BacktestArgs) -> Result<()> {
    let config = ConfigLoader::load_from(&args.config)?;
    let symbol = &config.strategy.symbol;

    tracing::info!(
        "Running backtest for {} with prices: {}, news: {}",
        symbol,
        args.prices,
        args.news
    );

    let bars = HistoricalBars::from_csv(&args.prices, symbol)?;
    if bars.is_empty() {
        anyhow::bail!("No {} bars found in {}", symbol, args.prices);
    }
    let news = NewsArchive::from_json(&args.news)?;
    tracing::info!("Loaded {} bars and {} articles", bars.len(), news.len());

    let classifier = classifier::from_config(&config.classifier)?;
    let mut runner = BacktestRunner::new(&config.strategy, bars, news, classifier, args.initial_cash)?;
    let report = runner.run().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", ReportFormatter::format(&report));
    }

    Ok(())
}
