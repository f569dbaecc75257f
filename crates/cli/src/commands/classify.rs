//! One-off classification of headlines, handy for checking thresholds.

use anyhow::{Context, Result};
use clap::Args;
use sentiment_trader_core::{ConfigLoader, SentimentClassifier};
use sentiment_trader_signals::{classifier, SignalAggregator};

/// Arguments for the classify command.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Text file with one headline per line
    #[arg(short, long)]
    pub input: String,

    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml")]
    pub config: String,
}

pub async fn run_classify(args: ClassifyArgs) -> Result<()> {
    let config = ConfigLoader::load_from(&args.config)?;
    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read input file: {}", args.input))?;
    let texts: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();

    let classifier = classifier::from_config(&config.classifier)?;
    let results = if texts.is_empty() {
        Vec::new()
    } else {
        classifier.classify(&texts).await?
    };

    for (text, result) in texts.iter().zip(&results) {
        println!("{:<8} {:.4}  {}", result.label.as_str(), result.score, text);
    }

    let aggregator = SignalAggregator::new(config.strategy.thresholds());
    let tally = aggregator.tally(&results);
    let signals = aggregator.signals_for(&tally);

    println!();
    println!(
        "positive: {}  negative: {}  neutral: {}",
        tally.positive, tally.negative, tally.neutral
    );
    println!(
        "positive signal: {}  negative signal: {}",
        signals.positive_met, signals.negative_met
    );

    Ok(())
}
