use rust_decimal_macros::dec;
use sentiment_trader_backtest::{BacktestRunner, HistoricalBars, NewsArchive, ReportFormatter};
use sentiment_trader_core::{
    ConfigLoader, PositionState, SentimentClassifier, SentimentLabel, StrategyConfig,
};
use sentiment_trader_signals::{LexiconClassifier, SignalAggregator};
use sentiment_trader_strategy::StateStore;
use std::io::Write;
use std::path::PathBuf;

fn data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("data").join(name)
}

fn config() -> StrategyConfig {
    StrategyConfig {
        days_prior: 1,
        ..StrategyConfig::default()
    }
}

#[tokio::test]
async fn test_backtest_sample_data() {
    let bars = HistoricalBars::from_csv(data("spy_prices.csv"), "SPY").expect("Failed to load prices");
    let news = NewsArchive::from_json(data("spy_news.json")).expect("Failed to load news");
    assert_eq!(bars.len(), 7);

    let mut runner = BacktestRunner::new(&config(), bars, news, LexiconClassifier::new(), dec!(100000))
        .expect("Invalid config");
    let report = runner.run().await;

    // Long on the rally, flipped short on the selloff
    assert_eq!(report.ticks, 7);
    assert_eq!(report.orders, 2);
    assert_eq!(report.flips, 1);
    assert_eq!(report.bracket_exits, 0);
    assert_eq!(report.errored_ticks, 0);
    assert_eq!(report.final_state, PositionState::Short);
    assert_eq!(runner.broker().position(), -255);

    let rendered = ReportFormatter::format(&report);
    assert!(rendered.contains("Flips:                 1"));
}

#[tokio::test]
async fn test_backtest_wide_window_delays_flip() {
    // The five-day window sees the rally and the selloff together on the 7th.
    // Both sides meet the ratio, positive wins, and the flip waits until the
    // rally drops out of the window on the 8th.
    let bars = HistoricalBars::from_csv(data("spy_prices.csv"), "SPY").unwrap();
    let news = NewsArchive::from_json(data("spy_news.json")).unwrap();

    let mut runner =
        BacktestRunner::new(&StrategyConfig::default(), bars, news, LexiconClassifier::new(), dec!(100000))
            .unwrap();
    let report = runner.run().await;

    assert_eq!(report.orders, 2);
    assert_eq!(report.flips, 1);
    assert_eq!(report.final_state, PositionState::Short);
    assert_eq!(runner.broker().position(), -254);
}

#[tokio::test]
async fn test_classify_sample_headlines() {
    let raw = std::fs::read_to_string(data("headlines.txt")).unwrap();
    let texts: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();

    let results = LexiconClassifier::new().classify(&texts).await.unwrap();
    let labels: Vec<_> = results.iter().map(|r| r.label).collect();
    assert_eq!(
        labels,
        vec![SentimentLabel::Positive, SentimentLabel::Negative, SentimentLabel::Neutral]
    );

    let aggregator = SignalAggregator::new(config().thresholds());
    let signals = aggregator.evaluate(&results);
    assert!(!signals.positive_met);
    assert!(!signals.negative_met);
}

#[test]
fn test_config_file_drives_strategy() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Config.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        r#"
[strategy]
symbol = "AAPL"
cash_at_risk = 0.25
state_file = "{}"

[classifier]
kind = "lexicon"
"#,
        dir.path().join("state.json").display()
    )
    .unwrap();

    let config = ConfigLoader::load_from(&path).unwrap();
    assert_eq!(config.strategy.symbol, "AAPL");
    assert!((config.strategy.cash_at_risk - 0.25).abs() < f64::EPSILON);

    let store = StateStore::new(config.strategy.state_file.unwrap());
    assert_eq!(store.load("AAPL"), PositionState::Flat);
}
