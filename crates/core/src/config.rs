use crate::error::{TradingError, TradingResult};
use crate::types::ThresholdConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Longest accepted news lookback, about ten years.
pub const MAX_DAYS_PRIOR: u32 = 3650;

/// Default FinBERT endpoint on the Hugging Face inference API.
pub const FINBERT_INFERENCE_URL: &str =
    "https://api-inference.huggingface.co/models/ProsusAI/finbert";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub strategy: StrategyConfig,
    pub alpaca: AlpacaConfig,
    pub classifier: ClassifierConfig,
}

/// Strategy parameters. Immutable for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub symbol: String,
    /// Fraction of cash committed per new position, in (0, 1]
    pub cash_at_risk: f64,
    pub threshold_score: f64,
    pub threshold_ratio: f64,
    /// Take-profit distance as a fraction of entry price, in (0, 1)
    pub take_profit: f64,
    /// Stop-loss distance as a fraction of entry price, in (0, 1)
    pub stop_loss: f64,
    /// News lookback window in days
    pub days_prior: u32,
    pub tick_interval_secs: u64,
    /// Decimal places for bracket prices
    pub price_decimals: u32,
    /// Where the last committed position state is persisted, if anywhere
    pub state_file: Option<PathBuf>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            symbol: "SPY".to_string(),
            cash_at_risk: 0.5,
            threshold_score: 0.9,
            threshold_ratio: 0.5,
            take_profit: 0.3,
            stop_loss: 0.1,
            days_prior: 5,
            tick_interval_secs: 24 * 60 * 60,
            price_decimals: 2,
            state_file: None,
        }
    }
}

impl StrategyConfig {
    /// Checks every parameter range.
    ///
    /// # Errors
    /// Returns [`TradingError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> TradingResult<()> {
        if self.symbol.trim().is_empty() {
            return Err(TradingError::InvalidConfig("symbol must not be empty".to_string()));
        }
        if !(self.cash_at_risk > 0.0 && self.cash_at_risk <= 1.0) {
            return Err(TradingError::InvalidConfig(format!(
                "cash_at_risk must be in (0, 1], got {}",
                self.cash_at_risk
            )));
        }
        ThresholdConfig::new(self.threshold_score, self.threshold_ratio)?;
        for (name, value) in [("take_profit", self.take_profit), ("stop_loss", self.stop_loss)] {
            if !(value > 0.0 && value < 1.0) {
                return Err(TradingError::InvalidConfig(format!(
                    "{name} must be in (0, 1), got {value}"
                )));
            }
        }
        if self.days_prior > MAX_DAYS_PRIOR {
            return Err(TradingError::InvalidConfig(format!(
                "days_prior must be at most {MAX_DAYS_PRIOR}, got {}",
                self.days_prior
            )));
        }
        if self.tick_interval_secs == 0 {
            return Err(TradingError::InvalidConfig(
                "tick_interval_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub const fn thresholds(&self) -> ThresholdConfig {
        ThresholdConfig {
            threshold_score: self.threshold_score,
            threshold_ratio: self.threshold_ratio,
        }
    }

    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlpacaConfig {
    /// Trading API (account, orders, positions)
    pub api_url: String,
    /// Market data API (latest trades, news)
    pub data_url: String,
    pub api_key: String,
    pub api_secret: String,
    pub requests_per_minute: u32,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for AlpacaConfig {
    fn default() -> Self {
        Self {
            api_url: "https://paper-api.alpaca.markets".to_string(),
            data_url: "https://data.alpaca.markets".to_string(),
            api_key: String::new(),
            api_secret: String::new(),
            requests_per_minute: 200,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AlpacaConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Offline keyword classifier
    #[default]
    Lexicon,
    /// Remote text-classification inference endpoint
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub kind: ClassifierKind,
    pub url: String,
    pub api_token: Option<String>,
    pub batch_size: usize,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            kind: ClassifierKind::Lexicon,
            url: FINBERT_INFERENCE_URL.to_string(),
            api_token: None,
            batch_size: 16,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClassifierConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
