//! Data model shared by the aggregator, the decision engine and the collaborators.
//!
//! Everything here is recomputed on every tick. The only value that survives
//! between ticks is [`PositionState`], and it is owned by the decision engine.

use crate::error::TradingError;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentiment label assigned to a single article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = TradingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" | "bullish" => Ok(Self::Positive),
            "negative" | "bearish" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            other => Err(TradingError::Classifier(format!(
                "unknown sentiment label: {other:?}"
            ))),
        }
    }
}

/// One classification, produced per input text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    /// Classifier confidence in [0.0, 1.0]
    pub score: f64,
}

impl SentimentResult {
    /// Creates a result, validating the score range.
    ///
    /// # Errors
    /// Returns [`TradingError::Classifier`] if `score` is outside [0.0, 1.0].
    pub fn new(label: SentimentLabel, score: f64) -> Result<Self, TradingError> {
        if !(0.0..=1.0).contains(&score) {
            return Err(TradingError::Classifier(format!(
                "score must be in [0.0, 1.0], got {score}"
            )));
        }
        Ok(Self { label, score })
    }
}

/// Gates applied by the aggregator. Fixed for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Minimum confidence for a labelled result to count toward its side
    pub threshold_score: f64,
    /// Minimum share of the whole batch one side must reach
    pub threshold_ratio: f64,
}

impl ThresholdConfig {
    /// # Errors
    /// Returns [`TradingError::InvalidConfig`] if either threshold is outside [0.0, 1.0].
    pub fn new(threshold_score: f64, threshold_ratio: f64) -> Result<Self, TradingError> {
        if !(0.0..=1.0).contains(&threshold_score) {
            return Err(TradingError::InvalidConfig(format!(
                "threshold_score must be in [0.0, 1.0], got {threshold_score}"
            )));
        }
        if !(0.0..=1.0).contains(&threshold_ratio) {
            return Err(TradingError::InvalidConfig(format!(
                "threshold_ratio must be in [0.0, 1.0], got {threshold_ratio}"
            )));
        }
        Ok(Self {
            threshold_score,
            threshold_ratio,
        })
    }
}

/// Per-side counts of a sentiment batch after the score gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentTally {
    pub positive: usize,
    pub negative: usize,
    /// Neutral labels plus positive/negative labels that failed the score gate
    pub neutral: usize,
}

impl SentimentTally {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    /// Share of the batch on the positive side, `None` for an empty batch.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn positive_ratio(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(self.positive as f64 / total as f64),
        }
    }

    /// Share of the batch on the negative side, `None` for an empty batch.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn negative_ratio(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(self.negative as f64 / total as f64),
        }
    }
}

/// Aggregator output: whether each side cleared the ratio threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentSignals {
    pub positive_met: bool,
    pub negative_met: bool,
}

impl SentimentSignals {
    #[must_use]
    pub const fn new(positive_met: bool, negative_met: bool) -> Self {
        Self {
            positive_met,
            negative_met,
        }
    }

    #[must_use]
    pub const fn none() -> Self {
        Self::new(false, false)
    }

    #[must_use]
    pub const fn is_directional(&self) -> bool {
        self.positive_met || self.negative_met
    }
}

/// The engine's notion of current directional exposure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionState {
    #[default]
    Flat,
    Long,
    Short,
}

impl fmt::Display for PositionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Flat => "flat",
            Self::Long => "long",
            Self::Short => "short",
        };
        f.write_str(s)
    }
}

/// Inputs to the position sizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizingInputs {
    pub cash: Decimal,
    pub last_price: Decimal,
    /// Fraction of cash committed to a new position, in (0, 1]
    pub cash_at_risk: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }

    /// Position the engine holds once an order on this side is filled.
    #[must_use]
    pub const fn resulting_state(self) -> PositionState {
        match self {
            Self::Buy => PositionState::Long,
            Self::Sell => PositionState::Short,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bracketed market order: entry plus take-profit and stop-loss exits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: u64,
    pub take_profit_price: Decimal,
    pub stop_loss_price: Decimal,
}

impl OrderIntent {
    /// Builds a bracket around `last_price`.
    ///
    /// For a buy the take-profit sits `take_profit` above the price and the stop
    /// `stop_loss` below it; for a sell both legs are mirrored. Prices are rounded
    /// half-to-even to `price_decimals` places.
    #[must_use]
    pub fn bracket(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: u64,
        last_price: Decimal,
        take_profit: Decimal,
        stop_loss: Decimal,
        price_decimals: u32,
    ) -> Self {
        let (tp_factor, sl_factor) = match side {
            OrderSide::Buy => (Decimal::ONE + take_profit, Decimal::ONE - stop_loss),
            OrderSide::Sell => (Decimal::ONE - take_profit, Decimal::ONE + stop_loss),
        };
        let round = |price: Decimal| {
            price.round_dp_with_strategy(price_decimals, RoundingStrategy::MidpointNearestEven)
        };

        Self {
            symbol: symbol.into(),
            side,
            quantity,
            take_profit_price: round(last_price * tp_factor),
            stop_loss_price: round(last_price * sl_factor),
        }
    }

    /// Both exit legs are strictly positive.
    #[must_use]
    pub fn has_positive_exits(&self) -> bool {
        self.take_profit_price > Decimal::ZERO && self.stop_loss_price > Decimal::ZERO
    }
}

/// Acknowledgement returned by the execution collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: u64,
    pub status: String,
}

/// A news article as returned by the news collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub headline: String,
    pub summary: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl NewsArticle {
    #[must_use]
    pub fn new(headline: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            summary: summary.into(),
            published_at: None,
        }
    }

    #[must_use]
    pub const fn with_published_at(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = Some(at);
        self
    }

    /// Text handed to the classifier: headline immediately followed by summary.
    #[must_use]
    pub fn text(&self) -> String {
        format!("{}{}", self.headline, self.summary)
    }
}
