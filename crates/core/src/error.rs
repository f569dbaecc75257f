use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that abort a single trading tick.
///
/// None of these are fatal to the process; the driver decides whether to retry,
/// skip or halt on the next tick.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TradingError {
    /// Last price was zero or negative.
    #[error("Invalid price: {price} (must be positive)")]
    InvalidPrice { price: Decimal },

    /// Sizing arithmetic left the representable `Decimal` range.
    #[error("Position size overflow: cash {cash} at price {price}")]
    SizingOverflow { cash: Decimal, price: Decimal },

    /// Configuration value out of range.
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    /// Cash or last-price lookup failed.
    #[error("Market data unavailable: {0}")]
    MarketData(String),

    /// News retrieval failed.
    #[error("News retrieval failed: {0}")]
    News(String),

    /// Classifier failed or returned a malformed batch.
    #[error("Classifier error: {0}")]
    Classifier(String),

    /// Order submission rejected or failed.
    #[error("Order submission failed: {0}")]
    OrderSubmission(String),

    /// Closing the current position failed.
    #[error("Liquidation failed: {0}")]
    Liquidation(String),
}

pub type TradingResult<T> = std::result::Result<T, TradingError>;
