pub mod config;
pub mod config_loader;
pub mod error;
pub mod position_sizing;
pub mod traits;
pub mod types;

pub use config::{
    AlpacaConfig, AppConfig, ClassifierConfig, ClassifierKind, StrategyConfig, FINBERT_INFERENCE_URL,
    MAX_DAYS_PRIOR,
};
pub use config_loader::ConfigLoader;
pub use error::{TradingError, TradingResult};
pub use position_sizing::{rate_to_decimal, PositionSizer};
pub use traits::{AccountProvider, NewsProvider, OrderExecutor, SentimentClassifier};
pub use types::{
    NewsArticle, OrderIntent, OrderReceipt, OrderSide, PositionState, SentimentLabel,
    SentimentResult, SentimentSignals, SentimentTally, SizingInputs, ThresholdConfig,
};
