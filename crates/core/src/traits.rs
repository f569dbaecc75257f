//! Capability interfaces for the collaborators the strategy consumes.
//!
//! Implementations live in the adapter crates (Alpaca, backtest replay) and in
//! test fakes. Every method is called sequentially from a single tick.

use crate::types::{NewsArticle, OrderIntent, OrderReceipt, SentimentResult};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Account and market state.
#[async_trait]
pub trait AccountProvider: Send + Sync {
    async fn cash(&self) -> Result<Decimal>;
    async fn last_price(&self, symbol: &str) -> Result<Decimal>;
}

/// News retrieval for one symbol over an inclusive date range.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn get_news(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<NewsArticle>>;
}

/// Black-box sentiment model.
///
/// Must return exactly one result per input text, in input order.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, texts: &[String]) -> Result<Vec<SentimentResult>>;
    fn name(&self) -> &str;
}

/// Order execution boundary.
#[async_trait]
pub trait OrderExecutor: Send + Sync {
    async fn submit_order(&self, intent: &OrderIntent) -> Result<OrderReceipt>;
    /// Closes any open position in `symbol` and cancels its pending exits.
    async fn liquidate_all(&self, symbol: &str) -> Result<()>;
}

#[async_trait]
impl<T: AccountProvider + ?Sized> AccountProvider for Arc<T> {
    async fn cash(&self) -> Result<Decimal> {
        (**self).cash().await
    }

    async fn last_price(&self, symbol: &str) -> Result<Decimal> {
        (**self).last_price(symbol).await
    }
}

#[async_trait]
impl<T: NewsProvider + ?Sized> NewsProvider for Arc<T> {
    async fn get_news(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<NewsArticle>> {
        (**self).get_news(symbol, start, end).await
    }
}

#[async_trait]
impl<T: SentimentClassifier + ?Sized> SentimentClassifier for Arc<T> {
    async fn classify(&self, texts: &[String]) -> Result<Vec<SentimentResult>> {
        (**self).classify(texts).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<T: OrderExecutor + ?Sized> OrderExecutor for Arc<T> {
    async fn submit_order(&self, intent: &OrderIntent) -> Result<OrderReceipt> {
        (**self).submit_order(intent).await
    }

    async fn liquidate_all(&self, symbol: &str) -> Result<()> {
        (**self).liquidate_all(symbol).await
    }
}
