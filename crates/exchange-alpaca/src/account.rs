use crate::client::{AlpacaClient, Api};
use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sentiment_trader_core::AccountProvider;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct AccountResponse {
    cash: Decimal,
}

#[derive(Debug, Deserialize)]
struct LatestTradeResponse {
    trade: LatestTrade,
}

#[derive(Debug, Deserialize)]
struct LatestTrade {
    #[serde(rename = "p")]
    price: Decimal,
}

#[async_trait]
impl AccountProvider for AlpacaClient {
    async fn cash(&self) -> Result<Decimal> {
        let account: AccountResponse = self.get(Api::Trading, "/v2/account").await?;
        Ok(account.cash)
    }

    async fn last_price(&self, symbol: &str) -> Result<Decimal> {
        let endpoint = format!("/v2/stocks/{symbol}/trades/latest");
        let latest: LatestTradeResponse = self.get(Api::Data, &endpoint).await?;
        tracing::debug!("Latest trade for {}: {}", symbol, latest.trade.price);
        Ok(latest.trade.price)
    }
}
