use crate::client::{check_status, is_not_found, AlpacaClient, Api};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Method;
use rust_decimal::Decimal;
use sentiment_trader_core::{OrderExecutor, OrderIntent, OrderReceipt};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct BracketOrderRequest<'a> {
    symbol: &'a str,
    qty: String,
    side: &'static str,
    #[serde(rename = "type")]
    order_type: &'static str,
    time_in_force: &'static str,
    order_class: &'static str,
    take_profit: TakeProfit,
    stop_loss: StopLoss,
}

#[derive(Debug, Serialize)]
struct TakeProfit {
    limit_price: Decimal,
}

#[derive(Debug, Serialize)]
struct StopLoss {
    stop_price: Decimal,
}

impl<'a> From<&'a OrderIntent> for BracketOrderRequest<'a> {
    fn from(intent: &'a OrderIntent) -> Self {
        Self {
            symbol: &intent.symbol,
            qty: intent.quantity.to_string(),
            side: intent.side.as_str(),
            order_type: "market",
            time_in_force: "gtc",
            order_class: "bracket",
            take_profit: TakeProfit {
                limit_price: intent.take_profit_price.normalize(),
            },
            stop_loss: StopLoss {
                stop_price: intent.stop_loss_price.normalize(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct OpenOrder {
    id: String,
}

impl AlpacaClient {
    /// Cancels every open order for `symbol`, including bracket exit legs.
    async fn cancel_open_orders(&self, symbol: &str) -> Result<usize> {
        let request = self
            .request(Method::GET, Api::Trading, "/v2/orders")
            .query(&[("status", "open"), ("symbols", symbol)]);
        let open: Vec<OpenOrder> = self.send_json(request).await?;

        for order in &open {
            let endpoint = format!("/v2/orders/{}", order.id);
            let response = self.send(self.request(Method::DELETE, Api::Trading, &endpoint)).await?;
            // Already filled or cancelled between listing and cancelling
            if is_not_found(&response) {
                continue;
            }
            check_status(response)
                .await
                .with_context(|| format!("cancelling order {}", order.id))?;
        }

        Ok(open.len())
    }
}

#[async_trait]
impl OrderExecutor for AlpacaClient {
    async fn submit_order(&self, intent: &OrderIntent) -> Result<OrderReceipt> {
        let body = BracketOrderRequest::from(intent);
        let request = self.request(Method::POST, Api::Trading, "/v2/orders").json(&body);
        let order: OrderResponse = self.send_json(request).await?;

        tracing::info!(
            "Alpaca accepted {} {} {} as {} ({})",
            intent.side,
            intent.quantity,
            intent.symbol,
            order.id,
            order.status
        );

        Ok(OrderReceipt {
            order_id: order.id,
            symbol: intent.symbol.clone(),
            side: intent.side,
            quantity: intent.quantity,
            status: order.status,
        })
    }

    async fn liquidate_all(&self, symbol: &str) -> Result<()> {
        let cancelled = self.cancel_open_orders(symbol).await?;
        if cancelled > 0 {
            tracing::debug!("Cancelled {} open orders for {}", cancelled, symbol);
        }

        let endpoint = format!("/v2/positions/{symbol}");
        let response = self.send(self.request(Method::DELETE, Api::Trading, &endpoint)).await?;
        if is_not_found(&response) {
            tracing::info!("No open {} position to liquidate", symbol);
            return Ok(());
        }
        check_status(response).await?;

        tracing::info!("Liquidated {} position", symbol);
        Ok(())
    }
}
