use crate::data_provider::Bar;
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sentiment_trader_core::{AccountProvider, OrderExecutor, OrderIntent, OrderReceipt, OrderSide};
use std::sync::{Mutex, MutexGuard};

/// Which bracket leg closed a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    StopLoss,
    TakeProfit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketExit {
    pub kind: ExitKind,
    pub price: Decimal,
    /// Signed position that was closed
    pub position: i64,
}

#[derive(Debug, Clone, Copy)]
struct OpenBracket {
    side: OrderSide,
    take_profit: Decimal,
    stop_loss: Decimal,
}

#[derive(Debug, Default)]
struct BrokerState {
    cash: Decimal,
    /// Signed share count, negative when short
    position: i64,
    bracket: Option<OpenBracket>,
    bar: Option<Bar>,
    fills: usize,
}

impl BrokerState {
    fn close_position(&mut self, price: Decimal) {
        self.cash += Decimal::from(self.position) * price;
        self.position = 0;
        self.bracket = None;
    }
}

/// In-memory broker for replay.
///
/// Market orders fill at the current bar's close. Attached brackets are checked
/// against each new bar in [`SimulatedBroker::advance`], stop first. Short sales
/// credit their proceeds to cash. No fees or slippage are modelled.
#[derive(Debug)]
pub struct SimulatedBroker {
    symbol: String,
    state: Mutex<BrokerState>,
}

impl SimulatedBroker {
    #[must_use]
    pub fn new(symbol: impl Into<String>, initial_cash: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            state: Mutex::new(BrokerState {
                cash: initial_cash,
                ..BrokerState::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BrokerState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Moves to `bar`, first resolving any open bracket against its range.
    pub fn advance(&self, bar: &Bar) -> Option<BracketExit> {
        let mut state = self.lock();
        let exit = match (state.bracket, state.position) {
            (Some(bracket), position) if position != 0 => Self::check_bracket(bracket, bar).map(|(kind, price)| {
                state.close_position(price);
                BracketExit { kind, price, position }
            }),
            _ => None,
        };
        state.bar = Some(bar.clone());

        if let Some(exit) = &exit {
            tracing::debug!(
                "{:?} hit at {} for {} on {}",
                exit.kind,
                exit.price,
                exit.position,
                bar.timestamp
            );
        }
        exit
    }

    fn check_bracket(bracket: OpenBracket, bar: &Bar) -> Option<(ExitKind, Decimal)> {
        match bracket.side {
            OrderSide::Buy => {
                if bar.low <= bracket.stop_loss {
                    Some((ExitKind::StopLoss, bracket.stop_loss))
                } else if bar.high >= bracket.take_profit {
                    Some((ExitKind::TakeProfit, bracket.take_profit))
                } else {
                    None
                }
            }
            OrderSide::Sell => {
                if bar.high >= bracket.stop_loss {
                    Some((ExitKind::StopLoss, bracket.stop_loss))
                } else if bar.low <= bracket.take_profit {
                    Some((ExitKind::TakeProfit, bracket.take_profit))
                } else {
                    None
                }
            }
        }
    }

    #[must_use]
    pub fn cash_balance(&self) -> Decimal {
        self.lock().cash
    }

    #[must_use]
    pub fn position(&self) -> i64 {
        self.lock().position
    }

    /// Cash plus the position marked at the current close.
    #[must_use]
    pub fn equity(&self) -> Decimal {
        let state = self.lock();
        let mark = state.bar.as_ref().map_or(Decimal::ZERO, |b| b.close);
        state.cash + Decimal::from(state.position) * mark
    }

    #[must_use]
    pub fn fills(&self) -> usize {
        self.lock().fills
    }

    fn current_close(&self, state: &BrokerState, symbol: &str) -> Result<Decimal> {
        if symbol != self.symbol {
            bail!("simulated broker trades {}, not {}", self.symbol, symbol);
        }
        state
            .bar
            .as_ref()
            .map(|b| b.close)
            .ok_or_else(|| anyhow!("no bar loaded for {}", symbol))
    }
}

#[async_trait]
impl AccountProvider for SimulatedBroker {
    async fn cash(&self) -> Result<Decimal> {
        Ok(self.lock().cash)
    }

    async fn last_price(&self, symbol: &str) -> Result<Decimal> {
        let state = self.lock();
        self.current_close(&state, symbol)
    }
}

#[async_trait]
impl OrderExecutor for SimulatedBroker {
    async fn submit_order(&self, intent: &OrderIntent) -> Result<OrderReceipt> {
        let mut state = self.lock();
        let price = self.current_close(&state, &intent.symbol)?;
        let quantity = i64::try_from(intent.quantity)?;
        let notional = Decimal::from(quantity) * price;

        match intent.side {
            OrderSide::Buy => {
                if notional > state.cash {
                    bail!("insufficient cash: {} needed, {} available", notional, state.cash);
                }
                state.cash -= notional;
                state.position += quantity;
            }
            OrderSide::Sell => {
                state.cash += notional;
                state.position -= quantity;
            }
        }
        state.bracket = Some(OpenBracket {
            side: intent.side,
            take_profit: intent.take_profit_price,
            stop_loss: intent.stop_loss_price,
        });
        state.fills += 1;

        Ok(OrderReceipt {
            order_id: uuid::Uuid::new_v4().to_string(),
            symbol: intent.symbol.clone(),
            side: intent.side,
            quantity: intent.quantity,
            status: "filled".to_string(),
        })
    }

    async fn liquidate_all(&self, symbol: &str) -> Result<()> {
        let mut state = self.lock();
        let price = self.current_close(&state, symbol)?;
        if state.position != 0 {
            state.close_position(price);
            state.fills += 1;
        }
        state.bracket = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn bar(day: u32, low: Decimal, high: Decimal, close: Decimal) -> Bar {
        Bar {
            timestamp: Utc.with_ymd_and_hms(2020, 1, day, 21, 0, 0).unwrap(),
            symbol: "SPY".to_string(),
            open: close,
            high,
            low,
            close,
            volume: dec!(1000),
        }
    }

    fn intent(side: OrderSide, quantity: u64) -> OrderIntent {
        OrderIntent::bracket("SPY", side, quantity, dec!(100), dec!(0.2), dec!(0.1), 2)
    }

    #[tokio::test]
    async fn test_buy_fills_at_close() {
        let broker = SimulatedBroker::new("SPY", dec!(10000));
        broker.advance(&bar(2, dec!(99), dec!(101), dec!(100)));

        let receipt = broker.submit_order(&intent(OrderSide::Buy, 10)).await.unwrap();

        assert_eq!(receipt.status, "filled");
        assert_eq!(broker.cash_balance(), dec!(9000));
        assert_eq!(broker.position(), 10);
        assert_eq!(broker.equity(), dec!(10000));
    }

    #[tokio::test]
    async fn test_short_credits_cash() {
        let broker = SimulatedBroker::new("SPY", dec!(10000));
        broker.advance(&bar(2, dec!(99), dec!(101), dec!(100)));

        broker.submit_order(&intent(OrderSide::Sell, 10)).await.unwrap();
        assert_eq!(broker.cash_balance(), dec!(11000));
        assert_eq!(broker.position(), -10);

        broker.advance(&bar(3, dec!(94), dec!(96), dec!(95)));
        assert_eq!(broker.equity(), dec!(10050));
    }

    #[tokio::test]
    async fn test_buy_rejected_without_cash() {
        let broker = SimulatedBroker::new("SPY", dec!(500));
        broker.advance(&bar(2, dec!(99), dec!(101), dec!(100)));

        assert!(broker.submit_order(&intent(OrderSide::Buy, 10)).await.is_err());
        assert_eq!(broker.position(), 0);
    }

    #[tokio::test]
    async fn test_no_bar_is_error() {
        let broker = SimulatedBroker::new("SPY", dec!(10000));
        assert!(broker.last_price("SPY").await.is_err());
        assert!(broker.submit_order(&intent(OrderSide::Buy, 1)).await.is_err());
    }

    #[tokio::test]
    async fn test_wrong_symbol_is_error() {
        let broker = SimulatedBroker::new("SPY", dec!(10000));
        broker.advance(&bar(2, dec!(99), dec!(101), dec!(100)));
        assert!(broker.last_price("AAPL").await.is_err());
    }

    #[tokio::test]
    async fn test_long_take_profit() {
        let broker = SimulatedBroker::new("SPY", dec!(10000));
        broker.advance(&bar(2, dec!(99), dec!(101), dec!(100)));
        broker.submit_order(&intent(OrderSide::Buy, 10)).await.unwrap();

        let exit = broker.advance(&bar(3, dec!(105), dec!(121), dec!(118))).unwrap();

        assert_eq!(exit.kind, ExitKind::TakeProfit);
        assert_eq!(exit.price, dec!(120));
        assert_eq!(exit.position, 10);
        assert_eq!(broker.position(), 0);
        assert_eq!(broker.cash_balance(), dec!(10200));
    }

    #[tokio::test]
    async fn test_stop_checked_before_take_profit() {
        let broker = SimulatedBroker::new("SPY", dec!(10000));
        broker.advance(&bar(2, dec!(99), dec!(101), dec!(100)));
        broker.submit_order(&intent(OrderSide::Buy, 10)).await.unwrap();

        // Range covers both legs
        let exit = broker.advance(&bar(3, dec!(85), dec!(125), dec!(100))).unwrap();

        assert_eq!(exit.kind, ExitKind::StopLoss);
        assert_eq!(exit.price, dec!(90));
        assert_eq!(broker.cash_balance(), dec!(9900));
    }

    #[tokio::test]
    async fn test_short_stop_loss() {
        let broker = SimulatedBroker::new("SPY", dec!(10000));
        broker.advance(&bar(2, dec!(99), dec!(101), dec!(100)));
        broker.submit_order(&intent(OrderSide::Sell, 10)).await.unwrap();

        let exit = broker.advance(&bar(3, dec!(105), dec!(112), dec!(111))).unwrap();

        assert_eq!(exit.kind, ExitKind::StopLoss);
        assert_eq!(exit.price, dec!(110));
        assert_eq!(exit.position, -10);
        assert_eq!(broker.cash_balance(), dec!(9900));
    }

    #[tokio::test]
    async fn test_bar_inside_bracket_keeps_position() {
        let broker = SimulatedBroker::new("SPY", dec!(10000));
        broker.advance(&bar(2, dec!(99), dec!(101), dec!(100)));
        broker.submit_order(&intent(OrderSide::Buy, 10)).await.unwrap();

        assert!(broker.advance(&bar(3, dec!(95), dec!(110), dec!(105))).is_none());
        assert_eq!(broker.position(), 10);
        assert_eq!(broker.equity(), dec!(10050));
    }

    #[tokio::test]
    async fn test_liquidate_closes_at_close() {
        let broker = SimulatedBroker::new("SPY", dec!(10000));
        broker.advance(&bar(2, dec!(99), dec!(101), dec!(100)));
        broker.submit_order(&intent(OrderSide::Buy, 10)).await.unwrap();
        broker.advance(&bar(3, dec!(100), dec!(106), dec!(105)));

        broker.liquidate_all("SPY").await.unwrap();

        assert_eq!(broker.position(), 0);
        assert_eq!(broker.cash_balance(), dec!(10050));
        // Bracket cleared with the position
        assert!(broker.advance(&bar(4, dec!(50), dec!(200), dec!(100))).is_none());
    }

    #[tokio::test]
    async fn test_liquidate_flat_is_noop() {
        let broker = SimulatedBroker::new("SPY", dec!(10000));
        broker.advance(&bar(2, dec!(99), dec!(101), dec!(100)));

        broker.liquidate_all("SPY").await.unwrap();

        assert_eq!(broker.cash_balance(), dec!(10000));
        assert_eq!(broker.fills(), 0);
    }
}
