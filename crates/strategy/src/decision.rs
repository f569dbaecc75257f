//! Position state machine.
//!
//! `decide` is pure and maps (state, signals, quantity, cash, price) to a
//! [`Decision`]. The engine's state only moves through [`DecisionEngine::commit`],
//! which the caller invokes after the broker accepted the order.
//!
//! Transition table (positive is checked first, so a tie goes long):
//!
//! | State | positive | negative | Action              | Next  |
//! |-------|----------|----------|---------------------|-------|
//! | Flat  | true     | *        | open buy bracket    | Long  |
//! | Flat  | false    | true     | open sell bracket   | Short |
//! | Long  | true     | *        | hold                | Long  |
//! | Long  | false    | true     | liquidate, sell     | Short |
//! | Short | true     | *        | liquidate, buy      | Long  |
//! | Short | false    | true     | hold                | Short |
//! | any   | false    | false    | hold                | same  |
//!
//! An order whose exit prices round to zero at `price_decimals` is held.

use rust_decimal::Decimal;
use sentiment_trader_core::{
    rate_to_decimal, OrderIntent, OrderSide, PositionState, SentimentSignals, StrategyConfig,
    TradingResult,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a tick produced no order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoldReason {
    /// Cash below one share at the last price
    InsufficientCash,
    /// Neither side met the ratio threshold
    NoSignal,
    AlreadyLong,
    AlreadyShort,
    /// A direction was signalled but sizing produced zero shares
    ZeroQuantity,
    /// An exit price rounded to zero or below at the configured precision
    UnpriceableBracket,
}

impl fmt::Display for HoldReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InsufficientCash => "insufficient cash",
            Self::NoSignal => "no signal",
            Self::AlreadyLong => "already long",
            Self::AlreadyShort => "already short",
            Self::ZeroQuantity => "zero quantity",
            Self::UnpriceableBracket => "bracket exit rounds to zero",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Hold(HoldReason),
    /// Open from flat.
    Open { intent: OrderIntent, next: PositionState },
    /// Liquidate the current position, then open the opposite side.
    Flip { intent: OrderIntent, next: PositionState },
}

impl Decision {
    #[must_use]
    pub const fn intent(&self) -> Option<&OrderIntent> {
        match self {
            Self::Hold(_) => None,
            Self::Open { intent, .. } | Self::Flip { intent, .. } => Some(intent),
        }
    }
}

/// Bracket parameters, converted to `Decimal` once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketParams {
    pub take_profit: Decimal,
    pub stop_loss: Decimal,
    pub price_decimals: u32,
}

/// Per-instrument decision state machine. Not shared between instruments.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    symbol: String,
    state: PositionState,
    bracket: BracketParams,
}

impl DecisionEngine {
    #[must_use]
    pub fn new(symbol: impl Into<String>, bracket: BracketParams) -> Self {
        Self::with_state(symbol, bracket, PositionState::Flat)
    }

    /// Resumes from a previously persisted state.
    #[must_use]
    pub fn with_state(symbol: impl Into<String>, bracket: BracketParams, state: PositionState) -> Self {
        Self {
            symbol: symbol.into(),
            state,
            bracket,
        }
    }

    /// Builds an engine from strategy configuration.
    ///
    /// # Errors
    /// Returns an error if a rate cannot be represented as `Decimal`.
    pub fn from_config(config: &StrategyConfig) -> TradingResult<Self> {
        let bracket = BracketParams {
            take_profit: rate_to_decimal("take_profit", config.take_profit)?,
            stop_loss: rate_to_decimal("stop_loss", config.stop_loss)?,
            price_decimals: config.price_decimals,
        };
        Ok(Self::new(config.symbol.clone(), bracket))
    }

    #[must_use]
    pub const fn state(&self) -> PositionState {
        self.state
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    #[must_use]
    pub const fn bracket(&self) -> BracketParams {
        self.bracket
    }

    /// Decides this tick's action without touching state.
    #[must_use]
    pub fn decide(
        &self,
        signals: SentimentSignals,
        quantity: u64,
        cash: Decimal,
        last_price: Decimal,
    ) -> Decision {
        if cash < last_price {
            return Decision::Hold(HoldReason::InsufficientCash);
        }

        let (side, flip) = match (self.state, signals.positive_met, signals.negative_met) {
            (_, false, false) => return Decision::Hold(HoldReason::NoSignal),
            (PositionState::Long, true, _) => return Decision::Hold(HoldReason::AlreadyLong),
            (PositionState::Short, false, true) => return Decision::Hold(HoldReason::AlreadyShort),
            (PositionState::Flat, true, _) => (OrderSide::Buy, false),
            (PositionState::Flat, false, true) => (OrderSide::Sell, false),
            (PositionState::Long, false, true) => (OrderSide::Sell, true),
            (PositionState::Short, true, _) => (OrderSide::Buy, true),
        };

        if quantity == 0 {
            return Decision::Hold(HoldReason::ZeroQuantity);
        }

        let intent = OrderIntent::bracket(
            self.symbol.clone(),
            side,
            quantity,
            last_price,
            self.bracket.take_profit,
            self.bracket.stop_loss,
            self.bracket.price_decimals,
        );
        if !intent.has_positive_exits() {
            return Decision::Hold(HoldReason::UnpriceableBracket);
        }
        let next = side.resulting_state();

        if flip {
            Decision::Flip { intent, next }
        } else {
            Decision::Open { intent, next }
        }
    }

    /// Records a transition once the broker has accepted it.
    pub fn commit(&mut self, next: PositionState) {
        if next != self.state {
            tracing::info!(symbol = %self.symbol, from = %self.state, to = %next, "Position state transition");
        }
        self.state = next;
    }
}
