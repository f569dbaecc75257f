use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sentiment_trader_core::PositionState;
use serde::Serialize;

/// Summary of one replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    pub symbol: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub initial_equity: Decimal,
    pub final_equity: Decimal,
    pub equity_peak: Decimal,
    /// Fractional return, 0.05 = 5%
    pub total_return: Decimal,
    /// Fractional peak-to-trough decline
    pub max_drawdown: Decimal,
    pub ticks: usize,
    pub orders: usize,
    pub flips: usize,
    pub bracket_exits: usize,
    pub skipped_ticks: usize,
    pub errored_ticks: usize,
    pub final_state: PositionState,
}

/// Tracks the equity curve as bars are replayed.
#[derive(Debug, Clone)]
pub struct EquityTracker {
    initial: Decimal,
    peak: Decimal,
    last: Decimal,
    max_drawdown: Decimal,
}

impl EquityTracker {
    #[must_use]
    pub fn new(initial_equity: Decimal) -> Self {
        Self {
            initial: initial_equity,
            peak: initial_equity,
            last: initial_equity,
            max_drawdown: Decimal::ZERO,
        }
    }

    pub fn record(&mut self, equity: Decimal) {
        self.last = equity;
        if equity > self.peak {
            self.peak = equity;
        }
        if self.peak > Decimal::ZERO {
            let drawdown = (self.peak - equity) / self.peak;
            if drawdown > self.max_drawdown {
                self.max_drawdown = drawdown;
            }
        }
    }

    #[must_use]
    pub const fn last(&self) -> Decimal {
        self.last
    }

    #[must_use]
    pub const fn peak(&self) -> Decimal {
        self.peak
    }

    #[must_use]
    pub const fn max_drawdown(&self) -> Decimal {
        self.max_drawdown
    }

    #[must_use]
    pub fn total_return(&self) -> Decimal {
        if self.initial.is_zero() {
            Decimal::ZERO
        } else {
            (self.last - self.initial) / self.initial
        }
    }
}
