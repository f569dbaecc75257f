//! Bar-by-bar replay of the sentiment strategy.

use crate::data_provider::HistoricalBars;
use crate::execution::SimulatedBroker;
use crate::metrics::{BacktestReport, EquityTracker};
use rust_decimal::Decimal;
use sentiment_trader_core::{NewsProvider, SentimentClassifier, StrategyConfig, TradingResult};
use sentiment_trader_strategy::{SentimentTrader, TickOutcome};
use std::sync::Arc;
use tracing::{info, warn};

type BacktestTrader<N, C> = SentimentTrader<Arc<SimulatedBroker>, N, C, Arc<SimulatedBroker>>;

pub struct BacktestRunner<N, C>
where
    N: NewsProvider,
    C: SentimentClassifier,
{
    trader: BacktestTrader<N, C>,
    broker: Arc<SimulatedBroker>,
    bars: HistoricalBars,
    initial_cash: Decimal,
}

impl<N, C> BacktestRunner<N, C>
where
    N: NewsProvider,
    C: SentimentClassifier,
{
    /// Wires a fresh simulated broker into a trader for `config.symbol`.
    ///
    /// # Errors
    /// Returns an error if the strategy configuration is invalid.
    pub fn new(
        config: &StrategyConfig,
        bars: HistoricalBars,
        news: N,
        classifier: C,
        initial_cash: Decimal,
    ) -> TradingResult<Self> {
        let broker = Arc::new(SimulatedBroker::new(config.symbol.clone(), initial_cash));
        let trader = SentimentTrader::new(config, Arc::clone(&broker), news, classifier, Arc::clone(&broker))?;

        Ok(Self {
            trader,
            broker,
            bars,
            initial_cash,
        })
    }

    #[must_use]
    pub fn broker(&self) -> &SimulatedBroker {
        &self.broker
    }

    /// Replays every bar: the broker advances first, then exactly one tick runs
    /// at the bar's timestamp. Tick errors are counted and the replay continues.
    pub async fn run(&mut self) -> BacktestReport {
        let mut equity = EquityTracker::new(self.initial_cash);
        let mut report = BacktestReport {
            symbol: self.trader.symbol().to_string(),
            start_time: self.bars.bars().first().map(|b| b.timestamp),
            end_time: self.bars.bars().last().map(|b| b.timestamp),
            initial_equity: self.initial_cash,
            final_equity: self.initial_cash,
            equity_peak: self.initial_cash,
            total_return: Decimal::ZERO,
            max_drawdown: Decimal::ZERO,
            ticks: 0,
            orders: 0,
            flips: 0,
            bracket_exits: 0,
            skipped_ticks: 0,
            errored_ticks: 0,
            final_state: self.trader.state(),
        };

        info!("Replaying {} bars for {}", self.bars.len(), report.symbol);

        for bar in self.bars.bars() {
            if self.broker.advance(bar).is_some() {
                report.bracket_exits += 1;
            }

            report.ticks += 1;
            match self.trader.on_tick(bar.timestamp).await {
                Ok(TickOutcome::Skipped(_)) => report.skipped_ticks += 1,
                Ok(TickOutcome::Held { .. }) => {}
                Ok(TickOutcome::Opened { .. }) => report.orders += 1,
                Ok(TickOutcome::Flipped { .. }) => {
                    report.orders += 1;
                    report.flips += 1;
                }
                Err(e) => {
                    warn!("Tick at {} failed: {}", bar.timestamp, e);
                    report.errored_ticks += 1;
                }
            }

            equity.record(self.broker.equity());
        }

        report.final_equity = equity.last();
        report.equity_peak = equity.peak();
        report.total_return = equity.total_return();
        report.max_drawdown = equity.max_drawdown();
        report.final_state = self.trader.state();

        info!(
            "Backtest complete: {} ticks, {} orders, final equity {}",
            report.ticks, report.orders, report.final_equity
        );
        report
    }
}
