//! Per-tick orchestration of the sentiment strategy.
//!
//! One call to [`SentimentTrader::on_tick`] runs a full decision cycle:
//!
//! 1. cash and last price from the account collaborator
//! 2. position sizing (a non-positive price aborts the tick)
//! 3. insufficient-cash guard (skips before any news is fetched)
//! 4. news fetch over the lookback window, classification, aggregation
//! 5. decision and, if any, execution
//!
//! Any failure before execution leaves the position state untouched, so the
//! same tick can simply be retried on the next cycle.

use crate::decision::{Decision, DecisionEngine, HoldReason};
use crate::state_store::StateStore;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sentiment_trader_core::{
    rate_to_decimal, AccountProvider, NewsProvider, OrderExecutor, OrderIntent, OrderReceipt,
    PositionSizer, PositionState, SentimentClassifier, SentimentSignals, SentimentTally,
    SizingInputs, StrategyConfig, TradingError, TradingResult,
};
use sentiment_trader_signals::{article_texts, NewsWindow, SignalAggregator};
use tracing::{debug, info, warn};

/// Why a tick ended before any news was considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    InsufficientCash { cash: Decimal, last_price: Decimal },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Skipped(SkipReason),
    Held {
        reason: HoldReason,
        signals: SentimentSignals,
        tally: SentimentTally,
    },
    Opened {
        intent: OrderIntent,
        receipt: OrderReceipt,
    },
    Flipped {
        intent: OrderIntent,
        receipt: OrderReceipt,
    },
}

pub struct SentimentTrader<A, N, C, X>
where
    A: AccountProvider,
    N: NewsProvider,
    C: SentimentClassifier,
    X: OrderExecutor,
{
    symbol: String,
    cash_at_risk: Decimal,
    days_prior: u32,
    sizer: PositionSizer,
    aggregator: SignalAggregator,
    engine: DecisionEngine,
    account: A,
    news: N,
    classifier: C,
    executor: X,
    state_store: Option<StateStore>,
}

impl<A, N, C, X> SentimentTrader<A, N, C, X>
where
    A: AccountProvider,
    N: NewsProvider,
    C: SentimentClassifier,
    X: OrderExecutor,
{
    /// Creates a trader starting flat.
    ///
    /// # Errors
    /// Returns [`TradingError::InvalidConfig`] if the configuration is out of range.
    pub fn new(
        config: &StrategyConfig,
        account: A,
        news: N,
        classifier: C,
        executor: X,
    ) -> TradingResult<Self> {
        config.validate()?;

        Ok(Self {
            symbol: config.symbol.clone(),
            cash_at_risk: rate_to_decimal("cash_at_risk", config.cash_at_risk)?,
            days_prior: config.days_prior,
            sizer: PositionSizer::new(),
            aggregator: SignalAggregator::new(config.thresholds()),
            engine: DecisionEngine::from_config(config)?,
            account,
            news,
            classifier,
            executor,
            state_store: None,
        })
    }

    /// Attaches a state store and resumes from whatever it holds.
    #[must_use]
    pub fn with_state_store(mut self, store: StateStore) -> Self {
        let state = store.load(&self.symbol);
        self.engine = DecisionEngine::with_state(self.symbol.clone(), self.engine.bracket(), state);
        self.state_store = Some(store);
        self
    }

    #[must_use]
    pub const fn state(&self) -> PositionState {
        self.engine.state()
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    #[must_use]
    pub const fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    /// Runs one decision cycle at `now`.
    ///
    /// # Errors
    /// Returns the [`TradingError`] that aborted the tick. State is unchanged on
    /// every error except a failed submission after a successful liquidation,
    /// where the engine records `Flat` to match the broker.
    pub async fn on_tick(&mut self, now: DateTime<Utc>) -> TradingResult<TickOutcome> {
        let cash = self
            .account
            .cash()
            .await
            .map_err(|e| TradingError::MarketData(format!("cash lookup: {e:#}")))?;
        let last_price = self
            .account
            .last_price(&self.symbol)
            .await
            .map_err(|e| TradingError::MarketData(format!("last price for {}: {e:#}", self.symbol)))?;

        let quantity = self.sizer.size(&SizingInputs {
            cash,
            last_price,
            cash_at_risk: self.cash_at_risk,
        })?;

        if cash < last_price {
            info!(symbol = %self.symbol, %cash, %last_price, "Insufficient cash, skipping tick");
            return Ok(TickOutcome::Skipped(SkipReason::InsufficientCash { cash, last_price }));
        }

        let window = NewsWindow::ending_at(now, self.days_prior)?;
        let articles = self
            .news
            .get_news(&self.symbol, window.start, window.end)
            .await
            .map_err(|e| TradingError::News(format!("{e:#}")))?;
        let texts = article_texts(&articles);
        debug!("Fetched {} articles for {} ({} to {})", texts.len(), self.symbol, window.start, window.end);

        let results = if texts.is_empty() {
            Vec::new()
        } else {
            self.classifier
                .classify(&texts)
                .await
                .map_err(|e| TradingError::Classifier(format!("{}: {e:#}", self.classifier.name())))?
        };
        if results.len() != texts.len() {
            return Err(TradingError::Classifier(format!(
                "{} returned {} results for {} texts",
                self.classifier.name(),
                results.len(),
                texts.len()
            )));
        }

        let tally = self.aggregator.tally(&results);
        let signals = self.aggregator.signals_for(&tally);
        if tally.total() == 0 {
            info!(symbol = %self.symbol, "No news in window, no directional signal");
        }
        debug!(
            positive = tally.positive,
            negative = tally.negative,
            neutral = tally.neutral,
            positive_met = signals.positive_met,
            negative_met = signals.negative_met,
            "Aggregated sentiment"
        );

        match self.engine.decide(signals, quantity, cash, last_price) {
            Decision::Hold(reason) => {
                if reason == HoldReason::ZeroQuantity {
                    warn!(symbol = %self.symbol, %cash, %last_price, "Signal met but sized to zero shares");
                } else if reason == HoldReason::UnpriceableBracket {
                    warn!(symbol = %self.symbol, %last_price, "Signal met but a bracket exit rounds to zero");
                } else {
                    info!(symbol = %self.symbol, state = %self.engine.state(), "Holding: {}", reason);
                }
                Ok(TickOutcome::Held {
                    reason,
                    signals,
                    tally,
                })
            }
            Decision::Open { intent, next } => {
                let receipt = self.submit(&intent).await?;
                self.transition(next);
                Ok(TickOutcome::Opened { intent, receipt })
            }
            Decision::Flip { intent, next } => {
                self.executor
                    .liquidate_all(&self.symbol)
                    .await
                    .map_err(|e| TradingError::Liquidation(format!("{e:#}")))?;
                info!(symbol = %self.symbol, from = %self.engine.state(), "Liquidated before flip");

                match self.submit(&intent).await {
                    Ok(receipt) => {
                        self.transition(next);
                        Ok(TickOutcome::Flipped { intent, receipt })
                    }
                    Err(e) => {
                        self.transition(PositionState::Flat);
                        Err(e)
                    }
                }
            }
        }
    }

    async fn submit(&self, intent: &OrderIntent) -> TradingResult<OrderReceipt> {
        let receipt = self
            .executor
            .submit_order(intent)
            .await
            .map_err(|e| TradingError::OrderSubmission(format!("{e:#}")))?;

        info!(
            symbol = %intent.symbol,
            side = %intent.side,
            quantity = intent.quantity,
            take_profit = %intent.take_profit_price,
            stop_loss = %intent.stop_loss_price,
            order_id = %receipt.order_id,
            "Bracket order submitted"
        );
        Ok(receipt)
    }

    fn transition(&mut self, next: PositionState) {
        self.engine.commit(next);
        if let Some(store) = &self.state_store {
            if let Err(e) = store.save(&self.symbol, next) {
                warn!("Failed to persist {} state for {}: {}", next, self.symbol, e);
            }
        }
    }
}
