//! Sentiment batch aggregation.
//!
//! Reduces a batch of per-article classifications to two booleans: whether the
//! positive side and whether the negative side reached the configured share of
//! the batch.
//!
//! ## Gates
//!
//! - **Score gate**: a positive/negative label only counts toward its side when
//!   its confidence is at least `threshold_score`. Labels that fail the gate are
//!   counted as neutral, so they still dilute the ratios.
//! - **Ratio gate**: a side is met when `side_count / total >= threshold_ratio`.
//!
//! An empty batch fails closed: both sides are unmet.

use sentiment_trader_core::{
    SentimentLabel, SentimentResult, SentimentSignals, SentimentTally, ThresholdConfig,
};

// ============================================
// Aggregator
// ============================================

/// Pure, deterministic reducer over a sentiment batch.
#[derive(Debug, Clone, Copy)]
pub struct SignalAggregator {
    config: ThresholdConfig,
}

impl SignalAggregator {
    #[must_use]
    pub const fn new(config: ThresholdConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> ThresholdConfig {
        self.config
    }

    /// Partitions the batch into positive, negative and neutral counts.
    #[must_use]
    pub fn tally(&self, batch: &[SentimentResult]) -> SentimentTally {
        batch
            .iter()
            .fold(SentimentTally::default(), |mut tally, result| {
                let passes = result.score >= self.config.threshold_score;
                match result.label {
                    SentimentLabel::Positive if passes => tally.positive += 1,
                    SentimentLabel::Negative if passes => tally.negative += 1,
                    _ => tally.neutral += 1,
                }
                tally
            })
    }

    /// Evaluates the ratio gate on an already computed tally.
    #[must_use]
    pub fn signals_for(&self, tally: &SentimentTally) -> SentimentSignals {
        match (tally.positive_ratio(), tally.negative_ratio()) {
            (Some(positive_ratio), Some(negative_ratio)) => SentimentSignals::new(
                positive_ratio >= self.config.threshold_ratio,
                negative_ratio >= self.config.threshold_ratio,
            ),
            _ => SentimentSignals::none(),
        }
    }

    /// Reduces a batch to `(positive_met, negative_met)`.
    ///
    /// Both sides can be met at once when `threshold_ratio <= 0.5`; resolving
    /// that is the decision engine's job.
    #[must_use]
    pub fn evaluate(&self, batch: &[SentimentResult]) -> SentimentSignals {
        let tally = self.tally(batch);
        if tally.total() == 0 {
            tracing::info!("Empty sentiment batch, no directional signal");
        }
        self.signals_for(&tally)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(label: SentimentLabel, score: f64) -> SentimentResult {
        SentimentResult::new(label, score).unwrap()
    }

    fn aggregator(threshold_score: f64, threshold_ratio: f64) -> SignalAggregator {
        SignalAggregator::new(ThresholdConfig::new(threshold_score, threshold_ratio).unwrap())
    }

    fn mixed_batch() -> Vec<SentimentResult> {
        vec![
            result(SentimentLabel::Positive, 0.95),
            result(SentimentLabel::Positive, 0.92),
            result(SentimentLabel::Positive, 0.60), // fails score gate
            result(SentimentLabel::Negative, 0.97),
            result(SentimentLabel::Neutral, 0.99),
        ]
    }

    // ========== Tally Tests ==========

    #[test]
    fn test_tally_applies_score_gate() {
        let tally = aggregator(0.9, 0.5).tally(&mixed_batch());

        assert_eq!(tally.positive, 2);
        assert_eq!(tally.negative, 1);
        assert_eq!(tally.neutral, 2);
        assert_eq!(tally.total(), 5);
    }

    #[test]
    fn test_score_exactly_at_threshold_counts() {
        let tally = aggregator(0.9, 0.5).tally(&[result(SentimentLabel::Negative, 0.9)]);
        assert_eq!(tally.negative, 1);
    }

    #[test]
    fn test_neutral_label_never_counts_toward_a_side() {
        let batch = vec![result(SentimentLabel::Neutral, 1.0); 4];
        let tally = aggregator(0.0, 0.0).tally(&batch);

        assert_eq!(tally.positive, 0);
        assert_eq!(tally.negative, 0);
        assert_eq!(tally.neutral, 4);
    }

    // ========== Evaluate Tests ==========

    #[test]
    fn test_empty_batch_fails_closed() {
        for ratio in [0.0, 0.3, 0.5, 1.0] {
            let signals = aggregator(0.0, ratio).evaluate(&[]);
            assert_eq!(signals, SentimentSignals::none(), "ratio {ratio}");
        }
    }

    #[test]
    fn test_all_below_score_threshold_is_no_signal() {
        let batch = vec![
            result(SentimentLabel::Positive, 0.89),
            result(SentimentLabel::Positive, 0.5),
            result(SentimentLabel::Negative, 0.1),
            result(SentimentLabel::Neutral, 0.3),
        ];

        let signals = aggregator(0.9, 0.1).evaluate(&batch);
        assert_eq!(signals, SentimentSignals::none());
    }

    #[test]
    fn test_positive_majority() {
        let batch = vec![
            result(SentimentLabel::Positive, 0.95),
            result(SentimentLabel::Positive, 0.95),
            result(SentimentLabel::Positive, 0.95),
            result(SentimentLabel::Negative, 0.95),
            result(SentimentLabel::Neutral, 0.95),
        ];

        let signals = aggregator(0.9, 0.5).evaluate(&batch);
        assert!(signals.positive_met);
        assert!(!signals.negative_met);
    }

    #[test]
    fn test_negative_majority() {
        let batch = vec![
            result(SentimentLabel::Negative, 0.99),
            result(SentimentLabel::Negative, 0.91),
            result(SentimentLabel::Positive, 0.99),
        ];

        let signals = aggregator(0.9, 0.6).evaluate(&batch);
        assert!(!signals.positive_met);
        assert!(signals.negative_met);
    }

    #[test]
    fn test_ratio_exactly_at_threshold_is_met() {
        // 1 of 2 = 0.5
        let batch = vec![
            result(SentimentLabel::Positive, 0.95),
            result(SentimentLabel::Neutral, 0.95),
        ];
        assert!(aggregator(0.9, 0.5).evaluate(&batch).positive_met);
    }

    #[test]
    fn test_both_sides_met_with_low_ratio() {
        let batch = vec![
            result(SentimentLabel::Positive, 0.95),
            result(SentimentLabel::Negative, 0.95),
        ];

        let signals = aggregator(0.9, 0.5).evaluate(&batch);
        assert!(signals.positive_met);
        assert!(signals.negative_met);
    }

    #[test]
    fn test_failed_score_gate_dilutes_ratio() {
        // 2 strong positives out of 5 → 0.4 < 0.5
        let signals = aggregator(0.9, 0.5).evaluate(&mixed_batch());
        assert!(!signals.positive_met);

        // relaxing the score gate lifts the third positive in → 0.6
        let signals = aggregator(0.5, 0.5).evaluate(&mixed_batch());
        assert!(signals.positive_met);
    }

    #[test]
    fn test_ratio_threshold_monotonicity() {
        let batch = mixed_batch();
        let ratios: Vec<f64> = (0..=20).map(|i| f64::from(i) * 0.05).collect();

        let mut previous = aggregator(0.9, ratios[0]).evaluate(&batch);
        for ratio in ratios.iter().skip(1) {
            let current = aggregator(0.9, *ratio).evaluate(&batch);
            assert!(
                !(current.positive_met && !previous.positive_met),
                "positive flipped to true at ratio {ratio}"
            );
            assert!(
                !(current.negative_met && !previous.negative_met),
                "negative flipped to true at ratio {ratio}"
            );
            previous = current;
        }
    }

    #[test]
    fn test_order_irrelevant() {
        let batch = mixed_batch();
        let mut reversed = batch.clone();
        reversed.reverse();

        let agg = aggregator(0.5, 0.5);
        assert_eq!(agg.evaluate(&batch), agg.evaluate(&reversed));
    }
}
