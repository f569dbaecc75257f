//! Offline keyword classifier.
//!
//! Scores text by counting finance-specific positive and negative terms.
//! Deterministic and offline, so it is the default for replays.

use anyhow::Result;
use async_trait::async_trait;
use sentiment_trader_core::{SentimentClassifier, SentimentLabel, SentimentResult};
use std::collections::HashSet;

const POSITIVE_TERMS: &[&str] = &[
    "beat", "beats", "boost", "boosted", "bullish", "climb", "climbs", "gain", "gains",
    "growth", "high", "higher", "jump", "jumps", "outperform", "profit", "profits", "rally",
    "rallies", "record", "rebound", "rise", "rises", "soar", "soars", "strong", "surge",
    "surges", "upgrade", "upgraded", "win",
];

const NEGATIVE_TERMS: &[&str] = &[
    "bearish", "collapse", "crash", "cut", "cuts", "decline", "declines", "default",
    "downgrade", "downgraded", "drop", "drops", "fall", "falls", "fear", "fears", "fraud",
    "lawsuit", "loss", "losses", "lower", "miss", "misses", "plunge", "plunges", "recession",
    "selloff", "slump", "tumble", "tumbles", "weak", "worst",
];

#[derive(Debug, Clone)]
pub struct LexiconClassifier {
    positive: HashSet<String>,
    negative: HashSet<String>,
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconClassifier {
    /// Creates a classifier with the built-in finance term lists.
    #[must_use]
    pub fn new() -> Self {
        Self::with_terms(POSITIVE_TERMS, NEGATIVE_TERMS)
    }

    #[must_use]
    pub fn with_terms(positive: &[&str], negative: &[&str]) -> Self {
        Self {
            positive: positive.iter().map(|t| t.to_lowercase()).collect(),
            negative: negative.iter().map(|t| t.to_lowercase()).collect(),
        }
    }

    /// Classifies a single text.
    ///
    /// No hits → neutral with score 1.0; a tie → neutral with score 0.5;
    /// otherwise the majority side with score `majority / (positive + negative)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn classify_text(&self, text: &str) -> SentimentResult {
        let (mut pos, mut neg) = (0usize, 0usize);
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let word = word.to_lowercase();
            if self.positive.contains(&word) {
                pos += 1;
            } else if self.negative.contains(&word) {
                neg += 1;
            }
        }

        let hits = pos + neg;
        let (label, score) = match pos.cmp(&neg) {
            _ if hits == 0 => (SentimentLabel::Neutral, 1.0),
            std::cmp::Ordering::Equal => (SentimentLabel::Neutral, 0.5),
            std::cmp::Ordering::Greater => (SentimentLabel::Positive, pos as f64 / hits as f64),
            std::cmp::Ordering::Less => (SentimentLabel::Negative, neg as f64 / hits as f64),
        };

        SentimentResult { label, score }
    }
}

#[async_trait]
impl SentimentClassifier for LexiconClassifier {
    async fn classify(&self, texts: &[String]) -> Result<Vec<SentimentResult>> {
        let results: Vec<SentimentResult> = texts.iter().map(|t| self.classify_text(t)).collect();
        for (text, result) in texts.iter().zip(&results) {
            tracing::debug!(label = %result.label, score = result.score, "Classified: {}", text);
        }
        Ok(results)
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_text() {
        let result = LexiconClassifier::new().classify_text("Shares surge to record high after earnings beat");
        assert_eq!(result.label, SentimentLabel::Positive);
        assert!((result.score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_negative_text() {
        let result = LexiconClassifier::new().classify_text("Stocks plunge as recession fears grow; strong dollar");
        // plunge, recession, fears vs strong
        assert_eq!(result.label, SentimentLabel::Negative);
        assert!((result.score - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_no_hits_is_neutral() {
        let result = LexiconClassifier::new().classify_text("The committee meets on Tuesday.");
        assert_eq!(result.label, SentimentLabel::Neutral);
        assert!((result.score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tie_is_neutral() {
        let result = LexiconClassifier::new().classify_text("Gains in tech, losses in energy");
        assert_eq!(result.label, SentimentLabel::Neutral);
        assert!((result.score - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_matching_is_word_level_and_case_insensitive() {
        let classifier = LexiconClassifier::with_terms(&["Up"], &["down"]);
        assert_eq!(classifier.classify_text("UP!").label, SentimentLabel::Positive);
        // "update" must not match "up"
        assert_eq!(classifier.classify_text("update").label, SentimentLabel::Neutral);
    }

    #[tokio::test]
    async fn test_classify_batch_preserves_order() {
        let texts = vec![
            "Rally continues".to_string(),
            "Market crash".to_string(),
            "Quiet session".to_string(),
        ];

        let results = LexiconClassifier::new().classify(&texts).await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].label, SentimentLabel::Positive);
        assert_eq!(results[1].label, SentimentLabel::Negative);
        assert_eq!(results[2].label, SentimentLabel::Neutral);
    }
}
