//! Sentiment classifier adapters.

pub mod http;
pub mod lexicon;

pub use http::HttpClassifier;
pub use lexicon::LexiconClassifier;

use anyhow::Result;
use sentiment_trader_core::{ClassifierConfig, ClassifierKind, SentimentClassifier};
use std::sync::Arc;

/// Builds the classifier selected in configuration.
///
/// # Errors
/// Returns an error if the HTTP classifier cannot be constructed.
pub fn from_config(config: &ClassifierConfig) -> Result<Arc<dyn SentimentClassifier>> {
    Ok(match config.kind {
        ClassifierKind::Lexicon => Arc::new(LexiconClassifier::new()),
        ClassifierKind::Http => Arc::new(
            HttpClassifier::new(config.url.clone(), config.batch_size, config.timeout())?
                .with_api_token(config.api_token.clone()),
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_selects_kind() {
        let config = ClassifierConfig::default();
        assert_eq!(from_config(&config).unwrap().name(), "lexicon");

        let config = ClassifierConfig {
            kind: ClassifierKind::Http,
            ..ClassifierConfig::default()
        };
        assert_eq!(from_config(&config).unwrap().name(), "http");
    }

    #[test]
    fn test_from_config_rejects_zero_timeout() {
        let config = ClassifierConfig {
            kind: ClassifierKind::Http,
            timeout_secs: 0,
            ..ClassifierConfig::default()
        };
        assert!(from_config(&config).is_err());
    }
}
