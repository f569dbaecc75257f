//! News query window and classifier input preparation.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use sentiment_trader_core::{NewsArticle, TradingError, TradingResult};

/// Inclusive date range for a news lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewsWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl NewsWindow {
    /// Window covering `days_prior` days up to and including `now`.
    ///
    /// # Errors
    /// Returns [`TradingError::InvalidConfig`] if the start date falls outside
    /// the representable calendar.
    pub fn ending_at(now: DateTime<Utc>, days_prior: u32) -> TradingResult<Self> {
        let start = Duration::try_days(i64::from(days_prior))
            .and_then(|lookback| now.checked_sub_signed(lookback))
            .ok_or_else(|| {
                TradingError::InvalidConfig(format!("days_prior = {days_prior} reaches past the earliest date"))
            })?;

        Ok(Self {
            start: start.date_naive(),
            end: now.date_naive(),
        })
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Turns fetched articles into classifier inputs, one text per article.
#[must_use]
pub fn article_texts(articles: &[NewsArticle]) -> Vec<String> {
    articles.iter().map(NewsArticle::text).collect()
}
