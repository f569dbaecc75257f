use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sentiment_trader_core::{NewsArticle, NewsProvider};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

/// One OHLCV bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// Chronological bars for a single symbol.
#[derive(Debug, Clone, Default)]
pub struct HistoricalBars {
    bars: Vec<Bar>,
}

impl HistoricalBars {
    /// Loads bars for `symbol` from a CSV file.
    ///
    /// Expected columns: `timestamp,symbol,open,high,low,close,volume`.
    /// Rows for other symbols are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The CSV file cannot be opened
    /// - A row has fewer than seven columns
    /// - Timestamp parsing fails
    /// - Decimal parsing fails for OHLCV values
    pub fn from_csv(path: impl AsRef<Path>, symbol: &str) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("opening price file {}", path.display()))?;
        let mut bars = Vec::new();

        for (row, result) in reader.records().enumerate() {
            let record = result?;
            if record.len() < 7 {
                anyhow::bail!("row {}: expected 7 columns, found {}", row + 1, record.len());
            }
            if &record[1] != symbol {
                continue;
            }

            let parse = |i: usize| {
                Decimal::from_str(record[i].trim()).with_context(|| format!("row {}: column {}", row + 1, i))
            };
            bars.push(Bar {
                timestamp: record[0]
                    .parse()
                    .with_context(|| format!("row {}: timestamp {:?}", row + 1, &record[0]))?,
                symbol: record[1].to_string(),
                open: parse(2)?,
                high: parse(3)?,
                low: parse(4)?,
                close: parse(5)?,
                volume: parse(6)?,
            });
        }

        Ok(Self::from_bars(bars))
    }

    /// Builds from bars in any order.
    #[must_use]
    pub fn from_bars(mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        Self { bars }
    }

    #[must_use]
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct ArchivedArticle {
    #[serde(default)]
    symbols: Vec<String>,
    headline: String,
    #[serde(default)]
    summary: String,
    created_at: DateTime<Utc>,
}

/// Offline news source over a JSON archive.
#[derive(Debug, Default)]
pub struct NewsArchive {
    articles: Vec<ArchivedArticle>,
}

impl NewsArchive {
    /// Loads an array of `{symbols, headline, summary, created_at}` records.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading news archive {}", path.display()))?;
        Self::from_json_str(&raw)
    }

    /// # Errors
    /// Returns an error if `raw` is not a valid archive.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let mut articles: Vec<ArchivedArticle> = serde_json::from_str(raw)?;
        articles.sort_by_key(|a| a.created_at);
        Ok(Self { articles })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.articles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

#[async_trait]
impl NewsProvider for NewsArchive {
    async fn get_news(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<NewsArticle>> {
        Ok(self
            .articles
            .iter()
            .filter(|a| a.symbols.iter().any(|s| s == symbol))
            .filter(|a| {
                let day = a.created_at.date_naive();
                day >= start && day <= end
            })
            .map(|a| NewsArticle::new(a.headline.clone(), a.summary.clone()).with_published_at(a.created_at))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_from_csv_sorts_and_filters() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timestamp,symbol,open,high,low,close,volume").unwrap();
        writeln!(file, "2020-01-03T21:00:00Z,SPY,101,102,100,101.5,1000").unwrap();
        writeln!(file, "2020-01-02T21:00:00Z,SPY,100,101,99,100.5,1200").unwrap();
        writeln!(file, "2020-01-02T21:00:00Z,QQQ,200,201,199,200.5,900").unwrap();
        file.flush().unwrap();

        let bars = HistoricalBars::from_csv(file.path(), "SPY").unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars.bars()[0].close, dec!(100.5));
        assert_eq!(bars.bars()[1].close, dec!(101.5));
        assert!(bars.bars().iter().all(|b| b.symbol == "SPY"));
    }

    #[test]
    fn test_from_csv_rejects_bad_price() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timestamp,symbol,open,high,low,close,volume").unwrap();
        writeln!(file, "2020-01-02T21:00:00Z,SPY,100,101,99,abc,1200").unwrap();
        file.flush().unwrap();

        assert!(HistoricalBars::from_csv(file.path(), "SPY").is_err());
    }

    #[test]
    fn test_missing_csv() {
        assert!(HistoricalBars::from_csv("/nonexistent/prices.csv", "SPY").is_err());
    }

    #[tokio::test]
    async fn test_news_archive_window_is_inclusive() {
        let archive = NewsArchive::from_json_str(
            r#"[
                {"symbols": ["SPY"], "headline": "before", "summary": "", "created_at": "2020-01-04T23:59:59Z"},
                {"symbols": ["SPY"], "headline": "first day", "summary": "", "created_at": "2020-01-05T00:00:00Z"},
                {"symbols": ["SPY"], "headline": "last day", "summary": "s", "created_at": "2020-01-10T23:00:00Z"},
                {"symbols": ["SPY"], "headline": "after", "summary": "", "created_at": "2020-01-11T00:00:00Z"},
                {"symbols": ["QQQ"], "headline": "other symbol", "summary": "", "created_at": "2020-01-07T12:00:00Z"}
            ]"#,
        )
        .unwrap();

        let news = archive.get_news("SPY", date(2020, 1, 5), date(2020, 1, 10)).await.unwrap();
        let headlines: Vec<_> = news.iter().map(|a| a.headline.as_str()).collect();

        assert_eq!(headlines, vec!["first day", "last day"]);
        assert_eq!(news[1].summary, "s");
    }

    #[test]
    fn test_news_archive_invalid_json() {
        assert!(NewsArchive::from_json_str("{ not an array").is_err());
    }
}
