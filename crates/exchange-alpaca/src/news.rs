use crate::client::{AlpacaClient, Api};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Method;
use sentiment_trader_core::{NewsArticle, NewsProvider};
use serde::Deserialize;

/// Maximum page size accepted by the news endpoint.
pub const NEWS_PAGE_LIMIT: u32 = 50;

/// Upper bound on pages fetched for one window.
const MAX_PAGES: usize = 100;

#[derive(Debug, Deserialize)]
struct NewsPage {
    #[serde(default)]
    news: Vec<NewsItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsItem {
    headline: String,
    #[serde(default)]
    summary: String,
    created_at: Option<DateTime<Utc>>,
}

impl From<NewsItem> for NewsArticle {
    fn from(item: NewsItem) -> Self {
        let article = Self::new(item.headline, item.summary);
        match item.created_at {
            Some(at) => article.with_published_at(at),
            None => article,
        }
    }
}

#[async_trait]
impl NewsProvider for AlpacaClient {
    /// Fetches every article for `symbol` published between the start of
    /// `start` and the end of `end`, following pagination.
    async fn get_news(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<NewsArticle>> {
        let start_param = format!("{start}T00:00:00Z");
        let end_param = format!("{end}T23:59:59Z");
        let limit = NEWS_PAGE_LIMIT.to_string();

        let mut articles = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let mut query = vec![
                ("symbols", symbol),
                ("start", start_param.as_str()),
                ("end", end_param.as_str()),
                ("limit", limit.as_str()),
                ("sort", "desc"),
            ];
            if let Some(token) = page_token.as_deref() {
                query.push(("page_token", token));
            }

            let request = self.request(Method::GET, Api::Data, "/v1beta1/news").query(&query);
            let page: NewsPage = self.send_json(request).await?;
            articles.extend(page.news.into_iter().map(NewsArticle::from));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => {
                    tracing::debug!("Fetched {} news articles for {} ({} to {})", articles.len(), symbol, start, end);
                    return Ok(articles);
                }
            }
        }

        tracing::warn!("News for {} exceeded {} pages, truncating", symbol, MAX_PAGES);
        Ok(articles)
    }
}
