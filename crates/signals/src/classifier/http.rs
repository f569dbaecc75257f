//! Remote text-classification client.
//!
//! Speaks the Hugging Face inference API shape used by FinBERT deployments:
//! `POST {"inputs": [...]}` returns one entry per input, each either a single
//! `{label, score}` object or a list of them. The highest score wins.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use governor::{clock::DefaultClock, state::direct::NotKeyed, state::InMemoryState, Quota, RateLimiter};
use sentiment_trader_core::{SentimentClassifier, SentimentLabel, SentimentResult};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

const REQUESTS_PER_SECOND: u32 = 5;

#[derive(Debug, Clone, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum InferenceEntry {
    Ranked(Vec<LabelScore>),
    Single(LabelScore),
}

impl InferenceEntry {
    fn best(self) -> Option<LabelScore> {
        match self {
            Self::Single(entry) => Some(entry),
            Self::Ranked(entries) => entries
                .into_iter()
                .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal)),
        }
    }
}

pub struct HttpClassifier {
    http: reqwest::Client,
    url: String,
    api_token: Option<String>,
    batch_size: usize,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl HttpClassifier {
    /// Creates a client posting to `url` in chunks of `batch_size` texts.
    ///
    /// # Errors
    /// Returns an error if `timeout` is zero or the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, batch_size: usize, timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            bail!("classifier.timeout_secs must be positive");
        }
        let quota = Quota::per_second(NonZeroU32::new(REQUESTS_PER_SECOND).unwrap_or(NonZeroU32::MIN));
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            url: url.into(),
            api_token: None,
            batch_size: batch_size.max(1),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Sets a bearer token for the endpoint.
    #[must_use]
    pub fn with_api_token(mut self, token: Option<String>) -> Self {
        self.api_token = token.filter(|t| !t.is_empty());
        self
    }

    async fn classify_chunk(&self, chunk: &[String]) -> Result<Vec<SentimentResult>> {
        self.rate_limiter.until_ready().await;

        let mut request = self
            .http
            .post(&self.url)
            .header("Accept", "application/json")
            .json(&serde_json::json!({ "inputs": chunk }));
        if let Some(ref token) = self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Inference API error {}: {}", status, text));
        }

        let entries: Vec<InferenceEntry> = response.json().await?;
        if entries.len() != chunk.len() {
            return Err(anyhow!(
                "Inference API returned {} results for {} inputs",
                entries.len(),
                chunk.len()
            ));
        }

        entries
            .into_iter()
            .map(|entry| -> Result<SentimentResult> {
                let best = entry
                    .best()
                    .ok_or_else(|| anyhow!("Inference API returned an empty label list"))?;
                let label: SentimentLabel = best.label.parse()?;
                Ok(SentimentResult::new(label, best.score)?)
            })
            .collect()
    }
}

#[async_trait]
impl SentimentClassifier for HttpClassifier {
    async fn classify(&self, texts: &[String]) -> Result<Vec<SentimentResult>> {
        let mut results = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            tracing::debug!("Classifying {} texts via {}", chunk.len(), self.url);
            results.extend(self.classify_chunk(chunk).await?);
        }
        Ok(results)
    }

    fn name(&self) -> &str {
        "http"
    }
}
