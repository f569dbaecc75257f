use anyhow::{anyhow, bail, Context, Result};
use governor::{clock::DefaultClock, state::InMemoryState, Quota, RateLimiter};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use sentiment_trader_core::AlpacaConfig;
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::sync::Arc;

const KEY_HEADER: &str = "APCA-API-KEY-ID";
const SECRET_HEADER: &str = "APCA-API-SECRET-KEY";

/// Which Alpaca host a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Api {
    /// Account, orders, positions
    Trading,
    /// Latest trades, news
    Data,
}

pub struct AlpacaClient {
    http_client: Client,
    api_url: String,
    data_url: String,
    api_key: SecretString,
    api_secret: SecretString,
    rate_limiter: Arc<RateLimiter<governor::state::direct::NotKeyed, InMemoryState, DefaultClock>>,
}

impl std::fmt::Debug for AlpacaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlpacaClient")
            .field("api_url", &self.api_url)
            .field("data_url", &self.data_url)
            .finish_non_exhaustive()
    }
}

impl AlpacaClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    /// Returns an error if `requests_per_minute` or `timeout_secs` is zero, or
    /// the HTTP client cannot be built.
    pub fn new(config: &AlpacaConfig) -> Result<Self> {
        let per_minute = NonZeroU32::new(config.requests_per_minute)
            .context("alpaca.requests_per_minute must be positive")?;
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)));
        if config.timeout_secs == 0 {
            bail!("alpaca.timeout_secs must be positive");
        }

        let http_client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            data_url: config.data_url.trim_end_matches('/').to_string(),
            api_key: SecretString::from(config.api_key.clone()),
            api_secret: SecretString::from(config.api_secret.clone()),
            rate_limiter,
        })
    }

    fn url(&self, api: Api, endpoint: &str) -> String {
        let base = match api {
            Api::Trading => &self.api_url,
            Api::Data => &self.data_url,
        };
        format!("{base}{endpoint}")
    }

    /// Builds an authenticated request.
    pub(crate) fn request(&self, method: Method, api: Api, endpoint: &str) -> RequestBuilder {
        self.http_client
            .request(method, self.url(api, endpoint))
            .header(KEY_HEADER, self.api_key.expose_secret())
            .header(SECRET_HEADER, self.api_secret.expose_secret())
            .header("Accept", "application/json")
    }

    /// Sends a request after waiting on the rate limiter.
    ///
    /// Returns the raw response; status handling is left to the caller.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response> {
        self.rate_limiter.until_ready().await;
        Ok(request.send().await?)
    }

    /// Sends a request and decodes a successful JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = check_status(self.send(request).await?).await?;
        Ok(response.json().await?)
    }

    pub async fn get<T: DeserializeOwned>(&self, api: Api, endpoint: &str) -> Result<T> {
        self.send_json(self.request(Method::GET, api, endpoint)).await
    }
}

/// Turns a non-2xx response into an error carrying status and body.
pub(crate) async fn check_status(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    Err(anyhow!("Alpaca API error {}: {}", status, text))
}

pub(crate) fn is_not_found(response: &Response) -> bool {
    response.status() == StatusCode::NOT_FOUND
}

#[cfg(test)]
pub(crate) fn test_config(base: &str) -> AlpacaConfig {
    AlpacaConfig {
        api_url: base.to_string(),
        data_url: base.to_string(),
        api_key: "key-id".to_string(),
        api_secret: "secret-key".to_string(),
        requests_per_minute: 1000,
        timeout_secs: 5,
    }
}
