//! Google News redirect resolution.
//!
//! Links handed out by Google News (`https://news.google.com/rss/articles/<token>`)
//! do not redirect with a plain `Location` header. The destination is
//! recovered in two calls:
//!
//! 1. **Parameters**: GET the article page and read the signature and
//!    timestamp off the `c-wiz > div[jscontroller]` element. A transport
//!    failure on `/articles/<token>` is retried once on `/rss/articles/<token>`.
//! 2. **Exchange**: POST the token, timestamp and signature to the
//!    `batchexecute` RPC endpoint and read the destination URL out of the reply.
//!
//! Every failure comes back as a [`DecodeError`]; nothing here panics or
//! aborts a batch. Callers fall back to the original URL.

mod classify;
mod errors;
mod protocol;

pub use classify::classify;
pub use errors::DecodeError;
pub use protocol::{exchange_body, parse_decoding_params, parse_exchange_response};

use crate::models::DecodingParams;
use crate::utils::BROWSER_USER_AGENT;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=UTF-8";

/// Anything that can turn an aggregator token into a destination URL.
pub trait ResolveToken {
    async fn resolve_token(&self, token: &str) -> Result<String, DecodeError>;
}

/// Classify `url` and, when it is an aggregator link, resolve it.
///
/// Non-aggregator URLs come back as [`DecodeError::Classification`].
pub async fn resolve_url<R>(resolver: &R, url: &str) -> Result<String, DecodeError>
where
    R: ResolveToken,
{
    let token = classify(url)?;
    resolver.resolve_token(&token).await
}

/// Where the three protocol endpoints live.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::with_base("https://news.google.com")
    }
}

impl Endpoints {
    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn article(&self, token: &str) -> String {
        format!("{}/articles/{}", self.base, token)
    }

    pub fn rss_article(&self, token: &str) -> String {
        format!("{}/rss/articles/{}", self.base, token)
    }

    pub fn batch_execute(&self) -> String {
        format!("{}/_/DotsSplashUi/data/batchexecute", self.base)
    }
}

/// HTTP implementation of the two-step Google News decoding protocol.
#[derive(Debug, Clone)]
pub struct GoogleNewsResolver {
    client: Client,
    endpoints: Endpoints,
    /// Fixed pause between the parameter fetch and the exchange.
    interval: Option<Duration>,
}

impl GoogleNewsResolver {
    pub fn new(client: Client, endpoints: Endpoints) -> Self {
        Self {
            client,
            endpoints,
            interval: None,
        }
    }

    pub fn with_interval(mut self, interval: Option<Duration>) -> Self {
        self.interval = interval;
        self
    }

    /// Fetch the signed parameters for `token`, falling back to the RSS page
    /// only when the primary page could not be fetched at all.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_decoding_params(&self, token: &str) -> Result<DecodingParams, DecodeError> {
        let primary = self.endpoints.article(token);
        match self.params_from(&primary, token).await {
            Err(e) if e.allows_fallback() => {
                warn!(error = %e, "Primary parameter fetch failed; trying RSS endpoint");
                let rss = self.endpoints.rss_article(token);
                self.params_from(&rss, token).await
            }
            other => other,
        }
    }

    async fn params_from(&self, endpoint: &str, token: &str) -> Result<DecodingParams, DecodeError> {
        let html = self
            .client
            .get(endpoint)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| DecodeError::transport(endpoint, e))?
            .text()
            .await
            .map_err(|e| DecodeError::transport(endpoint, e))?;

        parse_decoding_params(&html, token, endpoint)
    }

    /// Trade signed parameters for the destination URL.
    #[instrument(level = "debug", skip_all, fields(token = %params.token))]
    pub async fn decode_url(&self, params: &DecodingParams) -> Result<String, DecodeError> {
        let endpoint = self.endpoints.batch_execute();
        let body = exchange_body(params)?;

        let text = self
            .client
            .post(&endpoint)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .body(body)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| DecodeError::transport(&endpoint, e))?
            .text()
            .await
            .map_err(|e| DecodeError::transport(&endpoint, e))?;

        parse_exchange_response(&text)
    }
}

impl ResolveToken for GoogleNewsResolver {
    #[instrument(level = "info", skip(self))]
    async fn resolve_token(&self, token: &str) -> Result<String, DecodeError> {
        let params = self.fetch_decoding_params(token).await?;
        debug!(timestamp = %params.timestamp, "Fetched decoding params");

        if let Some(interval) = self.interval {
            sleep(interval).await;
        }

        let destination = self.decode_url(&params).await?;
        info!(%destination, "Resolved google news link");
        Ok(destination)
    }
}
