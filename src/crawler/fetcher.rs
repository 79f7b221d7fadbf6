//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building one shared HTTP client with the configured user agent and timeout
//! - GET requests returning the body text and the URL it was served from
//! - Error classification into [`FetchError`]
//!
//! There is no retry: a failed fetch is reported once and the task is dropped.

use crate::config::FetcherConfig;
use crate::FetchError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// A successfully retrieved page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Where the body came from after following redirects; links on the
    /// page resolve against this, not the requested URL
    pub final_url: Url,

    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use catalog_crawler::config::FetcherConfig;
/// use catalog_crawler::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// GETs `url` and returns the body text of a 2xx response
///
/// Redirects are followed; [`FetchedPage::final_url`] records the last hop.
///
/// # Error Classification
///
/// | Condition | Result |
/// |-----------|--------|
/// | Non-2xx status | `FetchError::Status` |
/// | Timeout | `FetchError::Timeout` |
/// | Connection refused / DNS / TLS | `FetchError::Connect` |
/// | Body could not be decoded | `FetchError::Body` |
/// | Anything else | `FetchError::Http` |
pub async fn fetch_url(client: &Client, url: &str) -> Result<FetchedPage, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let final_url = response.url().clone();
    if final_url.as_str() != url {
        tracing::debug!("{} redirected to {}", url, final_url);
    }

    let body = response.text().await.map_err(|e| FetchError::Body {
        url: url.to_string(),
        source: e,
    })?;

    Ok(FetchedPage { final_url, body })
}

fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
