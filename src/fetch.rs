use crate::error::FetchError;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use std::time::Duration;
use tracing::debug;

/// A downloaded page. `url` is the final URL after redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    /// The site redirects suspected bots to a captcha page.
    pub fn is_challenge(&self) -> bool {
        self.url.to_lowercase().contains("captcha")
    }

    /// Turns challenge pages and non-2xx responses into errors.
    pub fn into_checked(self) -> Result<Self, FetchError> {
        if self.is_challenge() {
            return Err(FetchError::Challenge { url: self.url });
        }
        if !(200..300).contains(&self.status) {
            return Err(FetchError::Status {
                url: self.url,
                status: self.status,
            });
        }
        Ok(self)
    }
}

/// Issues a single GET request. Implementations must not retry on their own.
pub trait PageFetcher {
    fn fetch(&self, url: &str, user_agent: &str) -> Result<FetchedPage, FetchError>;
}

/// Blocking HTTP fetcher sharing one connection pool and cookie jar for the
/// whole run.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str, user_agent: &str) -> Result<FetchedPage, FetchError> {
        debug!(url, user_agent, "fetching page");

        let map_err = |source: reqwest::Error| {
            if source.is_timeout() {
                FetchError::Timeout { url: url.to_string() }
            } else {
                FetchError::Network {
                    url: url.to_string(),
                    source,
                }
            }
        };

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .send()
            .map_err(map_err)?;

        let final_url = response.url().to_string();
        let status = response.status().as_u16();
        let body = response.text().map_err(map_err)?;

        debug!(url = %final_url, status, bytes = body.len(), "page downloaded");

        Ok(FetchedPage {
            url: final_url,
            status,
            body,
        })
    }
}
