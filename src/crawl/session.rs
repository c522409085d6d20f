// src/crawl/session.rs
// =============================================================================
// A browser-like HTTP session for one site.
//
// Every hostname gets its own Session: one reqwest client with its own cookie
// jar, so cookies set by one page are sent with every later request to that
// site, just like a browser tab wandering around.
//
// Politeness and resilience live here too:
// - a fixed timeout on every request
// - retries (via tokio-retry) for timeouts and configured status codes
// - a pause after every request
// =============================================================================

use log::debug;
use reqwest::Client;
use reqwest_cookie_store::CookieStoreMutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::strategy::FixedInterval;
use tokio_retry::RetryIf;
use url::Url;

use crate::config::CrawlConfig;
use crate::error::FetchError;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The URL we asked for
    pub url: String,
    /// Where we ended up after redirects
    pub final_url: Url,
    pub body: String,
}

pub struct Session {
    client: Client,
    jar: Arc<CookieStoreMutex>,
    retryable_status_codes: Vec<u16>,
    retry_limit: usize,
    retry_delay: Duration,
    request_delay: Duration,
}

impl Session {
    pub fn new(config: &CrawlConfig) -> Result<Self, reqwest::Error> {
        let jar = Arc::new(CookieStoreMutex::default());
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .cookie_provider(Arc::clone(&jar))
            .build()?;

        Ok(Session {
            client,
            jar,
            retryable_status_codes: config.retryable_status_codes.clone(),
            retry_limit: config.retry_limit,
            retry_delay: config.retry_delay,
            request_delay: config.request_delay,
        })
    }

    /// GET a page, retrying transient failures; non-2xx is an error
    pub async fn get(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let strategy = FixedInterval::new(self.retry_delay).take(self.retry_limit);
        let result = RetryIf::spawn(
            strategy,
            || self.get_once(url),
            |e: &FetchError| {
                let retry = e.is_retryable(&self.retryable_status_codes);
                if retry {
                    debug!("Retrying after: {}", e);
                }
                retry
            },
        )
        .await;

        self.pause().await;
        result
    }

    /// POST a form and return the response text whatever its status
    pub async fn post_form(&self, url: &str, form: &BTreeMap<String, String>) -> Result<String, FetchError> {
        debug!("POST {}", url);
        let result = self
            .send_form(url, form)
            .await
            .map_err(|e| FetchError::from_reqwest(url, e));

        self.pause().await;
        result
    }

    /// Every live `name=value` pair in the jar, whatever domain or path set it
    pub fn cookies(&self) -> Vec<String> {
        let Ok(store) = self.jar.lock() else {
            return Vec::new();
        };

        let mut cookies: Vec<String> = store
            .iter_unexpired()
            .map(|cookie| format!("{}={}", cookie.name(), cookie.value()))
            .collect();
        cookies.sort();
        cookies
    }

    async fn get_once(&self, url: &str) -> Result<FetchedPage, FetchError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        // text() decodes using the charset from Content-Type, UTF-8 otherwise
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        Ok(FetchedPage {
            url: url.to_string(),
            final_url,
            body,
        })
    }

    async fn send_form(&self, url: &str, form: &BTreeMap<String, String>) -> Result<String, reqwest::Error> {
        self.client.post(url).form(form).send().await?.text().await
    }

    async fn pause(&self) {
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }
    }
}
