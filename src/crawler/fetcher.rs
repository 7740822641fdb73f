//! Fetcher contract and its HTTP implementation
//!
//! The traversal engine only sees the [`Fetcher`] trait. [`HttpFetcher`] is
//! the production transport and owns everything the engine deliberately
//! knows nothing about:
//! - Building the HTTP client with user agent and default headers
//! - robots.txt compliance
//! - Adaptive per-domain throttling
//! - Retry logic for transient failures
//! - Error classification into HTTP statuses and transport failures
//! - Anchor extraction from HTML bodies

use crate::config::{Config, RetryConfig};
use crate::crawler::parser::{parse_html, ParsedPage};
use crate::crawler::throttle::Throttle;
use crate::output::{LinkStatus, TransportErrorKind};
use crate::robots::RobotsCache;
use crate::url::extract_domain;
use crate::CrawlError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client};
use std::time::{Duration, Instant};
use url::Url;

/// Accept header sent with every page request
pub const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Header carrying the bot name, so site operators can filter checker traffic
pub const BOT_NAME_HEADER: &str = "x-bot-name";

/// Statuses worth another attempt
const RETRY_STATUSES: &[u16] = &[408, 429, 500, 502, 503, 504, 522, 524];

/// Per-request headers chosen by the engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHeaders {
    /// Accept-Language for this request; the client default applies if absent
    pub accept_language: Option<String>,
}

impl RequestHeaders {
    pub fn with_language(lang: impl Into<String>) -> Self {
        Self {
            accept_language: Some(lang.into()),
        }
    }
}

/// Result of a fetch operation
#[derive(Debug, Clone)]
pub enum FetchResult {
    /// A 2xx response
    Success {
        /// Final URL after redirects; relative links resolve against it
        final_url: Url,
        /// HTTP status code
        status: u16,
        /// Anchors and language of the page; empty for non-HTML content
        page: ParsedPage,
    },

    /// A non-2xx response or a transport failure
    Failure {
        /// HTTP status or transport-failure marker
        status: LinkStatus,
    },

    /// robots.txt does not allow the URL; nothing was requested
    Disallowed,
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Capability the traversal engine fetches pages through
///
/// Ordinary HTTP error codes are results, not errors: `fetch` never fails,
/// it reports them as [`FetchResult::Failure`].
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url` and extracts the anchors of a successful HTML page
    async fn fetch(&self, url: &Url, headers: &RequestHeaders) -> FetchResult;

    /// Maximum number of fetches the engine may keep in flight
    fn concurrency(&self) -> usize {
        8
    }
}

/// Outcome of a single HTTP attempt
enum Attempt {
    Done(FetchResult),
    Retryable(FetchResult),
}

/// Production fetcher backed by reqwest
pub struct HttpFetcher {
    client: Client,
    retry: RetryConfig,
    throttle: Option<Throttle>,
    robots: Option<RobotsCache>,
    robots_agent: String,
    concurrency: usize,
}

impl HttpFetcher {
    /// Builds the fetcher from the run configuration
    ///
    /// # Example
    ///
    /// ```no_run
    /// use broken_links::config::Config;
    /// use broken_links::crawler::HttpFetcher;
    ///
    /// let fetcher = HttpFetcher::new(&Config::default()).unwrap();
    /// ```
    pub fn new(config: &Config) -> Result<Self, CrawlError> {
        let client = build_http_client(config)?;

        Ok(Self {
            client,
            retry: config.retry.clone(),
            throttle: config
                .throttle
                .enabled
                .then(|| Throttle::new(&config.throttle)),
            robots: config.scope.obey_robots.then(RobotsCache::new),
            robots_agent: config.user_agent.crawler_name.clone(),
            concurrency: config.crawler.concurrency.max(1) as usize,
        })
    }

    async fn fetch_once(&self, url: &Url, headers: &RequestHeaders) -> Attempt {
        let mut request = self.client.get(url.as_str());
        if let Some(lang) = &headers.accept_language {
            match HeaderValue::from_str(lang) {
                Ok(value) => request = request.header(ACCEPT_LANGUAGE, value),
                Err(_) => tracing::debug!("Ignoring invalid Accept-Language {:?}", lang),
            }
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return classify_error(&e, url),
        };

        let status = response.status();
        if !status.is_success() {
            let result = FetchResult::Failure {
                status: LinkStatus::Http(status.as_u16()),
            };
            return if RETRY_STATUSES.contains(&status.as_u16()) {
                Attempt::Retryable(result)
            } else {
                Attempt::Done(result)
            };
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        // Pages with no content type are sniffed as HTML
        if !content_type.is_empty()
            && !content_type.contains("text/html")
            && !content_type.contains("application/xhtml+xml")
        {
            tracing::trace!("{} is {}, not scanning for links", final_url, content_type);
            return Attempt::Done(FetchResult::Success {
                final_url,
                status: status.as_u16(),
                page: ParsedPage::default(),
            });
        }

        match response.text().await {
            Ok(body) => Attempt::Done(FetchResult::Success {
                final_url,
                status: status.as_u16(),
                page: parse_html(&body),
            }),
            Err(e) => {
                tracing::debug!("Failed to read body of {}: {}", url, e);
                Attempt::Done(FetchResult::Failure {
                    status: LinkStatus::Transport(TransportErrorKind::Body),
                })
            }
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, headers: &RequestHeaders) -> FetchResult {
        let domain = extract_domain(url).unwrap_or_default();

        if let Some(robots) = &self.robots {
            let rules = robots.get_or_fetch(&self.client, url).await;
            if let (Some(throttle), Some(delay)) =
                (&self.throttle, rules.crawl_delay(&self.robots_agent))
            {
                throttle
                    .set_floor(&domain, Duration::from_secs_f64(delay.max(0.0)))
                    .await;
            }
            if !rules.is_allowed(url.as_str(), &self.robots_agent) {
                tracing::debug!("URL {} disallowed by robots.txt", url);
                return FetchResult::Disallowed;
            }
        }

        let mut attempt = 0;
        loop {
            if let Some(throttle) = &self.throttle {
                throttle.acquire(&domain).await;
            }

            let started = Instant::now();
            let outcome = self.fetch_once(url, headers).await;

            if let Some(throttle) = &self.throttle {
                let ok = matches!(&outcome, Attempt::Done(result) if result.is_success());
                throttle
                    .record_response(&domain, started.elapsed(), ok)
                    .await;
            }

            match outcome {
                Attempt::Done(result) => return result,
                Attempt::Retryable(result) => {
                    if !self.retry.enabled || attempt >= self.retry.max_retries {
                        return result;
                    }
                    attempt += 1;
                    tracing::debug!(
                        "Retrying {} ({}/{}) after {:?}",
                        url,
                        attempt,
                        self.retry.max_retries,
                        result
                    );
                    tokio::time::sleep(Duration::from_millis(self.retry.retry_delay_ms)).await;
                }
            }
        }
    }

    fn concurrency(&self) -> usize {
        self.concurrency
    }
}

/// Maps a reqwest error to a transport failure
fn classify_error(e: &reqwest::Error, url: &Url) -> Attempt {
    let kind = if e.is_timeout() {
        TransportErrorKind::Timeout
    } else if e.is_connect() {
        TransportErrorKind::Connect
    } else if e.is_redirect() {
        TransportErrorKind::Redirect
    } else if e.is_body() || e.is_decode() {
        TransportErrorKind::Body
    } else {
        TransportErrorKind::Request
    };

    tracing::debug!("Request to {} failed ({}): {}", url, kind.as_str(), e);

    let result = FetchResult::Failure {
        status: LinkStatus::Transport(kind),
    };
    match kind {
        TransportErrorKind::Timeout | TransportErrorKind::Connect => Attempt::Retryable(result),
        _ => Attempt::Done(result),
    }
}

/// Builds an HTTP client with proper configuration
///
/// Sets the user agent, the default Accept and Accept-Language headers, the
/// bot-name header, timeouts, and a redirect limit of 10.
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));

    let lang = config.scope.accept_language.as_deref().unwrap_or("en");
    if let Ok(value) = HeaderValue::from_str(lang) {
        headers.insert(ACCEPT_LANGUAGE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&config.user_agent.crawler_name) {
        headers.insert(HeaderName::from_static(BOT_NAME_HEADER), value);
    }

    Client::builder()
        .user_agent(config.user_agent.user_agent())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.crawler.timeout_secs))
        .connect_timeout(Duration::from_secs(config.crawler.connect_timeout_secs))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}
