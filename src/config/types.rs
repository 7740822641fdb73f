use serde::Deserialize;

/// Main configuration structure for broken-links
///
/// Every section is optional in the TOML file; missing sections take their
/// defaults and CLI flags are layered on top.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub retry: RetryConfig,
    pub throttle: ThrottleConfig,
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub scope: ScopeConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum number of fetches in flight at once
    pub concurrency: u32,

    /// Maximum link depth from the seeds; absent means unlimited
    pub max_depth: Option<u32>,

    /// Whole-request timeout in seconds
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            concurrency: 32,
            max_depth: None,
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Retry policy for transient failures
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RetryConfig {
    pub enabled: bool,

    /// Extra attempts after the first one
    pub max_retries: u32,

    /// Pause between attempts (milliseconds)
    pub retry_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 2,
            retry_delay_ms: 1000,
        }
    }
}

/// Adaptive per-domain throttling
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ThrottleConfig {
    pub enabled: bool,

    /// Initial delay between requests to one domain (milliseconds)
    pub start_delay_ms: u64,

    /// Upper bound for the adaptive delay (milliseconds)
    pub max_delay_ms: u64,

    /// Average number of requests to keep in flight per domain
    pub target_concurrency: f64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            start_delay_ms: 1000,
            max_delay_ms: 60_000,
            target_concurrency: 1.0,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler, also sent as the bot-name header
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "broken-links-bot".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version (+ContactURL)`
    pub fn user_agent(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory the CSV report is written into
    pub directory: String,

    /// Free-form suffix appended to the report file name
    pub csv_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "exported_broken_links".to_string(),
            csv_name: String::new(),
        }
    }
}

/// What to crawl and which discovered links to follow
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScopeConfig {
    /// Seed URLs; a missing scheme defaults to https
    pub seeds: Vec<String>,

    /// Allowed domain patterns (e.g. "example.com" or "*.example.com")
    pub domains: Vec<String>,

    /// Allowed locale prefixes; empty allows every prefix
    pub prefixes: Vec<String>,

    /// Fixed Accept-Language sent with every request
    pub accept_language: Option<String>,

    /// Reject links without a locale prefix when prefixes are restricted
    pub strict_prefixes: bool,

    /// Add each seed's locale prefix to the allowed prefixes
    pub seed_prefixes: bool,

    /// Honor robots.txt
    pub obey_robots: bool,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            seeds: Vec::new(),
            domains: Vec::new(),
            prefixes: Vec::new(),
            accept_language: None,
            strict_prefixes: false,
            seed_prefixes: false,
            obey_robots: true,
        }
    }
}
