//! Crawler module for link discovery and checking
//!
//! This module contains the core crawling logic, including:
//! - The traversal engine and its frontier
//! - Scope decisions for discovered links
//! - HTTP fetching with retries, throttling and robots.txt compliance
//! - HTML anchor extraction

mod engine;
mod fetcher;
mod frontier;
mod parser;
mod scope;
mod throttle;

pub use engine::{Engine, DEFAULT_LANGUAGE};
pub use fetcher::{
    build_http_client, FetchResult, Fetcher, HttpFetcher, RequestHeaders, BOT_NAME_HEADER,
};
pub use frontier::{Admission, Frontier, FrontierEntry};
pub use parser::{parse_html, Anchor, ParsedPage};
pub use scope::{evaluate, evaluate_at_depth, is_in_scope, page_in_scope, ScopeRejection};
pub use throttle::Throttle;

use crate::config::{Config, SeedSpec};
use crate::output::{report_path, CrawlReport, CsvSink};
use crate::CrawlError;
use std::path::Path;
use std::sync::Arc;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the seed specification from the scope configuration
/// 2. Build the HTTP fetcher
/// 3. Create the dated CSV report
/// 4. Crawl until the frontier is exhausted
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The crawl ran to completion; broken links are in the report file
/// * `Err(CrawlError)` - The crawl could not be started
pub async fn crawl(config: Config) -> Result<CrawlReport, CrawlError> {
    let spec = SeedSpec::from_scope(&config.scope, config.crawler.max_depth)?;
    let fetcher = Arc::new(HttpFetcher::new(&config)?);

    let path = report_path(Path::new(&config.output.directory), &config.output.csv_name);
    let sink = Arc::new(CsvSink::create(&path)?);

    Ok(Engine::new(spec, fetcher, sink).run().await)
}
