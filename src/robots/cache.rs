//! Per-run robots.txt cache

use crate::robots::{fetch_robots, ParsedRobots};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

/// Caches parsed robots.txt by origin for the lifetime of one crawl
///
/// The lock is held while a missing entry is fetched so each origin's
/// robots.txt is requested exactly once.
#[derive(Debug, Default)]
pub struct RobotsCache {
    entries: Mutex<HashMap<String, Arc<ParsedRobots>>>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the rules for the URL's origin, fetching them on first use
    pub async fn get_or_fetch(&self, client: &Client, url: &Url) -> Arc<ParsedRobots> {
        let origin = url.origin().ascii_serialization();

        let mut entries = self.entries.lock().await;
        if let Some(robots) = entries.get(&origin) {
            return robots.clone();
        }

        tracing::debug!("Fetching robots.txt for {}", origin);
        let robots = Arc::new(fetch_robots(client, url).await);
        entries.insert(origin, robots.clone());
        robots
    }

    /// Number of origins cached so far
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Returns true if nothing has been cached yet
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
