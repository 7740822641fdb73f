//! URL handling module
//!
//! This module provides link classification (scheme, domain, locale prefix),
//! URL normalization for deduplication, and allowed-domain matching.

mod classify;
mod matcher;
mod normalize;

pub use classify::{classify, Classification};
pub use matcher::matches_domain;
pub use normalize::{normalize_parsed, normalize_url};

use url::Url;

/// Extracts the authority of a URL: the lowercase host plus its port when the
/// port is not the scheme default
///
/// # Examples
///
/// ```
/// use url::Url;
/// use broken_links::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8000/").unwrap();
/// assert_eq!(extract_domain(&url), Some("127.0.0.1:8000".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}
