//! Scope decisions for discovered links
//!
//! A raw href passes when all of these hold, checked in order:
//! - it is not blank
//! - its scheme is absent, `http` or `https`
//! - its domain is absent (relative) or matches an allowed domain pattern
//! - its locale prefix is allowed
//! - its depth does not exceed the configured maximum

use crate::config::SeedSpec;
use crate::url::{classify, extract_domain};
use std::fmt;
use url::Url;

/// Why a link was left out of the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeRejection {
    /// The href is blank
    Empty,
    /// The scheme is not navigable (mailto, tel, javascript, ...)
    Scheme,
    /// The domain is not in the allow-list
    Domain,
    /// The locale prefix is not in the allow-list
    Prefix,
    /// The link is deeper than the maximum depth
    Depth,
}

impl fmt::Display for ScopeRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Empty => "empty href",
            Self::Scheme => "non-navigable scheme",
            Self::Domain => "domain not allowed",
            Self::Prefix => "locale prefix not allowed",
            Self::Depth => "maximum depth exceeded",
        };
        f.write_str(reason)
    }
}

/// Checks a raw href against the seed specification
///
/// Depth is not considered here; see [`evaluate_at_depth`].
///
/// # Example
///
/// ```
/// use broken_links::config::SeedSpec;
/// use broken_links::crawler::{evaluate, ScopeRejection};
///
/// let spec = SeedSpec::builder()
///     .seed("https://example.com/en/home")
///     .prefix("en")
///     .build()
///     .unwrap();
///
/// assert!(evaluate("/en/about", &spec).is_ok());
/// assert_eq!(evaluate("/fr/about", &spec), Err(ScopeRejection::Prefix));
/// assert_eq!(evaluate("mailto:info@example.com", &spec), Err(ScopeRejection::Scheme));
/// ```
pub fn evaluate(raw_href: &str, spec: &SeedSpec) -> Result<(), ScopeRejection> {
    let href = raw_href.trim();
    if href.is_empty() {
        return Err(ScopeRejection::Empty);
    }

    let class = classify(href);
    if !class.is_navigable() {
        return Err(ScopeRejection::Scheme);
    }

    if let Some(domain) = &class.domain {
        if !spec.domain_allowed(domain) {
            return Err(ScopeRejection::Domain);
        }
    }

    if !spec.prefix_allowed(class.locale_prefix.as_deref()) {
        return Err(ScopeRejection::Prefix);
    }

    Ok(())
}

/// Like [`evaluate`], plus the depth limit for a link found at `depth`
pub fn evaluate_at_depth(
    raw_href: &str,
    depth: u32,
    spec: &SeedSpec,
) -> Result<(), ScopeRejection> {
    evaluate(raw_href, spec)?;

    match spec.max_depth() {
        Some(max) if depth > max => Err(ScopeRejection::Depth),
        _ => Ok(()),
    }
}

/// Returns true if a link found at `depth` should be followed
///
/// Rejections are logged at trace level with their reason.
pub fn is_in_scope(raw_href: &str, depth: u32, spec: &SeedSpec) -> bool {
    match evaluate_at_depth(raw_href, depth, spec) {
        Ok(()) => true,
        Err(reason) => {
            tracing::trace!("Skipping {:?}: {}", raw_href, reason);
            false
        }
    }
}

/// Returns true if links on a page at this final URL may be followed
///
/// Only the domain is checked: a redirect that leaves the allowed domains
/// still gets its status recorded, but is not crawled further.
pub fn page_in_scope(final_url: &Url, spec: &SeedSpec) -> bool {
    match extract_domain(final_url) {
        Some(domain) => spec.domain_allowed(&domain),
        None => false,
    }
}
