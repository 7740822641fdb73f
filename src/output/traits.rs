//! Result sink trait and the broken-link record it receives

use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Kind of transport-level failure, used in place of an HTTP status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// The request or connection timed out
    Timeout,
    /// Connection refused, DNS failure, TLS failure
    Connect,
    /// Redirect loop or too many redirects
    Redirect,
    /// The response body could not be read
    Body,
    /// Any other client-side request failure
    Request,
    /// The fetch task itself failed
    Internal,
}

impl TransportErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Redirect => "redirect",
            Self::Body => "body",
            Self::Request => "request",
            Self::Internal => "internal",
        }
    }
}

/// Outcome recorded for a broken link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkStatus {
    /// Non-2xx HTTP status code
    Http(u16),
    /// No HTTP response was obtained
    Transport(TransportErrorKind),
}

impl LinkStatus {
    /// Returns the numeric status code, if there is one
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Http(code) => Some(*code),
            Self::Transport(_) => None,
        }
    }

    /// Returns true for transport-level failures
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(code) => write!(f, "{}", code),
            Self::Transport(kind) => write!(f, "transport-error:{}", kind.as_str()),
        }
    }
}

impl Serialize for LinkStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Http(code) => serializer.serialize_u16(*code),
            Self::Transport(_) => serializer.collect_str(self),
        }
    }
}

/// A link whose fetch did not succeed, with the anchor that led to it
///
/// Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenLinkRecord {
    /// The URL that failed
    pub url: String,

    /// The page the link was found on; empty for seeds
    pub previous_page: String,

    /// The href exactly as written in the page
    pub previous_link_href: String,

    /// The anchor text (first text node, trimmed)
    pub previous_link_text: String,

    /// HTTP status or transport-failure marker
    pub status: LinkStatus,
}

/// Trait for result sinks
///
/// A sink receives broken-link records as the crawl produces them. Records
/// arrive in completion order, not discovery order. Implementations must be
/// thread-safe.
pub trait ResultSink: Send + Sync {
    /// Records one broken link
    fn record(&self, record: &BrokenLinkRecord) -> OutputResult<()>;

    /// Flushes anything buffered; called once when the run ends
    fn finish(&self) -> OutputResult<()> {
        Ok(())
    }
}
