//! Breadth-first frontier with an at-most-once visited set
//!
//! The queue and the visited set live under a single lock so that the
//! membership test, the insert and the push happen atomically.
//!
//! The visited set is keyed on the normalized form of each target, while the
//! queued entry keeps the URL as linked: `/en/about/` and `/en/about` count
//! as one resource, but the first spelling seen is the one requested.

use crate::url::normalize_parsed;
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, PoisonError};
use url::Url;

/// A URL waiting to be fetched, with the provenance that led to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Absolute URL to fetch, as linked (fragment removed)
    pub target: Url,

    /// Page the link was found on; `None` for seeds
    pub referrer: Option<Url>,

    /// The href exactly as written on the referring page
    pub anchor_href: String,

    /// Anchor text on the referring page
    pub anchor_text: String,

    /// Distance from the seeds; seeds are 0
    pub depth: u32,

    /// Accept-Language to send with the request
    pub accept_language: String,
}

impl FrontierEntry {
    /// Creates the entry for a seed URL
    pub fn seed(target: Url, accept_language: impl Into<String>) -> Self {
        Self {
            target,
            referrer: None,
            anchor_href: String::new(),
            anchor_text: String::new(),
            depth: 0,
            accept_language: accept_language.into(),
        }
    }

    pub fn is_seed(&self) -> bool {
        self.referrer.is_none()
    }
}

/// Outcome of offering a URL to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// First sighting; the entry was queued
    Admitted,
    /// The URL was queued or fetched before
    AlreadySeen,
}

#[derive(Debug, Default)]
struct FrontierState {
    queue: VecDeque<FrontierEntry>,
    seen: HashSet<String>,
}

/// Work queue shared by the traversal engine
#[derive(Debug, Default)]
pub struct Frontier {
    state: Mutex<FrontierState>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the entry unless an equivalent target has been seen before
    pub fn try_enqueue(&self, entry: FrontierEntry) -> Admission {
        let key = visit_key(&entry.target);
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !state.seen.insert(key) {
            return Admission::AlreadySeen;
        }
        state.queue.push_back(entry);
        Admission::Admitted
    }

    /// Takes the oldest queued entry
    pub fn pop(&self) -> Option<FrontierEntry> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .queue
            .pop_front()
    }

    /// Number of entries waiting to be fetched
    pub fn len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .queue
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of distinct URLs ever admitted
    pub fn seen_count(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .seen
            .len()
    }
}

/// Visited-set key for a target URL
fn visit_key(target: &Url) -> String {
    normalize_parsed(target.clone())
        .map(String::from)
        .unwrap_or_else(|_| target.to_string())
}
