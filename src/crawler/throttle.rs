//! Adaptive per-domain request throttling
//!
//! Each domain keeps its own delay between request starts. The delay adapts
//! to observed latency so that, on average, `target_concurrency` requests
//! are in flight against that domain:
//!
//! - the target delay is `latency / target_concurrency`
//! - the new delay is the mean of the old delay and the target, but never
//!   below the target
//! - responses that are not 2xx may raise the delay but never lower it
//! - the delay is clamped to `[floor, max_delay]`, where the floor is the
//!   robots.txt Crawl-delay when one is known

use crate::config::ThrottleConfig;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Throttle state for one domain
#[derive(Debug, Clone)]
struct DomainSlot {
    /// Current delay between request starts
    delay: Duration,

    /// Minimum delay (robots.txt Crawl-delay)
    floor: Duration,

    /// When the next request may start
    next_start: Instant,
}

/// Shared throttle for all domains of a run
#[derive(Debug)]
pub struct Throttle {
    start_delay: Duration,
    max_delay: Duration,
    target_concurrency: f64,
    slots: Mutex<HashMap<String, DomainSlot>>,
}

impl Throttle {
    pub fn new(config: &ThrottleConfig) -> Self {
        Self {
            start_delay: Duration::from_millis(config.start_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            target_concurrency: config.target_concurrency.max(f64::EPSILON),
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Waits until a request to `domain` may start and reserves that slot
    ///
    /// Concurrent callers for the same domain are spaced `delay` apart.
    pub async fn acquire(&self, domain: &str) {
        let start_at = {
            let mut slots = self.slots.lock().await;
            let now = Instant::now();
            let slot = slots
                .entry(domain.to_string())
                .or_insert_with(|| DomainSlot {
                    delay: self.start_delay,
                    floor: Duration::ZERO,
                    next_start: now,
                });

            let start_at = slot.next_start.max(now);
            slot.next_start = start_at + slot.delay;
            start_at
        };

        if start_at > Instant::now() {
            tracing::trace!("Throttling {} until {:?}", domain, start_at);
            tokio::time::sleep_until(start_at).await;
        }
    }

    /// Feeds one observed response back into the domain's delay
    pub async fn record_response(&self, domain: &str, latency: Duration, success: bool) {
        let mut slots = self.slots.lock().await;
        let Some(slot) = slots.get_mut(domain) else {
            return;
        };

        let target = latency.div_f64(self.target_concurrency);
        let mut new_delay = ((slot.delay + target) / 2).max(target);
        if !success && new_delay < slot.delay {
            new_delay = slot.delay;
        }

        let ceiling = self.max_delay.max(slot.floor);
        slot.delay = new_delay.clamp(slot.floor, ceiling);
        tracing::trace!(
            "Throttle delay for {} is now {:?} (latency {:?})",
            domain,
            slot.delay,
            latency
        );
    }

    /// Sets the minimum delay for a domain, e.g. from robots.txt Crawl-delay
    pub async fn set_floor(&self, domain: &str, floor: Duration) {
        let mut slots = self.slots.lock().await;
        let now = Instant::now();
        let slot = slots
            .entry(domain.to_string())
            .or_insert_with(|| DomainSlot {
                delay: self.start_delay,
                floor: Duration::ZERO,
                next_start: now,
            });
        slot.floor = floor;
        if slot.delay < floor {
            slot.delay = floor;
        }
    }

    /// Current delay for a domain, if it has been seen
    pub async fn delay_for(&self, domain: &str) -> Option<Duration> {
        self.slots.lock().await.get(domain).map(|slot| slot.delay)
    }
}
