//! End-of-run statistics

use std::time::Duration;

/// Counters collected by the traversal engine over one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlReport {
    /// Fetches that completed, successful or not
    pub pages_fetched: u64,

    /// Fetches that returned a 2xx status
    pub pages_ok: u64,

    /// Broken-link records emitted
    pub broken_links: u64,

    /// URLs robots.txt did not let us fetch
    pub robots_skipped: u64,

    /// Discovered links dropped by the scope filter
    pub out_of_scope: u64,

    /// Discovered links that were already queued or fetched
    pub duplicates: u64,

    /// Wall-clock time of the run
    pub elapsed: Duration,
}

impl CrawlReport {
    /// Returns true if no broken link was found
    pub fn is_clean(&self) -> bool {
        self.broken_links == 0
    }

    /// Share of completed fetches that failed, as a percentage
    pub fn broken_rate(&self) -> f64 {
        if self.pages_fetched == 0 {
            return 0.0;
        }
        (self.broken_links as f64 / self.pages_fetched as f64) * 100.0
    }
}

/// Prints the report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Summary ===\n");
    println!("  Pages fetched: {}", report.pages_fetched);
    println!("  Successful: {}", report.pages_ok);
    println!(
        "  Broken links: {} ({:.1}%)",
        report.broken_links,
        report.broken_rate()
    );
    println!("  Skipped by robots.txt: {}", report.robots_skipped);
    println!("  Out-of-scope links: {}", report.out_of_scope);
    println!("  Duplicate links: {}", report.duplicates);
    println!("  Elapsed: {:.1}s", report.elapsed.as_secs_f64());
    println!();

    if report.is_clean() {
        println!("✓ No broken links found");
    }
}
