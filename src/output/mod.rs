//! Output module for broken-link reporting
//!
//! This module handles:
//! - The result sink contract the traversal engine reports into
//! - CSV export of broken-link records
//! - In-memory collection for embedding and tests
//! - End-of-run statistics

mod csv_sink;
mod memory;
pub mod stats;
mod traits;

pub use csv_sink::{report_path, CsvSink};
pub use memory::MemorySink;
pub use stats::{print_report, CrawlReport};
pub use traits::{
    BrokenLinkRecord, LinkStatus, OutputError, OutputResult, ResultSink,
    TransportErrorKind,
};
