//! Configuration module for broken-links
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file, and turns the `[scope]` section into the immutable
//! [`SeedSpec`] a crawl run is bounded by.
//!
//! # Example
//!
//! ```no_run
//! use broken_links::config::{load_config, SeedSpec};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("broken-links.toml")).unwrap();
//! let spec = SeedSpec::from_scope(&config.scope, config.crawler.max_depth).unwrap();
//! println!("Crawling {} seeds", spec.seeds().len());
//! ```

mod parser;
mod seed;
mod types;
mod validation;

// Re-export types
pub use seed::{SeedSpec, SeedSpecBuilder};
pub use types::{
    Config, CrawlerConfig, OutputConfig, RetryConfig, ScopeConfig, ThrottleConfig,
    UserAgentConfig,
};
pub use validation::validate;

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
