//! Integration tests for broken-links

mod crawl_tests;
