//! broken-links main entry point
//!
//! This is the command-line interface for the broken-link checker.

use anyhow::Context;
use broken_links::config::{load_config_with_hash, validate, Config, SeedSpec};
use broken_links::crawler::crawl;
use broken_links::output::{print_report, report_path};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// broken-links: find broken links on a website
///
/// Crawls from the given seed URLs, follows in-scope links, and writes every
/// link that does not answer with a 2xx status to a dated CSV report,
/// together with the page and anchor that referenced it.
#[derive(Parser, Debug)]
#[command(name = "broken-links")]
#[command(version)]
#[command(about = "Crawl a website and report broken links", long_about = None)]
struct Cli {
    /// Seed URLs; a missing scheme defaults to https
    #[arg(value_name = "URL")]
    urls: Vec<String>,

    /// Allowed locale prefixes (e.g. en,fr,de-at)
    #[arg(short, long, value_delimiter = ',', num_args = 1..)]
    prefixes: Vec<String>,

    /// Allowed domains (e.g. example.com,*.example.org)
    #[arg(short, long, value_delimiter = ',', num_args = 1..)]
    domains: Vec<String>,

    /// Fixed Accept-Language for every request
    #[arg(long, value_name = "LANG")]
    accept_lang: Option<String>,

    /// Disable adaptive per-domain throttling
    #[arg(long)]
    disable_throttling: bool,

    /// Disable retries of transient failures
    #[arg(long)]
    disable_retry: bool,

    /// Suffix for the CSV report file name
    #[arg(long, value_name = "NAME")]
    csv_name: Option<String>,

    /// Directory the CSV report is written into
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Maximum number of fetches in flight
    #[arg(long)]
    concurrency: Option<u32>,

    /// Maximum link depth from the seeds
    #[arg(long)]
    max_depth: Option<u32>,

    /// Skip links without a locale prefix when prefixes are restricted
    #[arg(long)]
    strict_prefixes: bool,

    /// Add each seed's locale prefix to the allowed prefixes
    #[arg(long)]
    seed_prefixes: bool,

    /// Do not fetch or honor robots.txt
    #[arg(long)]
    ignore_robots: bool,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the configuration and show the crawl scope without crawling
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Layers command-line flags over the file configuration
    fn apply(&self, config: &mut Config) {
        if !self.urls.is_empty() {
            config.scope.seeds = self.urls.clone();
        }
        if !self.prefixes.is_empty() {
            config.scope.prefixes = self.prefixes.clone();
        }
        if !self.domains.is_empty() {
            config.scope.domains = self.domains.clone();
        }
        if let Some(lang) = &self.accept_lang {
            config.scope.accept_language = Some(lang.clone());
        }
        if self.disable_throttling {
            config.throttle.enabled = false;
        }
        if self.disable_retry {
            config.retry.enabled = false;
        }
        if let Some(name) = &self.csv_name {
            config.output.csv_name = name.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.display().to_string();
        }
        if let Some(concurrency) = self.concurrency {
            config.crawler.concurrency = concurrency;
        }
        if self.max_depth.is_some() {
            config.crawler.max_depth = self.max_depth;
        }
        if self.strict_prefixes {
            config.scope.strict_prefixes = true;
        }
        if self.seed_prefixes {
            config.scope.seed_prefixes = true;
        }
        if self.ignore_robots {
            config.scope.obey_robots = false;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    cli.apply(&mut config);
    validate(&config).context("invalid configuration")?;

    let spec = SeedSpec::from_scope(&config.scope, config.crawler.max_depth)
        .context("invalid crawl scope")?;

    if cli.dry_run {
        handle_dry_run(&config, &spec);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("broken_links=info,warn"),
            1 => EnvFilter::new("broken_links=debug,info"),
            2 => EnvFilter::new("broken_links=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the resolved scope and settings
fn handle_dry_run(config: &Config, spec: &SeedSpec) {
    println!("=== broken-links Dry Run ===\n");

    println!("Seeds ({}):", spec.seeds().len());
    for seed in spec.seeds() {
        println!("  - {}", seed);
    }

    println!("\nAllowed domains ({}):", spec.allowed_domains().len());
    for domain in spec.allowed_domains() {
        println!("  - {}", domain);
    }

    if spec.allowed_prefixes().is_empty() {
        println!("\nAllowed prefixes: any");
    } else {
        println!("\nAllowed prefixes: {}", spec.allowed_prefixes().join(", "));
        println!("  Unprefixed links followed: {}", !spec.strict_prefixes());
    }

    println!("\nCrawler:");
    println!("  Concurrency: {}", config.crawler.concurrency);
    match spec.max_depth() {
        Some(depth) => println!("  Max depth: {}", depth),
        None => println!("  Max depth: unlimited"),
    }
    println!(
        "  Accept-Language: {}",
        spec.accept_language().unwrap_or("from each page (default en)")
    );
    println!("  Throttling: {}", enabled(config.throttle.enabled));
    println!(
        "  Retries: {}",
        if config.retry.enabled {
            format!("up to {}", config.retry.max_retries)
        } else {
            "disabled".to_string()
        }
    );
    println!("  robots.txt: {}", enabled(config.scope.obey_robots));
    println!("  User agent: {}", config.user_agent.user_agent());

    println!(
        "\nReport: {}",
        report_path(Path::new(&config.output.directory), &config.output.csv_name).display()
    );

    println!("\n✓ Configuration is valid");
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "enabled"
    } else {
        "disabled"
    }
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Seeds: {}, domains: {}, prefixes: {}",
        config.scope.seeds.len(),
        config.scope.domains.len(),
        config.scope.prefixes.len()
    );

    match crawl(config).await {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
