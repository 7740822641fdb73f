use crate::config::types::{
    Config, CrawlerConfig, RetryConfig, ScopeConfig, ThrottleConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_retry_config(&config.retry)?;
    validate_throttle_config(&config.throttle)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_scope_config(&config.scope)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 256 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 256, got {}",
            config.concurrency
        )));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.enabled && config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }
    Ok(())
}

fn validate_throttle_config(config: &ThrottleConfig) -> Result<(), ConfigError> {
    if !config.enabled {
        return Ok(());
    }

    if !(config.target_concurrency > 0.0) {
        return Err(ConfigError::Validation(format!(
            "target_concurrency must be > 0, got {}",
            config.target_concurrency
        )));
    }

    if config.max_delay_ms < config.start_delay_ms {
        return Err(ConfigError::Validation(format!(
            "max_delay_ms ({}) must be >= start_delay_ms ({})",
            config.max_delay_ms, config.start_delay_ms
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters, hyphens and underscores, got '{}'",
            config.crawler_name
        )));
    }

    if let Some(contact_url) = &config.contact_url {
        Url::parse(contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates allowed domains and prefixes; seeds are checked when the
/// seed spec is built
fn validate_scope_config(config: &ScopeConfig) -> Result<(), ConfigError> {
    for domain in &config.domains {
        validate_domain_pattern(domain)?;
    }

    for prefix in &config.prefixes {
        validate_prefix(prefix)?;
    }

    if let Some(lang) = &config.accept_language {
        if lang.contains(['\r', '\n']) {
            return Err(ConfigError::Validation(format!(
                "accept_language contains a line break: {:?}",
                lang
            )));
        }
    }

    Ok(())
}

/// Validates a domain pattern (supports wildcards and an optional port)
pub(crate) fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    let host_port = pattern.strip_prefix("*.").unwrap_or(pattern);

    let host = match host_port.rsplit_once(':') {
        Some((host, port)) => {
            if port.parse::<u16>().is_err() {
                return Err(ConfigError::InvalidPattern(format!(
                    "Domain '{}' has an invalid port",
                    pattern
                )));
            }
            host
        }
        None => host_port,
    };

    validate_domain_string(host)
}

/// Validates a domain string (without wildcard prefix or port)
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    Ok(())
}

/// Validates a locale prefix: two letters, optionally `-` and two more
pub(crate) fn validate_prefix(prefix: &str) -> Result<(), ConfigError> {
    let prefix = prefix.trim().trim_matches('/');
    let valid = match prefix.split_once('-') {
        Some((lang, region)) => is_two_letters(lang) && is_two_letters(region),
        None => is_two_letters(prefix),
    };

    if valid {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "Locale prefix '{}' must look like 'en' or 'fr-ca'",
            prefix
        )))
    }
}

fn is_two_letters(s: &str) -> bool {
    s.len() == 2 && s.chars().all(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_domain_pattern() {
        assert!(validate_domain_pattern("example.com").is_ok());
        assert!(validate_domain_pattern("*.example.com").is_ok());
        assert!(validate_domain_pattern("sub.example.com").is_ok());
        assert!(validate_domain_pattern("localhost").is_ok());
        assert!(validate_domain_pattern("127.0.0.1:8000").is_ok());

        assert!(validate_domain_pattern("").is_err());
        assert!(validate_domain_pattern("*.").is_err());
        assert!(validate_domain_pattern(".example.com").is_err());
        assert!(validate_domain_pattern("example.com.").is_err());
        assert!(validate_domain_pattern("exa mple.com").is_err());
        assert!(validate_domain_pattern("example.com:http").is_err());
        assert!(validate_domain_pattern("example.com:99999").is_err());
    }

    #[test]
    fn test_validate_prefix() {
        assert!(validate_prefix("en").is_ok());
        assert!(validate_prefix("fr-ca").is_ok());
        assert!(validate_prefix("/de/").is_ok());

        assert!(validate_prefix("").is_err());
        assert!(validate_prefix("eng").is_err());
        assert!(validate_prefix("e1").is_err());
        assert!(validate_prefix("fr-").is_err());
        assert!(validate_prefix("fr-can").is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_concurrency_bounds() {
        let mut config = Config::default();
        config.crawler.concurrency = 0;
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));

        config.crawler.concurrency = 257;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_throttle_bounds_ignored_when_disabled() {
        let mut config = Config::default();
        config.throttle.max_delay_ms = 10;
        config.throttle.start_delay_ms = 100;
        assert!(validate(&config).is_err());

        config.throttle.enabled = false;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_crawler_name() {
        let mut config = Config::default();
        config.user_agent.crawler_name = "bad name!".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_contact_url() {
        let mut config = Config::default();
        config.user_agent.contact_url = Some("not a url".to_string());
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }
}
