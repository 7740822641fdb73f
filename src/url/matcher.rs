/// Checks if an authority matches an allowed-domain pattern
///
/// Patterns come in two forms:
/// 1. Exact: `example.com` matches only `example.com`
/// 2. Wildcard: `*.example.com` matches `example.com` and any subdomain of it
///
/// A pattern without a port matches the host on any port. A pattern with a
/// port (`127.0.0.1:8000`) requires the same port. Both sides are compared
/// case-insensitively.
///
/// # Examples
///
/// ```
/// use broken_links::url::matches_domain;
///
/// assert!(matches_domain("example.com", "example.com"));
/// assert!(matches_domain("example.com", "example.com:8080"));
/// assert!(!matches_domain("example.com:8080", "example.com:9090"));
/// assert!(matches_domain("*.example.com", "blog.example.com"));
/// assert!(!matches_domain("*.example.com", "example.org"));
/// ```
pub fn matches_domain(pattern: &str, authority: &str) -> bool {
    let pattern = pattern.trim().to_ascii_lowercase();
    let authority = authority.to_ascii_lowercase();

    let (pattern_host, pattern_port) = split_port(&pattern);
    let (host, port) = split_port(&authority);

    if pattern_port.is_some() && pattern_port != port {
        return false;
    }

    if let Some(base) = pattern_host.strip_prefix("*.") {
        host == base || host.ends_with(&format!(".{}", base))
    } else {
        host == pattern_host
    }
}

/// Splits `host:port` into its parts, leaving IPv6 literals intact
fn split_port(authority: &str) -> (&str, Option<&str>) {
    if let Some(end) = authority.rfind(']') {
        // [::1]:8080
        return match authority[end..].strip_prefix("]:") {
            Some(port) => (&authority[..=end], Some(port)),
            None => (authority, None),
        };
    }

    match authority.rsplit_once(':') {
        Some((host, port)) if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => {
            (host, Some(port))
        }
        _ => (authority, None),
    }
}
