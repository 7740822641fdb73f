//! The immutable Seed Specification a crawl run is scoped by

use crate::config::types::ScopeConfig;
use crate::url::{classify, extract_domain, matches_domain, normalize_url};
use crate::ConfigError;
use url::Url;

/// Scope of one crawl run
///
/// Built once before the run starts and shared read-only with the scope
/// filter and the traversal engine. Seed authorities are already folded into
/// `allowed_domains`.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedSpec {
    seeds: Vec<Url>,
    allowed_domains: Vec<String>,
    allowed_prefixes: Vec<String>,
    accept_language: Option<String>,
    max_depth: Option<u32>,
    strict_prefixes: bool,
}

impl SeedSpec {
    /// Starts a new builder
    pub fn builder() -> SeedSpecBuilder {
        SeedSpecBuilder::default()
    }

    /// Builds a spec from the `[scope]` config section and a depth limit
    pub fn from_scope(scope: &ScopeConfig, max_depth: Option<u32>) -> Result<Self, ConfigError> {
        Self::builder()
            .seeds(scope.seeds.iter().cloned())
            .domains(scope.domains.iter().cloned())
            .prefixes(scope.prefixes.iter().cloned())
            .accept_language(scope.accept_language.clone())
            .max_depth(max_depth)
            .strict_prefixes(scope.strict_prefixes)
            .seed_prefixes(scope.seed_prefixes)
            .build()
    }

    /// Normalized seed URLs in configuration order
    pub fn seeds(&self) -> &[Url] {
        &self.seeds
    }

    /// Allowed domain patterns, configured ones first, then seed authorities
    pub fn allowed_domains(&self) -> &[String] {
        &self.allowed_domains
    }

    /// Allowed locale prefixes (lowercase); empty means unrestricted
    pub fn allowed_prefixes(&self) -> &[String] {
        &self.allowed_prefixes
    }

    /// Fixed Accept-Language override
    pub fn accept_language(&self) -> Option<&str> {
        self.accept_language.as_deref()
    }

    /// Maximum link depth from the seeds
    pub fn max_depth(&self) -> Option<u32> {
        self.max_depth
    }

    /// Whether links without a locale prefix fail a prefix restriction
    pub fn strict_prefixes(&self) -> bool {
        self.strict_prefixes
    }

    /// Returns true if the authority is covered by the allowed domains
    ///
    /// An empty allow-list admits every domain.
    pub fn domain_allowed(&self, authority: &str) -> bool {
        self.allowed_domains.is_empty()
            || self
                .allowed_domains
                .iter()
                .any(|pattern| matches_domain(pattern, authority))
    }

    /// Returns true if a link with this locale prefix may be followed
    ///
    /// A link that carries no prefix passes unless `strict_prefixes` is set.
    pub fn prefix_allowed(&self, prefix: Option<&str>) -> bool {
        if self.allowed_prefixes.is_empty() {
            return true;
        }
        match prefix {
            Some(prefix) => self.allowed_prefixes.iter().any(|p| p == prefix),
            None => !self.strict_prefixes,
        }
    }
}

/// Builder for [`SeedSpec`]
#[derive(Debug, Default)]
pub struct SeedSpecBuilder {
    seeds: Vec<String>,
    domains: Vec<String>,
    prefixes: Vec<String>,
    accept_language: Option<String>,
    max_depth: Option<u32>,
    strict_prefixes: bool,
    seed_prefixes: bool,
}

impl SeedSpecBuilder {
    pub fn seed(mut self, seed: impl Into<String>) -> Self {
        self.seeds.push(seed.into());
        self
    }

    pub fn seeds<I, S>(mut self, seeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.seeds.extend(seeds.into_iter().map(Into::into));
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domains.push(domain.into());
        self
    }

    pub fn domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domains.extend(domains.into_iter().map(Into::into));
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    pub fn prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefixes.extend(prefixes.into_iter().map(Into::into));
        self
    }

    pub fn accept_language(mut self, lang: Option<String>) -> Self {
        self.accept_language = lang.filter(|l| !l.trim().is_empty());
        self
    }

    pub fn max_depth(mut self, depth: Option<u32>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn strict_prefixes(mut self, strict: bool) -> Self {
        self.strict_prefixes = strict;
        self
    }

    pub fn seed_prefixes(mut self, enabled: bool) -> Self {
        self.seed_prefixes = enabled;
        self
    }

    /// Validates the seeds and assembles the final scope
    ///
    /// Seeds without a scheme get `https://`. Every seed's authority is
    /// added to the allowed domains.
    pub fn build(self) -> Result<SeedSpec, ConfigError> {
        if self.seeds.is_empty() {
            return Err(ConfigError::Validation(
                "at least one seed URL is required".to_string(),
            ));
        }

        let mut allowed_domains: Vec<String> = Vec::new();
        for domain in self.domains {
            let domain = domain.trim().to_ascii_lowercase();
            if domain.is_empty() {
                return Err(ConfigError::InvalidPattern(
                    "Domain pattern cannot be empty".to_string(),
                ));
            }
            push_unique(&mut allowed_domains, domain);
        }

        let mut allowed_prefixes: Vec<String> = Vec::new();
        for prefix in self.prefixes {
            let prefix = prefix.trim().trim_matches('/').to_ascii_lowercase();
            if !prefix.is_empty() {
                push_unique(&mut allowed_prefixes, prefix);
            }
        }
        let prefix_restricted = !allowed_prefixes.is_empty();

        let mut seeds = Vec::with_capacity(self.seeds.len());
        for raw in &self.seeds {
            let seed = parse_seed(raw)?;

            let authority = extract_domain(&seed).ok_or_else(|| {
                ConfigError::InvalidUrl(format!("Seed URL '{}' has no domain", raw))
            })?;
            if !allowed_domains
                .iter()
                .any(|pattern| matches_domain(pattern, &authority))
            {
                allowed_domains.push(authority);
            }

            if self.seed_prefixes && prefix_restricted {
                if let Some(prefix) = classify(seed.as_str()).locale_prefix {
                    push_unique(&mut allowed_prefixes, prefix);
                }
            }

            if !seeds.contains(&seed) {
                seeds.push(seed);
            }
        }

        tracing::debug!(
            "Scope: {} seeds, domains {:?}, prefixes {:?}",
            seeds.len(),
            allowed_domains,
            allowed_prefixes
        );

        Ok(SeedSpec {
            seeds,
            allowed_domains,
            allowed_prefixes,
            accept_language: self.accept_language,
            max_depth: self.max_depth,
            strict_prefixes: self.strict_prefixes,
        })
    }
}

/// Parses a seed, defaulting to https when the scheme is missing
fn parse_seed(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let with_scheme = if classify(trimmed).scheme.is_some() && trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed.trim_start_matches('/'))
    };

    normalize_url(&with_scheme)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", raw, e)))
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_domain_registered() {
        let spec = SeedSpec::builder()
            .seed("https://example.com/en/home")
            .build()
            .unwrap();
        assert_eq!(spec.allowed_domains(), &["example.com".to_string()]);
        assert_eq!(spec.seeds()[0].as_str(), "https://example.com/en/home");
    }

    #[test]
    fn test_seed_domain_not_duplicated() {
        let spec = SeedSpec::builder()
            .domain("*.example.com")
            .seed("https://www.example.com/")
            .seed("https://example.com/fr/")
            .build()
            .unwrap();
        assert_eq!(spec.allowed_domains(), &["*.example.com".to_string()]);
        assert_eq!(spec.seeds().len(), 2);
    }

    #[test]
    fn test_configured_domains_kept_before_seeds() {
        let spec = SeedSpec::builder()
            .domain("Docs.Example.com")
            .seed("https://example.com/")
            .build()
            .unwrap();
        assert_eq!(
            spec.allowed_domains(),
            &["docs.example.com".to_string(), "example.com".to_string()]
        );
        assert!(spec.domain_allowed("docs.example.com"));
        assert!(spec.domain_allowed("example.com"));
        assert!(!spec.domain_allowed("other.com"));
    }

    #[test]
    fn test_seed_without_scheme() {
        let spec = SeedSpec::builder()
            .seed("example.com/en/")
            .seed("http://example.org")
            .build()
            .unwrap();
        assert_eq!(spec.seeds()[0].as_str(), "https://example.com/en");
        assert_eq!(spec.seeds()[1].as_str(), "http://example.org/");
        assert_eq!(spec.allowed_domains().len(), 2);
    }

    #[test]
    fn test_seed_with_port_registers_authority() {
        let spec = SeedSpec::builder()
            .seed("http://127.0.0.1:8000/")
            .build()
            .unwrap();
        assert_eq!(spec.allowed_domains(), &["127.0.0.1:8000".to_string()]);
    }

    #[test]
    fn test_duplicate_seeds_collapse() {
        let spec = SeedSpec::builder()
            .seed("https://example.com/en/")
            .seed("https://EXAMPLE.com/en")
            .build()
            .unwrap();
        assert_eq!(spec.seeds().len(), 1);
    }

    #[test]
    fn test_invalid_seed() {
        let err = SeedSpec::builder().seed("ftp://example.com/").build();
        assert!(matches!(err, Err(ConfigError::InvalidUrl(_))));

        let err = SeedSpec::builder().seed("http://").build();
        assert!(matches!(err, Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_no_seeds() {
        let err = SeedSpec::builder().build();
        assert!(matches!(err, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_prefixes_normalized() {
        let spec = SeedSpec::builder()
            .seed("https://example.com/")
            .prefixes(["EN", "/fr-CA/", "en", ""])
            .build()
            .unwrap();
        assert_eq!(
            spec.allowed_prefixes(),
            &["en".to_string(), "fr-ca".to_string()]
        );
    }

    #[test]
    fn test_prefix_allowed() {
        let spec = SeedSpec::builder()
            .seed("https://example.com/")
            .prefix("en")
            .build()
            .unwrap();
        assert!(spec.prefix_allowed(Some("en")));
        assert!(!spec.prefix_allowed(Some("fr")));
        assert!(spec.prefix_allowed(None));

        let open = SeedSpec::builder()
            .seed("https://example.com/")
            .build()
            .unwrap();
        assert!(open.prefix_allowed(Some("fr")));
        assert!(open.prefix_allowed(None));
    }

    #[test]
    fn test_strict_prefixes() {
        let spec = SeedSpec::builder()
            .seed("https://example.com/")
            .prefix("en")
            .strict_prefixes(true)
            .build()
            .unwrap();
        assert!(!spec.prefix_allowed(None));
        assert!(spec.prefix_allowed(Some("en")));
        assert!(!spec.prefix_allowed(Some("de")));

        // Without any prefix restriction strictness has nothing to act on
        let open = SeedSpec::builder()
            .seed("https://example.com/")
            .strict_prefixes(true)
            .build()
            .unwrap();
        assert!(open.prefix_allowed(None));
    }

    #[test]
    fn test_seed_prefixes_extend_restriction() {
        let spec = SeedSpec::builder()
            .seed("https://example.com/de/start")
            .prefix("en")
            .seed_prefixes(true)
            .build()
            .unwrap();
        assert_eq!(spec.allowed_prefixes(), &["en".to_string(), "de".to_string()]);
    }

    #[test]
    fn test_seed_prefixes_do_not_create_restriction() {
        let spec = SeedSpec::builder()
            .seed("https://example.com/de/start")
            .seed_prefixes(true)
            .build()
            .unwrap();
        assert!(spec.allowed_prefixes().is_empty());
    }

    #[test]
    fn test_strictness_alone_does_not_create_restriction() {
        let spec = SeedSpec::builder()
            .seed("https://example.com/de/start")
            .seed_prefixes(true)
            .strict_prefixes(true)
            .build()
            .unwrap();
        assert!(spec.allowed_prefixes().is_empty());
        assert!(spec.prefix_allowed(Some("fr")));
    }

    #[test]
    fn test_blank_accept_language_ignored() {
        let spec = SeedSpec::builder()
            .seed("https://example.com/")
            .accept_language(Some("  ".to_string()))
            .build()
            .unwrap();
        assert_eq!(spec.accept_language(), None);
    }
}
