use std::sync::OnceLock;

use regex::Regex;

/// Fields derived from a raw link string
///
/// Every field is optional: a string that matches nothing still classifies,
/// it just reports the missing parts as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Lowercased scheme, e.g. `https` or `mailto`
    pub scheme: Option<String>,

    /// Lowercased authority (host plus explicit port), present only when the
    /// string carries one
    pub domain: Option<String>,

    /// Lowercased locale segment such as `en` or `fr-ca`
    pub locale_prefix: Option<String>,
}

impl Classification {
    /// Returns true if the scheme is missing or one a browser can navigate
    pub fn is_navigable(&self) -> bool {
        match self.scheme.as_deref() {
            None => true,
            Some(scheme) => scheme == "http" || scheme == "https",
        }
    }
}

fn scheme_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?P<scheme>[A-Za-z][A-Za-z0-9+.\-]*):").expect("valid regex"))
}

fn authority_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:[A-Za-z][A-Za-z0-9+.\-]*:)?//(?:[^@/?#]*@)?(?P<domain>[^/?#]+)(?P<rest>.*)$")
            .expect("valid regex")
    })
}

fn prefix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^/(?P<prefix>[A-Za-z]{2}(?:-[A-Za-z]{2})?)(?:[/?#]|$)").expect("valid regex")
    })
}

/// Classifies a raw link string into scheme, domain and locale prefix
///
/// # Rules
///
/// - `scheme` is any leading `name:` token
/// - `domain` is the authority after `//`, either following a scheme or at
///   the start of a scheme-relative link
/// - `locale_prefix` is the first path segment when it is a two-letter code,
///   optionally followed by `-` and a two-letter region; it is read right
///   after the authority, or after the leading slash of a relative link
///
/// Classification never fails. Anything that cannot be extracted is `None`.
///
/// # Examples
///
/// ```
/// use broken_links::url::classify;
///
/// let c = classify("https://Example.com/fr-CA/contact");
/// assert_eq!(c.scheme.as_deref(), Some("https"));
/// assert_eq!(c.domain.as_deref(), Some("example.com"));
/// assert_eq!(c.locale_prefix.as_deref(), Some("fr-ca"));
///
/// let c = classify("/en/about");
/// assert_eq!(c.domain, None);
/// assert_eq!(c.locale_prefix.as_deref(), Some("en"));
/// ```
pub fn classify(raw: &str) -> Classification {
    let raw = raw.trim();

    let scheme = scheme_regex()
        .captures(raw)
        .map(|caps| caps["scheme"].to_ascii_lowercase());

    let (domain, path) = match authority_regex().captures(raw) {
        Some(caps) => (
            Some(caps["domain"].to_ascii_lowercase()),
            caps.name("rest").map_or("", |m| m.as_str()),
        ),
        // Opaque schemes (mailto:, tel:) carry no path worth inspecting
        None if scheme.is_some() => (None, ""),
        None => (None, raw),
    };

    let locale_prefix = prefix_regex()
        .captures(path)
        .map(|caps| caps["prefix"].to_ascii_lowercase());

    Classification {
        scheme,
        domain,
        locale_prefix,
    }
}
