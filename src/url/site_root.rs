use serde::Serialize;
use std::borrow::Borrow;
use std::fmt;
use url::{Host, Url};

/// A site identity: scheme plus the last two labels of the host
///
/// Used to classify relationships between sites and to key the robots cache.
/// Never used for page deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SiteRoot(String);

impl SiteRoot {
    /// Wraps an already-derived root string
    pub fn new(root: impl Into<String>) -> Self {
        Self(root.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Host part of the root, without scheme or port
    pub fn host(&self) -> &str {
        root_host(&self.0)
    }

    /// Location of the robots.txt governing this root
    pub fn robots_url(&self) -> String {
        format!("{}/robots.txt", self.0)
    }
}

impl fmt::Display for SiteRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SiteRoot {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SiteRoot {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Derives the site root of a URL
///
/// Subdomains are stripped from DNS hosts (`https://shop.example.com/a` →
/// `https://example.com`). IP-address hosts are kept whole, and a non-default
/// port is retained so the root still addresses the serving host.
///
/// # Returns
///
/// * `Some(SiteRoot)` - The derived root
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use seekora::url::site_root;
///
/// let url = Url::parse("https://blog.example.com/post").unwrap();
/// assert_eq!(site_root(&url).unwrap().as_str(), "https://example.com");
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(site_root(&url).unwrap().as_str(), "http://127.0.0.1:8080");
/// ```
pub fn site_root(url: &Url) -> Option<SiteRoot> {
    let host = match url.host()? {
        Host::Domain(domain) => {
            let domain = domain.trim_end_matches('.');
            let labels: Vec<&str> = domain.split('.').collect();
            if labels.len() > 2 {
                labels[labels.len() - 2..].join(".")
            } else {
                domain.to_string()
            }
        }
        Host::Ipv4(addr) => addr.to_string(),
        Host::Ipv6(addr) => format!("[{}]", addr),
    };

    let root = match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    };

    Some(SiteRoot(root))
}

/// Extracts the scheme from a root string; empty when it has none
pub(crate) fn root_scheme(root: &str) -> &str {
    root.split_once("://").map(|(scheme, _)| scheme).unwrap_or("")
}

/// Extracts the host part from a root string such as `https://example.com:8443`
pub(crate) fn root_host(root: &str) -> &str {
    let rest = root.split_once("://").map(|(_, r)| r).unwrap_or(root);
    let rest = rest.split('/').next().unwrap_or(rest);

    if rest.starts_with('[') {
        return match rest.find(']') {
            Some(end) => &rest[..=end],
            None => rest,
        };
    }

    match rest.rsplit_once(':') {
        Some((host, port)) if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => {
            host
        }
        _ => rest,
    }
}
