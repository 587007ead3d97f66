//! URL handling module for Seekora
//!
//! This module provides site-root derivation, page-resource filtering,
//! start-URL preparation, and the vote weighting between two site roots.

mod filter;
mod matcher;
mod site_root;

use crate::UrlError;
use url::Url;

// Re-export main functions
pub use filter::is_page_resource;
pub use matcher::is_dot_suffix;
pub use site_root::{site_root, SiteRoot};

/// Weight of a link between pages of the same site
pub const SAME_SITE_WEIGHT: f64 = 0.1;

/// Weight of a link between a site and one of its subdomains (either direction)
pub const SIBLING_SITE_WEIGHT: f64 = 0.25;

/// Weight of a link between independent sites
pub const INDEPENDENT_SITE_WEIGHT: f64 = 1.0;

/// Relationship between the site roots at both ends of a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteRelation {
    /// Both roots are identical - internal navigation
    Same,
    /// One root's host is a dot-boundary suffix of the other's
    Sibling,
    /// Unrelated sites - an outright endorsement
    Independent,
}

impl SiteRelation {
    /// Returns the vote weight carried by a link with this relationship
    pub fn weight(&self) -> f64 {
        match self {
            Self::Same => SAME_SITE_WEIGHT,
            Self::Sibling => SIBLING_SITE_WEIGHT,
            Self::Independent => INDEPENDENT_SITE_WEIGHT,
        }
    }
}

/// Classifies the relationship between two site roots
///
/// Roots are compared as exact strings for `Same`. The scheme is part of a
/// root, so roots with different schemes are always `Independent`. Otherwise
/// the suffix test runs on the host part of both roots, in both directions.
///
/// # Examples
///
/// ```
/// use seekora::url::{classify_relation, SiteRelation};
///
/// assert_eq!(classify_relation("https://a.com", "https://a.com"), SiteRelation::Same);
/// assert_eq!(
///     classify_relation("https://shop.example.com", "https://example.com"),
///     SiteRelation::Sibling
/// );
/// assert_eq!(classify_relation("https://a.com", "https://b.com"), SiteRelation::Independent);
/// ```
pub fn classify_relation(source_root: &str, target_root: &str) -> SiteRelation {
    if source_root == target_root {
        return SiteRelation::Same;
    }

    if site_root::root_scheme(source_root) != site_root::root_scheme(target_root) {
        return SiteRelation::Independent;
    }

    let source_host = site_root::root_host(source_root);
    let target_host = site_root::root_host(target_root);

    if is_dot_suffix(source_host, target_host) || is_dot_suffix(target_host, source_host) {
        SiteRelation::Sibling
    } else {
        SiteRelation::Independent
    }
}

/// Computes the vote weight a link from `source_root` gives to `target_root`
pub fn vote_weight(source_root: &str, target_root: &str) -> f64 {
    classify_relation(source_root, target_root).weight()
}

/// Prepares a user-supplied start URL
///
/// Surrounding whitespace is trimmed and `https://` is assumed when no scheme
/// is given. The result must be an http or https URL with a host.
///
/// # Examples
///
/// ```
/// use seekora::url::prepare_start_url;
///
/// let url = prepare_start_url("example.com").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/");
/// ```
pub fn prepare_start_url(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Parse("empty start URL".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map(str::is_empty).unwrap_or(true) {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_root_weight() {
        assert_eq!(vote_weight("https://a.com", "https://a.com"), 0.1);
    }

    #[test]
    fn test_sibling_weight_is_symmetric() {
        assert_eq!(
            vote_weight("https://shop.example.com", "https://example.com"),
            0.25
        );
        assert_eq!(
            vote_weight("https://example.com", "https://shop.example.com"),
            0.25
        );
    }

    #[test]
    fn test_independent_weight() {
        assert_eq!(vote_weight("https://a.com", "https://b.com"), 1.0);
    }

    #[test]
    fn test_suffix_requires_dot_boundary() {
        assert_eq!(
            classify_relation("https://myexample.com", "https://example.com"),
            SiteRelation::Independent
        );
    }

    #[test]
    fn test_sibling_ignores_port() {
        assert_eq!(
            classify_relation("https://shop.example.com:8443", "https://example.com"),
            SiteRelation::Sibling
        );
    }

    #[test]
    fn test_scheme_variant_is_not_same() {
        assert_eq!(
            classify_relation("http://a.com", "https://a.com"),
            SiteRelation::Independent
        );
    }

    #[test]
    fn test_scheme_variant_of_subdomain_is_not_sibling() {
        assert_eq!(
            classify_relation("http://shop.example.com", "https://example.com"),
            SiteRelation::Independent
        );
        assert_eq!(
            vote_weight("https://example.com", "http://shop.example.com"),
            INDEPENDENT_SITE_WEIGHT
        );
        assert_eq!(
            classify_relation("http://shop.example.com", "http://example.com"),
            SiteRelation::Sibling
        );
    }

    #[test]
    fn test_relation_weights() {
        assert_eq!(SiteRelation::Same.weight(), SAME_SITE_WEIGHT);
        assert_eq!(SiteRelation::Sibling.weight(), SIBLING_SITE_WEIGHT);
        assert_eq!(SiteRelation::Independent.weight(), INDEPENDENT_SITE_WEIGHT);
    }

    #[test]
    fn test_prepare_adds_https() {
        let url = prepare_start_url("example.com/page").unwrap();
        assert_eq!(url.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_prepare_keeps_explicit_scheme() {
        let url = prepare_start_url("http://example.com/").unwrap();
        assert_eq!(url.as_str(), "http://example.com/");
    }

    #[test]
    fn test_prepare_trims_whitespace() {
        let url = prepare_start_url("  https://example.com/  \n").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_prepare_rejects_other_schemes() {
        assert!(matches!(
            prepare_start_url("ftp://example.com/"),
            Err(UrlError::InvalidScheme(_))
        ));
    }

    #[test]
    fn test_prepare_rejects_empty() {
        assert!(prepare_start_url("   ").is_err());
    }

    #[test]
    fn test_prepare_rejects_garbage() {
        assert!(prepare_start_url("https://").is_err());
    }
}
