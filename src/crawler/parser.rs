//! HTML link extraction
//!
//! The engine only depends on the `LinkExtractor` contract; `HtmlLinkExtractor`
//! is the default implementation built on scraper.

use scraper::{Html, Selector};
use url::Url;

/// Turns page content into candidate absolute link targets
///
/// Implementations resolve relative references against `base` and return
/// absolute http/https URLs in document order. Hrefs that cannot be resolved
/// are dropped silently; they never fail the whole page.
pub trait LinkExtractor: Send + Sync {
    fn extract_links(&self, content: &str, base: &Url) -> Vec<String>;
}

/// Default extractor parsing HTML with scraper
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<link rel="stylesheet" ...>`, `<script src="...">`, `<img src="...">`
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links (same page anchors)
///
/// Fragments are stripped from the resolved URLs.
///
/// # Example
///
/// ```
/// use seekora::crawler::{HtmlLinkExtractor, LinkExtractor};
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page#top">Link</a></body></html>"#;
/// let base = Url::parse("https://example.com/").unwrap();
/// let links = HtmlLinkExtractor::new().extract_links(html, &base);
/// assert_eq!(links, vec!["https://example.com/page".to_string()]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl HtmlLinkExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl LinkExtractor for HtmlLinkExtractor {
    fn extract_links(&self, content: &str, base: &Url) -> Vec<String> {
        let document = Html::parse_document(content);
        let mut links = Vec::new();

        // Extract links from <a> tags
        if let Ok(a_selector) = Selector::parse("a[href]") {
            for element in document.select(&a_selector) {
                // Skip if it has the download attribute
                if element.value().attr("download").is_some() {
                    continue;
                }

                if let Some(href) = element.value().attr("href") {
                    if let Some(absolute_url) = resolve_link(href, base) {
                        links.push(absolute_url);
                    }
                }
            }
        }

        // Extract canonical link
        if let Ok(canonical_selector) = Selector::parse("link[rel='canonical'][href]") {
            for element in document.select(&canonical_selector) {
                if let Some(href) = element.value().attr("href") {
                    if let Some(absolute_url) = resolve_link(href, base) {
                        links.push(absolute_url);
                    }
                }
            }
        }

        links
    }
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only references
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }

    absolute_url.set_fragment(None);
    Some(absolute_url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    fn links(html: &str) -> Vec<String> {
        HtmlLinkExtractor::new().extract_links(html, &base_url())
    }

    #[test]
    fn test_extract_absolute_link() {
        let links = links(r#"<html><body><a href="https://other.com/page">Link</a></body></html>"#);
        assert_eq!(links, vec!["https://other.com/page"]);
    }

    #[test]
    fn test_extract_relative_link() {
        let links = links(r#"<html><body><a href="/other">Link</a></body></html>"#);
        assert_eq!(links, vec!["https://example.com/other"]);
    }

    #[test]
    fn test_extract_relative_path_link() {
        let links = links(r#"<html><body><a href="other">Link</a></body></html>"#);
        assert_eq!(links, vec!["https://example.com/other"]);
    }

    #[test]
    fn test_skip_special_schemes() {
        let html = r#"
            <html><body>
                <a href="javascript:void(0)">JS</a>
                <a href="JavaScript:alert(1)">JS</a>
                <a href="mailto:test@example.com">Email</a>
                <a href="tel:+1234567890">Call</a>
                <a href="data:text/html,<h1>Test</h1>">Data</a>
                <a href="ftp://example.com/file">FTP</a>
            </body></html>
        "#;
        assert!(links(html).is_empty());
    }

    #[test]
    fn test_skip_download_link() {
        let links = links(r#"<html><body><a href="/file.pdf" download>Download</a></body></html>"#);
        assert!(links.is_empty());
    }

    #[test]
    fn test_skip_fragment_only() {
        let links = links(r##"<html><body><a href="#section">Jump</a></body></html>"##);
        assert!(links.is_empty());
    }

    #[test]
    fn test_fragment_is_stripped() {
        let links = links(r##"<html><body><a href="/doc#part-2">Doc</a></body></html>"##);
        assert_eq!(links, vec!["https://example.com/doc"]);
    }

    #[test]
    fn test_follow_nofollow_links() {
        let links = links(r#"<html><body><a href="/page" rel="nofollow">Link</a></body></html>"#);
        assert_eq!(links, vec!["https://example.com/page"]);
    }

    #[test]
    fn test_extract_canonical_link() {
        let html = r#"<html><head><link rel="canonical" href="https://example.com/canonical" /></head><body></body></html>"#;
        assert!(links(html).contains(&"https://example.com/canonical".to_string()));
    }

    #[test]
    fn test_document_order_and_duplicates_kept() {
        let html = r#"
            <html>
            <body>
                <a href="/page1">Link 1</a>
                <a href="https://other.com/page3">Link 3</a>
                <a href="/page1">Link 1 again</a>
            </body>
            </html>
        "#;
        assert_eq!(
            links(html),
            vec![
                "https://example.com/page1",
                "https://other.com/page3",
                "https://example.com/page1",
            ]
        );
    }

    #[test]
    fn test_malformed_hrefs_dropped() {
        let html = r#"
            <html>
            <body>
                <a href="/valid">Valid</a>
                <a href="http://[::1">Broken</a>
                <a href="   ">Blank</a>
                <a href="/another-valid">Valid</a>
            </body>
            </html>
        "#;
        assert_eq!(
            links(html),
            vec!["https://example.com/valid", "https://example.com/another-valid"]
        );
    }

    #[test]
    fn test_not_html_yields_nothing() {
        assert!(links("This is plain text with no markup").is_empty());
    }
}
