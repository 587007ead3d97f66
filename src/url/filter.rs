use url::Url;

/// Checks whether a URL looks like a crawlable page
///
/// Only http and https URLs qualify, and the last path segment must either
/// have no extension or end in `.htm`/`.html` (case-insensitive). Images,
/// scripts, stylesheets and other resources are rejected.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use seekora::url::is_page_resource;
///
/// assert!(is_page_resource(&Url::parse("https://example.com/about").unwrap()));
/// assert!(is_page_resource(&Url::parse("https://example.com/index.HTML").unwrap()));
/// assert!(!is_page_resource(&Url::parse("https://example.com/logo.png").unwrap()));
/// ```
pub fn is_page_resource(url: &Url) -> bool {
    if url.scheme() != "http" && url.scheme() != "https" {
        return false;
    }

    let last_segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");

    match last_segment.rsplit_once('.') {
        None => true,
        Some((_, extension)) => {
            extension.eq_ignore_ascii_case("html") || extension.eq_ignore_ascii_case("htm")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(url: &str) -> bool {
        is_page_resource(&Url::parse(url).unwrap())
    }

    #[test]
    fn test_root_is_page() {
        assert!(check("https://example.com/"));
        assert!(check("https://example.com"));
    }

    #[test]
    fn test_extensionless_paths() {
        assert!(check("https://example.com/about"));
        assert!(check("https://example.com/blog/2024/post"));
        assert!(check("https://example.com/dir/"));
    }

    #[test]
    fn test_html_extensions() {
        assert!(check("https://example.com/index.html"));
        assert!(check("https://example.com/old/page.htm"));
        assert!(check("https://example.com/PAGE.HTML"));
    }

    #[test]
    fn test_query_does_not_count_as_extension() {
        assert!(check("https://example.com/search?q=a.png"));
    }

    #[test]
    fn test_dotted_directory_with_trailing_slash() {
        assert!(check("https://example.com/v1.2/"));
    }

    #[test]
    fn test_resources_rejected() {
        assert!(!check("https://example.com/logo.png"));
        assert!(!check("https://example.com/app.js"));
        assert!(!check("https://example.com/style.css"));
        assert!(!check("https://example.com/report.pdf"));
        assert!(!check("https://example.com/page.php"));
    }

    #[test]
    fn test_non_http_schemes_rejected() {
        assert!(!check("ftp://example.com/page"));
        assert!(!check("mailto:someone@example.com"));
    }
}
