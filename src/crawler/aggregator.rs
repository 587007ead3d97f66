//! Turning fetched pages into graph edges and votes

use crate::crawler::LinkExtractor;
use crate::state::PageUpdate;
use crate::url::{is_page_resource, site_root, vote_weight};
use url::Url;

/// Content handed from a fetch worker to the parse stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub url: String,
    pub content: String,
    pub depth: u32,
}

/// Extracts, filters and weights the links of one page
///
/// Every page-resource link produces an edge and a vote, whether or not it
/// will be followed. Links that do not parse or have no site root are
/// dropped without affecting the others.
pub fn aggregate_page(page: &FetchedPage, extractor: &dyn LinkExtractor) -> PageUpdate {
    let mut update = PageUpdate::new(page.url.as_str());

    let base = match Url::parse(&page.url) {
        Ok(base) => base,
        Err(e) => {
            tracing::debug!("Cannot parse fetched URL {}: {}", page.url, e);
            return update;
        }
    };
    let source_root = match site_root(&base) {
        Some(root) => root,
        None => return update,
    };

    for link in extractor.extract_links(&page.content, &base) {
        let target = match Url::parse(&link) {
            Ok(target) => target,
            Err(_) => continue,
        };
        if !is_page_resource(&target) {
            continue;
        }
        let Some(target_root) = site_root(&target) else {
            continue;
        };

        let weight = vote_weight(source_root.as_str(), target_root.as_str());
        update.push(link, target_root, weight);
    }

    update
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::HtmlLinkExtractor;
    use crate::url::SiteRoot;

    fn page(url: &str, content: &str) -> FetchedPage {
        FetchedPage {
            url: url.to_string(),
            content: content.to_string(),
            depth: 1,
        }
    }

    fn targets(update: &PageUpdate) -> Vec<&str> {
        update.edges.iter().map(|e| e.target.as_str()).collect()
    }

    #[test]
    fn test_weights_per_relation() {
        let html = r#"
            <a href="https://a.com/x">same</a>
            <a href="https://blog.a.com/post">sub, same root</a>
            <a href="https://b.com/y">other</a>
        "#;
        let update = aggregate_page(&page("https://a.com/", html), &HtmlLinkExtractor::new());

        let weights: Vec<(&str, f64)> = update
            .edges
            .iter()
            .map(|e| (e.target_root.as_str(), e.weight))
            .collect();
        assert_eq!(
            weights,
            vec![
                ("https://a.com", 0.1),
                ("https://a.com", 0.1),
                ("https://b.com", 1.0),
            ]
        );
    }

    #[test]
    fn test_filters_non_page_resources() {
        let html = r#"
            <a href="/about">no extension</a>
            <a href="/index.html">html</a>
            <a href="/old.HTM">htm</a>
            <a href="/logo.png">image</a>
            <a href="/app.js">script</a>
            <a href="/paper.pdf">pdf</a>
        "#;
        let update = aggregate_page(&page("https://a.com/", html), &HtmlLinkExtractor::new());

        assert_eq!(
            targets(&update),
            vec![
                "https://a.com/about",
                "https://a.com/index.html",
                "https://a.com/old.HTM",
            ]
        );
    }

    #[test]
    fn test_page_without_links_still_has_source() {
        let update = aggregate_page(
            &page("https://a.com/empty", "<html></html>"),
            &HtmlLinkExtractor::new(),
        );
        assert_eq!(update.source, "https://a.com/empty");
        assert!(update.edges.is_empty());
    }

    #[test]
    fn test_unparseable_source_yields_empty_update() {
        let update = aggregate_page(
            &page("not a url", r#"<a href="https://b.com/">b</a>"#),
            &HtmlLinkExtractor::new(),
        );
        assert_eq!(update.source, "not a url");
        assert!(update.edges.is_empty());
    }

    #[test]
    fn test_lookalike_roots_are_independent() {
        let html = r#"<a href="https://example.com/home">parent</a>"#;
        let update = aggregate_page(
            &page("https://shop.example.co/", html),
            &HtmlLinkExtractor::new(),
        );
        assert_eq!(update.edges[0].target_root, SiteRoot::new("https://example.com"));
        assert_eq!(update.edges[0].weight, 1.0);
    }
}
