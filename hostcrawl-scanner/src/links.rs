use scraper::{Html, Selector};
use std::sync::LazyLock;

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static selector is valid"));

/// Pulls hyperlink targets out of a response body.
pub trait LinkExtractor: Send + Sync + 'static {
    /// Every link target in document order, absolute or relative, unresolved.
    fn extract(&self, body: &str) -> Vec<String>;
}

/// Collects the `href` of every `<a>` element.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlLinkExtractor;

impl LinkExtractor for HtmlLinkExtractor {
    fn extract(&self, body: &str) -> Vec<String> {
        let document = Html::parse_document(body);
        document
            .select(&ANCHOR_SELECTOR)
            .filter_map(|element| element.value().attr("href"))
            .map(|href| href.trim().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_in_document_order() {
        let html = r#"
            <html><body>
                <a href="/p1">One</a>
                <p><a href="http://b.test/x">Two</a></p>
                <a href="relative">Three</a>
            </body></html>
        "#;
        let links = HtmlLinkExtractor.extract(html);
        assert_eq!(links, vec!["/p1", "http://b.test/x", "relative"]);
    }

    #[test]
    fn test_extract_skips_anchors_without_href() {
        let html = r#"<a name="top">Top</a><a href="/x">X</a>"#;
        assert_eq!(HtmlLinkExtractor.extract(html), vec!["/x"]);
    }

    #[test]
    fn test_extract_keeps_duplicates_and_fragments() {
        let html = r##"<a href="/x#a">A</a><a href="/x#b">B</a><a href="#top">T</a>"##;
        assert_eq!(HtmlLinkExtractor.extract(html), vec!["/x#a", "/x#b", "#top"]);
    }

    #[test]
    fn test_extract_trims_whitespace() {
        let html = r#"<a href="  /spaced  ">S</a>"#;
        assert_eq!(HtmlLinkExtractor.extract(html), vec!["/spaced"]);
    }

    #[test]
    fn test_extract_invalid_data() {
        assert!(HtmlLinkExtractor.extract("asd").is_empty());
        assert!(HtmlLinkExtractor.extract("").is_empty());
    }
}
