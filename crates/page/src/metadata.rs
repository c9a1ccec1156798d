//! Page-level metadata extraction: a single walk of the finished DOM picks out
//! `<title>`/first-`<h1>`, `<link rel=icon>`, and `<meta http-equiv=refresh>`. The
//! tree builder itself stays ignorant of any of this -- it is cheaper and easier to
//! reason about as one pass over the already-built tree than as special cases woven
//! into insertion-mode dispatch.

use html::{Document, NodeData, NodeId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMetadata {
    pub page_title: String,
    pub favicon_url: String,
    /// `href`s of every `<link rel=stylesheet>` the shell must fetch and parse
    /// before a re-render will reflect the sheet (the core does not fetch).
    pub stylesheet_links: Vec<String>,
    pub meta_refresh_delay: Option<f32>,
    pub meta_refresh_url: Option<String>,
}

fn text_content(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    for descendant in doc.descendants(node) {
        if let NodeData::Text { data } = doc.data(descendant) {
            out.push_str(data);
        }
    }
    out.trim().to_owned()
}

fn rel_tokens(rel: &str) -> impl Iterator<Item = &str> {
    rel.split_ascii_whitespace()
}

/// `content="5; url=https://example.com/next"` -> `(5.0, Some("https://example.com/next"))`.
/// A bare `content="5"` (no `url=`) refreshes the current page after the delay.
fn parse_meta_refresh(content: &str) -> (Option<f32>, Option<String>) {
    let mut parts = content.splitn(2, ';');
    let delay = parts.next().and_then(|value| value.trim().parse::<f32>().ok());
    let url = parts.next().and_then(|rest| {
        let rest = rest.trim();
        rest.strip_prefix("url=").or_else(|| rest.strip_prefix("URL=")).map(|value| value.trim_matches(['"', '\'']).to_owned())
    });
    (delay, url)
}

/// Extract `page_title`, `favicon_url`, pending stylesheet links, and meta-refresh
/// directives from a finished `Document`. `page_title` prefers `<title>` text; if the
/// document has none (or it is blank), the first `<h1>`'s text content is used
/// instead.
pub fn extract_metadata(doc: &Document) -> PageMetadata {
    let mut metadata = PageMetadata { favicon_url: "/favicon.ico".to_owned(), ..PageMetadata::default() };
    let mut first_h1: Option<String> = None;

    for node in doc.descendants(doc.root) {
        let NodeData::Element { tag_name, .. } = doc.data(node) else { continue };
        match tag_name.as_str() {
            "title" if metadata.page_title.is_empty() => {
                metadata.page_title = text_content(doc, node);
            }
            "h1" if first_h1.is_none() => {
                first_h1 = Some(text_content(doc, node));
            }
            "link" => {
                let Some(rel) = doc.data(node).attribute("rel") else { continue };
                let Some(href) = doc.data(node).attribute("href") else { continue };
                if rel_tokens(rel).any(|token| token.eq_ignore_ascii_case("icon") || token.eq_ignore_ascii_case("shortcut icon")) {
                    metadata.favicon_url = href.to_owned();
                } else if rel_tokens(rel).any(|token| token.eq_ignore_ascii_case("stylesheet")) {
                    metadata.stylesheet_links.push(href.to_owned());
                }
            }
            "meta" => {
                let is_refresh = doc.data(node).attribute("http-equiv").is_some_and(|value| value.eq_ignore_ascii_case("refresh"));
                if is_refresh {
                    if let Some(content) = doc.data(node).attribute("content") {
                        let (delay, url) = parse_meta_refresh(content);
                        metadata.meta_refresh_delay = delay;
                        metadata.meta_refresh_url = url;
                    }
                }
            }
            _ => {}
        }
    }

    if metadata.page_title.is_empty() {
        metadata.page_title = first_h1.unwrap_or_default();
    }

    metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use html::tree_builder::parse_document;

    #[test]
    fn title_element_wins_over_h1() {
        let doc = parse_document("<html><head><title>Hi</title></head><body><h1>Fallback</h1></body></html>");
        let metadata = extract_metadata(&doc);
        assert_eq!(metadata.page_title, "Hi");
    }

    #[test]
    fn first_h1_is_the_fallback_title() {
        let doc = parse_document("<html><body><h1>Heading</h1></body></html>");
        let metadata = extract_metadata(&doc);
        assert_eq!(metadata.page_title, "Heading");
    }

    #[test]
    fn favicon_defaults_when_no_icon_link_present() {
        let doc = parse_document("<html><body></body></html>");
        assert_eq!(extract_metadata(&doc).favicon_url, "/favicon.ico");
    }

    #[test]
    fn icon_link_overrides_the_default_favicon() {
        let doc = parse_document(r#"<link rel="icon" href="/static/icon.png">"#);
        assert_eq!(extract_metadata(&doc).favicon_url, "/static/icon.png");
    }

    #[test]
    fn stylesheet_links_are_collected_in_document_order() {
        let doc = parse_document(r#"<link rel="stylesheet" href="a.css"><link rel="stylesheet" href="b.css">"#);
        assert_eq!(extract_metadata(&doc).stylesheet_links, vec!["a.css", "b.css"]);
    }

    #[test]
    fn meta_refresh_with_url_is_parsed() {
        let doc = parse_document(r#"<meta http-equiv="refresh" content="5; url=https://example.com/next">"#);
        let metadata = extract_metadata(&doc);
        assert_eq!(metadata.meta_refresh_delay, Some(5.0));
        assert_eq!(metadata.meta_refresh_url.as_deref(), Some("https://example.com/next"));
    }

    #[test]
    fn meta_refresh_without_url_refreshes_in_place() {
        let doc = parse_document(r#"<meta http-equiv="refresh" content="10">"#);
        let metadata = extract_metadata(&doc);
        assert_eq!(metadata.meta_refresh_delay, Some(10.0));
        assert_eq!(metadata.meta_refresh_url, None);
    }
}
