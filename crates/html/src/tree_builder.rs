//! The tree construction stage: drives the tokenizer and turns its token stream into a
//! `Document`, following the WHATWG insertion-mode state machine in simplified form.
//! Implied end tags, a scope-checked stack of open elements, and foster parenting inside
//! tables are implemented; the full adoption-agency algorithm for misnested formatting
//! elements is reduced to "close back to the nearest matching formatting element",
//! documented as an accepted simplification.

use crate::tokenizer::{AttributeList, HtmlTokenizer, Token, TokenizerState};
use crate::tree::{Document, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InsertionMode {
    Initial,
    BeforeHtml,
    BeforeHead,
    InHead,
    AfterHead,
    InBody,
    Text,
    InTable,
    InTableBody,
    InRow,
    InCell,
    AfterBody,
    AfterAfterBody,
}

const FORMATTING_TAGS: &[&str] = &["a", "b", "i", "em", "strong", "u", "small", "s", "font"];

const VOID_TAGS: &[&str] =
    &["area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr"];

fn is_void(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

/// Tags whose scope boundary stops `has_element_in_scope` from walking further up the
/// open-elements stack. A reduced set covering the common containers.
const SCOPE_BOUNDARY_TAGS: &[&str] = &["html", "table", "td", "th", "caption", "applet", "marquee", "object"];

pub struct TreeBuilder {
    tokenizer: HtmlTokenizer,
    document: Document,
    mode: InsertionMode,
    open_elements: Vec<NodeId>,
}

impl TreeBuilder {
    pub fn new(html: &str) -> Self {
        Self {
            tokenizer: HtmlTokenizer::new(html),
            document: Document::new(),
            mode: InsertionMode::Initial,
            open_elements: Vec::new(),
        }
    }

    /// Run the tokenizer to exhaustion, building the document tree, and return it.
    pub fn parse(mut self) -> Document {
        loop {
            let token = self.tokenizer.next_token();
            let is_eof = matches!(token, Token::EndOfFile);
            self.process(token);
            if is_eof {
                break;
            }
        }
        self.document
    }

    fn current_node(&self) -> Option<NodeId> {
        self.open_elements.last().copied()
    }

    fn current_tag_name(&self) -> Option<String> {
        self.current_node().and_then(|id| self.document.tag_name_of(id).map(str::to_owned))
    }

    fn insert_element(&mut self, name: &str, attributes: AttributeList) -> NodeId {
        let parent = self.appropriate_insertion_parent();
        let node = self.document.create_element(name, attributes);
        self.document.append_child(parent, node);
        node
    }

    /// Inside a table-related insertion mode, element insertion that isn't itself
    /// table-structural is redirected ("foster parented") to just before the table in
    /// its original parent, matching the error-recovery behavior browsers rely on for
    /// markup like `<table><div>oops</div><tr>...`.
    fn appropriate_insertion_parent(&mut self) -> NodeId {
        let in_table_mode = matches!(self.mode, InsertionMode::InTable | InsertionMode::InTableBody | InsertionMode::InRow);
        if in_table_mode {
            if let Some(table_pos) = self.open_elements.iter().rposition(|&id| self.document.tag_name_of(id) == Some("table")) {
                let table = self.open_elements[table_pos];
                if let Some(parent) = self.document.parent(table) {
                    return parent;
                }
            }
        }
        self.current_node().unwrap_or(self.document.root)
    }

    fn foster_parent_before_table(&mut self, node: NodeId) {
        if let Some(table_pos) = self.open_elements.iter().rposition(|&id| self.document.tag_name_of(id) == Some("table")) {
            let table = self.open_elements[table_pos];
            if self.document.parent(table).is_some() {
                self.document.insert_before(node, table);
                return;
            }
        }
        let parent = self.current_node().unwrap_or(self.document.root);
        self.document.append_child(parent, node);
    }

    fn insert_text(&mut self, data: &str) {
        if matches!(self.mode, InsertionMode::InTable | InsertionMode::InTableBody | InsertionMode::InRow) {
            let node = self.document.create_text(data);
            self.foster_parent_before_table(node);
            return;
        }
        let parent = self.appropriate_insertion_parent();
        self.document.append_text(parent, data);
    }

    fn insert_comment(&mut self, data: &str) {
        let parent = self.appropriate_insertion_parent();
        let node = self.document.create_comment(data);
        self.document.append_child(parent, node);
    }

    fn push_open(&mut self, node: NodeId) {
        self.open_elements.push(node);
    }

    fn pop_open(&mut self) -> Option<NodeId> {
        self.open_elements.pop()
    }

    /// WHATWG "has an element in scope": walk the open-elements stack from the top,
    /// returning true if `tag` is found before a scope-boundary element.
    fn has_element_in_scope(&self, tag: &str) -> bool {
        for &id in self.open_elements.iter().rev() {
            let name = self.document.tag_name_of(id).unwrap_or_default();
            if name == tag {
                return true;
            }
            if SCOPE_BOUNDARY_TAGS.contains(&name) {
                return false;
            }
        }
        false
    }

    /// Pop elements off the stack (and close them) until one named `tag` has been
    /// popped, implementing the "generate implied end tags, then close `tag`" pattern
    /// used throughout `InBody`.
    fn close_element(&mut self, tag: &str) {
        while let Some(top) = self.pop_open() {
            if self.document.tag_name_of(top) == Some(tag) {
                break;
            }
        }
    }

    /// Close any currently open paragraph when a block-level start tag implies it, per
    /// the "</p> is implied" rule used throughout InBody.
    fn close_p_if_in_button_scope(&mut self) {
        if self.has_element_in_scope("p") {
            self.close_element("p");
        }
    }

    fn reset_insertion_mode(&mut self) {
        match self.current_tag_name().as_deref() {
            Some("table") => self.mode = InsertionMode::InTable,
            Some("tbody" | "thead" | "tfoot") => self.mode = InsertionMode::InTableBody,
            Some("tr") => self.mode = InsertionMode::InRow,
            Some("td" | "th") => self.mode = InsertionMode::InCell,
            Some("head") => self.mode = InsertionMode::InHead,
            Some("body") => self.mode = InsertionMode::InBody,
            _ => self.mode = InsertionMode::InBody,
        }
    }

    #[allow(clippy::too_many_lines, reason = "insertion-mode dispatch is one state machine")]
    fn process(&mut self, token: Token) {
        match self.mode {
            InsertionMode::Initial => match &token {
                Token::Character { data } if data.trim().is_empty() => {}
                Token::Doctype { name, .. } => {
                    let node = self.document.create_doctype(name.clone().unwrap_or_default());
                    self.document.append_child(self.document.root, node);
                    self.mode = InsertionMode::BeforeHtml;
                }
                _ => {
                    self.mode = InsertionMode::BeforeHtml;
                    self.process(token);
                }
            },

            InsertionMode::BeforeHtml => match &token {
                Token::Character { data } if data.trim().is_empty() => {}
                Token::StartTag { name, attributes, .. } if name == "html" => {
                    let node = self.document.create_element("html", attributes.clone());
                    self.document.append_child(self.document.root, node);
                    self.document.html_element = Some(node);
                    self.push_open(node);
                    self.mode = InsertionMode::BeforeHead;
                }
                Token::Comment { data } => self.insert_comment(data),
                _ => {
                    let node = self.document.create_element("html", AttributeList::new());
                    self.document.append_child(self.document.root, node);
                    self.document.html_element = Some(node);
                    self.push_open(node);
                    self.mode = InsertionMode::BeforeHead;
                    self.process(token);
                }
            },

            InsertionMode::BeforeHead => match &token {
                Token::Character { data } if data.trim().is_empty() => {}
                Token::StartTag { name, attributes, .. } if name == "head" => {
                    let node = self.insert_element("head", attributes.clone());
                    self.document.head_element = Some(node);
                    self.push_open(node);
                    self.mode = InsertionMode::InHead;
                }
                Token::Comment { data } => self.insert_comment(data),
                _ => {
                    let node = self.insert_element("head", AttributeList::new());
                    self.document.head_element = Some(node);
                    self.push_open(node);
                    self.mode = InsertionMode::InHead;
                    self.process(token);
                }
            },

            InsertionMode::InHead => match &token {
                Token::Character { data } if data.trim().is_empty() => self.insert_text(data),
                Token::Comment { data } => self.insert_comment(data),
                Token::StartTag { name, attributes, self_closing } if matches!(name.as_str(), "meta" | "link" | "base") => {
                    self.insert_element(name, attributes.clone());
                    if *self_closing || is_void(name) {
                        self.pop_open();
                    }
                }
                Token::StartTag { name, attributes, .. } if name == "title" => {
                    let node = self.insert_element("title", attributes.clone());
                    self.push_open(node);
                    self.tokenizer.set_state(TokenizerState::RcData);
                    self.tokenizer.set_last_start_tag("title");
                    self.mode = InsertionMode::Text;
                }
                Token::StartTag { name, attributes, .. } if name == "style" => {
                    let node = self.insert_element("style", attributes.clone());
                    self.push_open(node);
                    self.tokenizer.set_state(TokenizerState::RawText);
                    self.tokenizer.set_last_start_tag("style");
                    self.mode = InsertionMode::Text;
                }
                Token::StartTag { name, attributes, .. } if name == "script" => {
                    let node = self.insert_element("script", attributes.clone());
                    self.push_open(node);
                    self.tokenizer.set_state(TokenizerState::ScriptData);
                    self.tokenizer.set_last_start_tag("script");
                    self.mode = InsertionMode::Text;
                }
                Token::EndTag { name } if name == "head" => {
                    self.close_element("head");
                    self.mode = InsertionMode::AfterHead;
                }
                _ => {
                    self.close_element("head");
                    self.mode = InsertionMode::AfterHead;
                    self.process(token);
                }
            },

            InsertionMode::AfterHead => match &token {
                Token::Character { data } if data.trim().is_empty() => self.insert_text(data),
                Token::Comment { data } => self.insert_comment(data),
                Token::StartTag { name, attributes, .. } if name == "body" => {
                    let node = self.insert_element("body", attributes.clone());
                    self.document.body_element = Some(node);
                    self.push_open(node);
                    self.mode = InsertionMode::InBody;
                }
                _ => {
                    let node = self.insert_element("body", AttributeList::new());
                    self.document.body_element = Some(node);
                    self.push_open(node);
                    self.mode = InsertionMode::InBody;
                    self.process(token);
                }
            },

            InsertionMode::Text => match token {
                Token::Character { data } => self.insert_text(&data),
                Token::EndOfFile => {
                    self.pop_open();
                    self.mode = InsertionMode::InBody;
                    self.process(Token::EndOfFile);
                }
                Token::EndTag { .. } => {
                    self.pop_open();
                    self.mode = InsertionMode::InBody;
                }
                _ => {}
            },

            InsertionMode::InTable => self.process_in_table(token),
            InsertionMode::InTableBody => self.process_in_table_body(token),
            InsertionMode::InRow => self.process_in_row(token),
            InsertionMode::InCell => self.process_in_cell(token),

            InsertionMode::InBody => self.process_in_body(token),

            InsertionMode::AfterBody => match &token {
                Token::Character { data } if data.trim().is_empty() => self.insert_text(data),
                Token::Comment { data } => self.insert_comment(data),
                Token::EndTag { name } if name == "html" => self.mode = InsertionMode::AfterAfterBody,
                Token::EndOfFile => {}
                _ => {
                    self.mode = InsertionMode::InBody;
                    self.process(token);
                }
            },

            InsertionMode::AfterAfterBody => match &token {
                Token::Comment { data } => self.insert_comment(data),
                Token::Character { data } if data.trim().is_empty() => self.insert_text(data),
                Token::EndOfFile => {}
                _ => {
                    self.mode = InsertionMode::InBody;
                    self.process(token);
                }
            },
        }
    }

    fn process_in_body(&mut self, token: Token) {
        match token {
            Token::Character { data } => self.insert_text(&data),
            Token::Comment { data } => self.insert_comment(&data),

            Token::StartTag { name, attributes, self_closing } => {
                match name.as_str() {
                    "html" => {}
                    "p" | "div" | "section" | "article" | "header" | "footer" | "nav" | "aside" | "ul" | "ol" | "dl"
                    | "blockquote" | "figure" | "figcaption" | "main" => {
                        if name == "p" {
                            self.close_p_if_in_button_scope();
                        }
                        let node = self.insert_element(&name, attributes);
                        self.push_open(node);
                    }
                    "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                        self.close_p_if_in_button_scope();
                        let node = self.insert_element(&name, attributes);
                        self.push_open(node);
                    }
                    "li" | "dt" | "dd" => {
                        let node = self.insert_element(&name, attributes);
                        self.push_open(node);
                    }
                    "table" => {
                        self.close_p_if_in_button_scope();
                        let node = self.insert_element("table", attributes);
                        self.push_open(node);
                        self.mode = InsertionMode::InTable;
                    }
                    _ if is_void(&name) => {
                        self.insert_element(&name, attributes);
                    }
                    _ if self_closing => {
                        self.insert_element(&name, attributes);
                    }
                    _ => {
                        let node = self.insert_element(&name, attributes);
                        self.push_open(node);
                    }
                }
            }

            Token::EndTag { name } => match name.as_str() {
                "p" => {
                    if !self.has_element_in_scope("p") {
                        let node = self.insert_element("p", AttributeList::new());
                        self.push_open(node);
                    }
                    self.close_element("p");
                }
                "html" => {
                    self.mode = InsertionMode::AfterBody;
                }
                _ if FORMATTING_TAGS.contains(&name.as_str()) => {
                    // Simplified adoption agency: close back to the nearest open
                    // element with a matching tag name instead of the full
                    // reconstruction/reparenting algorithm.
                    if let Some(pos) = self.open_elements.iter().rposition(|&id| self.document.tag_name_of(id) == Some(name.as_str())) {
                        self.open_elements.truncate(pos);
                    }
                }
                _ => {
                    if self.has_element_in_scope(&name) {
                        self.close_element(&name);
                    }
                }
            },

            Token::EndOfFile => {}
            Token::Doctype { .. } => {}
        }
    }

    fn process_in_table(&mut self, token: Token) {
        match &token {
            Token::StartTag { name, attributes, .. } if name == "tbody" || name == "thead" || name == "tfoot" => {
                let node = self.insert_element(name, attributes.clone());
                self.push_open(node);
                self.mode = InsertionMode::InTableBody;
            }
            Token::StartTag { name, .. } if name == "tr" => {
                let node = self.insert_element("tbody", AttributeList::new());
                self.push_open(node);
                self.mode = InsertionMode::InTableBody;
                self.process_in_table_body(token);
            }
            Token::StartTag { name, attributes, .. } if name == "caption" => {
                let node = self.insert_element("caption", attributes.clone());
                self.push_open(node);
            }
            Token::EndTag { name } if name == "table" => {
                self.close_element("table");
                self.reset_insertion_mode();
            }
            Token::Character { data } => self.insert_text(data),
            _ => self.process_in_body(token),
        }
    }

    fn process_in_table_body(&mut self, token: Token) {
        match &token {
            Token::StartTag { name, attributes, .. } if name == "tr" => {
                let node = self.insert_element("tr", attributes.clone());
                self.push_open(node);
                self.mode = InsertionMode::InRow;
            }
            Token::EndTag { name } if matches!(name.as_str(), "tbody" | "thead" | "tfoot") => {
                self.close_element(name);
                self.mode = InsertionMode::InTable;
            }
            Token::EndTag { name } if name == "table" => {
                self.close_element("tbody");
                self.mode = InsertionMode::InTable;
                self.process_in_table(token);
            }
            _ => self.process_in_table(token),
        }
    }

    fn process_in_row(&mut self, token: Token) {
        match &token {
            Token::StartTag { name, attributes, .. } if name == "td" || name == "th" => {
                let node = self.insert_element(name, attributes.clone());
                self.push_open(node);
                self.mode = InsertionMode::InCell;
            }
            Token::EndTag { name } if name == "tr" => {
                self.close_element("tr");
                self.mode = InsertionMode::InTableBody;
            }
            Token::EndTag { name } if matches!(name.as_str(), "tbody" | "thead" | "tfoot" | "table") => {
                self.close_element("tr");
                self.mode = InsertionMode::InTableBody;
                self.process_in_table_body(token);
            }
            _ => self.process_in_table(token),
        }
    }

    fn process_in_cell(&mut self, token: Token) {
        match &token {
            Token::EndTag { name } if name == "td" || name == "th" => {
                self.close_element(name);
                self.mode = InsertionMode::InRow;
            }
            Token::EndTag { name } if matches!(name.as_str(), "tr" | "tbody" | "thead" | "tfoot" | "table") => {
                self.close_element("td");
                self.mode = InsertionMode::InRow;
                self.process_in_row(token);
            }
            _ => self.process_in_body(token),
        }
    }
}

/// Parse a complete HTML document string into a `Document`.
pub fn parse_document(html: &str) -> Document {
    TreeBuilder::new(html).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child_tags(doc: &Document, node: NodeId) -> Vec<String> {
        doc.children(node).iter().filter_map(|&id| doc.tag_name_of(id).map(str::to_owned)).collect()
    }

    #[test]
    fn minimal_document_gets_html_head_body() {
        let doc = parse_document("<html><head></head><body></body></html>");
        assert!(doc.html_element.is_some());
        assert!(doc.head_element.is_some());
        assert!(doc.body_element.is_some());
    }

    #[test]
    fn missing_html_head_body_are_implied() {
        let doc = parse_document("<p>hi</p>");
        assert!(doc.html_element.is_some());
        assert!(doc.body_element.is_some());
        let body = doc.body_element.unwrap();
        assert_eq!(child_tags(&doc, body), vec!["p"]);
    }

    #[test]
    fn unclosed_paragraph_is_implicitly_closed_by_next_block() {
        let doc = parse_document("<p>one<p>two");
        let body = doc.body_element.unwrap();
        assert_eq!(child_tags(&doc, body), vec!["p", "p"]);
    }

    #[test]
    fn title_text_uses_rcdata_and_decodes_entities() {
        let doc = parse_document("<html><head><title>A &amp; B</title></head><body></body></html>");
        let head = doc.head_element.unwrap();
        let title = doc.children(head)[0];
        let text = doc.children(title)[0];
        assert_eq!(doc.data(text).text_data(), Some("A & B"));
    }

    #[test]
    fn table_structure_gets_implied_tbody() {
        let doc = parse_document("<table><tr><td>x</td></tr></table>");
        let body = doc.body_element.unwrap();
        let table = doc.children(body)[0];
        assert_eq!(child_tags(&doc, table), vec!["tbody"]);
        let tbody = doc.children(table)[0];
        assert_eq!(child_tags(&doc, tbody), vec!["tr"]);
    }

    #[test]
    fn stray_table_text_is_foster_parented_before_table() {
        let doc = parse_document("<table>oops<tr><td>x</td></tr></table>");
        let body = doc.body_element.unwrap();
        let children = doc.children(body);
        assert_eq!(children.len(), 2);
        assert!(doc.data(children[0]).is_text());
        assert_eq!(doc.tag_name_of(children[1]), Some("table"));
    }

    #[test]
    fn void_elements_do_not_nest_following_content() {
        let doc = parse_document("<div><br>after</div>");
        let body = doc.body_element.unwrap();
        let div = doc.children(body)[0];
        assert_eq!(child_tags(&doc, div), vec!["br"]);
        let text = doc.children(div)[1];
        assert_eq!(doc.data(text).text_data(), Some("after"));
    }

    #[test]
    fn id_attribute_is_queryable_after_parse() {
        let doc = parse_document(r#"<div id="app"><span>hi</span></div>"#);
        assert!(doc.get_element_by_id("app").is_some());
    }
}
