//! Box-tree construction: walks the styled DOM and produces an unpositioned
//! `LayoutNode` tree, synthesizing anonymous block boxes around inline runs (§4.5) and
//! `::before`/`::after` pseudo boxes (§4.4) along the way. Positioning happens in a
//! later pass (`block`/`inline`/`flex`/`position`).

use css::computed::{ComputedStyle, Display};
use css::{resolve_pseudo_element, value::CssValue, StyleSheet};
use html::{Document, NodeData, NodeId};

use crate::box_tree::{LayoutNode, Mode};
use crate::style_tree::StyledTree;

/// Collapse runs of ASCII whitespace to a single space, matching how an inline
/// formatting context treats source whitespace once it reaches layout (§4.2's
/// "elsewhere it becomes text nodes" combined with the usual collapsing rule).
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    out
}

fn pseudo_content_text(value: &CssValue) -> Option<String> {
    match value {
        CssValue::String(text) => Some(text.clone()),
        CssValue::Keyword(keyword) if keyword != "none" && keyword != "normal" => Some(keyword.clone()),
        _ => None,
    }
}

/// Build the full box tree rooted at `root_node` (usually the `<html>` element, or the
/// document's body). Returns `None` only if the root itself is `display: none`.
pub fn build_box_tree(
    doc: &Document,
    styled: &StyledTree,
    root_node: NodeId,
    sheets: &[&StyleSheet],
    viewport: (f32, f32),
) -> Option<LayoutNode> {
    let mut next_details_id = 0u32;
    build_node(doc, styled, root_node, sheets, viewport, &mut next_details_id, None)
}

#[allow(clippy::too_many_arguments, reason = "threading the details-id counter through recursion needs one more parameter than the public entry point")]
fn build_node(
    doc: &Document,
    styled: &StyledTree,
    node: NodeId,
    sheets: &[&StyleSheet],
    viewport: (f32, f32),
    next_details_id: &mut u32,
    enclosing_details_id: Option<u32>,
) -> Option<LayoutNode> {
    let &index = styled.index_of.get(&node)?;
    let style = &styled.styles[index];
    if style.display == Display::None {
        return None;
    }

    let tag = doc.tag_name_of(node).map(str::to_ascii_lowercase);
    let mut layout_node = LayoutNode::from_style(style, Some(node));
    if let Some(tag) = tag.clone() {
        layout_node = layout_node.with_tag(tag);
    }

    // <summary> inherits its enclosing <details>'s stable id; <details> mints its own
    // and hands it down to descendants so a nested <summary> still finds it (§4.6).
    let details_id_for_children = if tag.as_deref() == Some("details") {
        let id = *next_details_id;
        *next_details_id += 1;
        layout_node.details_id = Some(id);
        Some(id)
    } else {
        enclosing_details_id
    };
    if tag.as_deref() == Some("summary") {
        layout_node.details_id = enclosing_details_id;
    }

    let mut children = Vec::new();

    if let Some((pseudo_style, content)) = resolve_pseudo_element(&styled.arena, index, style, sheets, "before", viewport) {
        if let Some(text) = pseudo_content_text(&content) {
            children.push(pseudo_box(&pseudo_style, text));
        }
    }

    for child in doc.children(node) {
        match doc.data(child) {
            NodeData::Element { .. } => {
                if let Some(child_node) =
                    build_node(doc, styled, child, sheets, viewport, next_details_id, details_id_for_children)
                {
                    children.push(child_node);
                }
            }
            NodeData::Text { data } => {
                let collapsed = collapse_whitespace(data);
                if !collapsed.trim().is_empty() {
                    children.push(LayoutNode::leaf_text(collapsed, style));
                }
            }
            NodeData::Document | NodeData::Comment { .. } | NodeData::Doctype { .. } => {}
        }
    }

    if let Some((pseudo_style, content)) = resolve_pseudo_element(&styled.arena, index, style, sheets, "after", viewport) {
        if let Some(text) = pseudo_content_text(&content) {
            children.push(pseudo_box(&pseudo_style, text));
        }
    }

    layout_node.children = if layout_node.mode == Mode::Block { wrap_anonymous_blocks(style, children) } else { children };
    Some(layout_node)
}

fn pseudo_box(style: &ComputedStyle, text: String) -> LayoutNode {
    let mut node = LayoutNode::from_style(style, None);
    node.mode = Mode::Inline;
    node.children = vec![LayoutNode::leaf_text(text, style)];
    node
}

/// Group consecutive inline-level children into anonymous block boxes so a block
/// formatting context parent only ever sees block-level children (§4.5). A no-op when
/// every child is already block-level, or every child is inline (pure inline parent).
fn wrap_anonymous_blocks(parent_style: &ComputedStyle, children: Vec<LayoutNode>) -> Vec<LayoutNode> {
    let has_block_child = children.iter().any(LayoutNode::is_inline_level).then_some(()).and(
        children.iter().any(|child| !child.is_inline_level()).then_some(()),
    );
    if has_block_child.is_none() {
        return children;
    }

    let mut out = Vec::new();
    let mut run = Vec::new();
    for child in children {
        if child.is_inline_level() {
            run.push(child);
        } else {
            if !run.is_empty() {
                let mut anon = LayoutNode::anonymous_block(parent_style);
                anon.children = std::mem::take(&mut run);
                out.push(anon);
            }
            out.push(child);
        }
    }
    if !run.is_empty() {
        let mut anon = LayoutNode::anonymous_block(parent_style);
        anon.children = run;
        out.push(anon);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style_tree::build_styled_tree;
    use css::parse_stylesheet;
    use html::tree_builder::parse_document;

    #[test]
    fn display_none_element_is_absent_from_box_tree() {
        let doc = parse_document(r#"<div><p style="display:none">hidden</p><span>shown</span></div>"#);
        let styled = build_styled_tree(&doc, &[], (800.0, 600.0), &|_| Vec::new());
        let root = doc.children(doc.root)[0];
        let tree = build_box_tree(&doc, &styled, root, &[], (800.0, 600.0)).unwrap();
        assert_eq!(tree.children.len(), 1);
    }

    #[test]
    fn mixed_inline_and_block_children_get_wrapped_in_anonymous_blocks() {
        let doc = parse_document("<div>text<p>para</p></div>");
        let styled = build_styled_tree(&doc, &[], (800.0, 600.0), &|_| Vec::new());
        let root = doc.children(doc.root)[0];
        let tree = build_box_tree(&doc, &styled, root, &[], (800.0, 600.0)).unwrap();
        assert_eq!(tree.children.len(), 2);
        assert!(tree.children[0].is_anonymous);
        assert!(!tree.children[1].is_anonymous);
    }

    #[test]
    fn before_pseudo_with_content_inserts_synthetic_box() {
        let doc = parse_document("<p>hi</p>");
        let sheet = parse_stylesheet("p::before { content: \"> \" }");
        let styled = build_styled_tree(&doc, &[&sheet], (800.0, 600.0), &|_| Vec::new());
        let root = doc.children(doc.root)[0];
        let tree = build_box_tree(&doc, &styled, root, &[&sheet], (800.0, 600.0)).unwrap();
        assert_eq!(tree.children.first().and_then(|c| c.children.first()).and_then(|c| c.text.as_deref()), Some("> "));
    }
}
