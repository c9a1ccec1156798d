//! Bridges the DOM (`html`) and the cascade (`css`): builds an `ElementViewArena` from
//! a parsed document, then resolves a `ComputedStyle` per element in document order so
//! inheritance flows parent-to-child in a single pass.

use std::collections::HashMap;

use css::element_view::{ElementView, ElementViewArena};
use css::{parse_inline_style, resolve_style, ComputedStyle, StyleSheet};
use html::{Document, NodeData, NodeId};

/// The product of the style pass: the flat element-view arena (for re-matching, e.g.
/// `::before`/`::after`), a `NodeId <-> arena index` mapping, and one `ComputedStyle`
/// per arena index.
pub struct StyledTree {
    pub arena: ElementViewArena,
    pub index_of: HashMap<NodeId, usize>,
    pub node_of: Vec<NodeId>,
    pub styles: Vec<ComputedStyle>,
}

/// Runtime-state markers the shell injects per element before a render (`hover`,
/// `focus`, `active`, `target`) since the core itself has no event loop (§4.4).
pub type MarkerLookup<'a> = dyn Fn(NodeId) -> Vec<String> + 'a;

fn collect_element_children(doc: &Document, parent: NodeId) -> Vec<NodeId> {
    doc.children(parent).into_iter().filter(|&child| doc.data(child).is_element()).collect()
}

fn has_nonblank_text_child(doc: &Document, node: NodeId) -> bool {
    doc.children(node).iter().any(|&child| matches!(doc.data(child), NodeData::Text { data } if !data.trim().is_empty()))
}

fn classes_of(attributes: &[(String, String)]) -> Vec<String> {
    attributes
        .iter()
        .find(|(key, _)| key == "class")
        .map(|(_, value)| value.split_ascii_whitespace().map(str::to_owned).collect())
        .unwrap_or_default()
}

fn build_views(
    doc: &Document,
    node: NodeId,
    parent_index: Option<usize>,
    arena: &mut ElementViewArena,
    index_of: &mut HashMap<NodeId, usize>,
    node_of: &mut Vec<NodeId>,
    markers: &MarkerLookup<'_>,
) {
    let element_children = collect_element_children(doc, node);
    let sibling_count = element_children.len();
    let mut prev_index: Option<usize> = None;

    for (position, &child) in element_children.iter().enumerate() {
        let tag = doc.tag_name_of(child).unwrap_or_default().to_ascii_lowercase();
        let same_type_count = element_children
            .iter()
            .filter(|&&sibling| doc.tag_name_of(sibling).unwrap_or_default().eq_ignore_ascii_case(&tag))
            .count();
        let same_type_index = element_children[..position]
            .iter()
            .filter(|&&sibling| doc.tag_name_of(sibling).unwrap_or_default().eq_ignore_ascii_case(&tag))
            .count();

        let attributes: Vec<(String, String)> = doc.data(child).attributes().to_vec();
        let id = attributes.iter().find(|(key, _)| key == "id").map(|(_, value)| value.clone());
        let classes = classes_of(&attributes);

        let view = ElementView {
            tag,
            id,
            classes,
            attributes,
            parent: parent_index,
            prev_sibling: prev_index,
            index_in_parent: position,
            sibling_count,
            same_type_index,
            same_type_count,
            child_element_count: collect_element_children(doc, child).len(),
            has_text_children: has_nonblank_text_child(doc, child),
            markers: markers(child),
        };
        arena.views.push(view);
        let new_index = arena.views.len() - 1;
        index_of.insert(child, new_index);
        node_of.push(child);
        prev_index = Some(new_index);

        build_views(doc, child, Some(new_index), arena, index_of, node_of, markers);
    }
}

/// Build a `StyledTree` for `doc`: the element-view arena, plus a resolved
/// `ComputedStyle` for every element, given the author stylesheets already collected
/// from `<link>`/`<style>` and the current viewport (for `@media`).
pub fn build_styled_tree(doc: &Document, sheets: &[&StyleSheet], viewport: (f32, f32), markers: &MarkerLookup<'_>) -> StyledTree {
    let mut arena = ElementViewArena::default();
    let mut index_of = HashMap::new();
    let mut node_of = Vec::new();
    build_views(doc, doc.root, None, &mut arena, &mut index_of, &mut node_of, markers);

    let mut styles: Vec<ComputedStyle> = Vec::with_capacity(arena.views.len());
    for index in 0..arena.views.len() {
        let parent_style = arena.views[index].parent.map(|parent_index| &styles[parent_index]);
        let node = node_of[index];
        let inline_text = doc.data(node).attribute("style").map(str::to_owned);
        let inline_block = inline_text.as_deref().map(parse_inline_style);
        let style = resolve_style(&arena, index, parent_style, sheets, inline_block.as_ref(), viewport);
        styles.push(style);
    }

    StyledTree { arena, index_of, node_of, styles }
}

#[cfg(test)]
mod tests {
    use super::*;
    use css::parse_stylesheet;
    use html::tree_builder::parse_document;

    #[test]
    fn cascade_propagates_through_dom_order() {
        let doc = parse_document("<html><body><div><p>hi</p></div></body></html>");
        let sheet = parse_stylesheet("div { color: blue } p { font-size: 2em }");
        let styled = build_styled_tree(&doc, &[&sheet], (800.0, 600.0), &|_| Vec::new());
        let p_index = styled.arena.views.iter().position(|view| view.tag == "p").unwrap();
        assert_eq!(styled.styles[p_index].font_size, 32.0);
        let div_index = styled.arena.views.iter().position(|view| view.tag == "div").unwrap();
        assert_eq!(styled.styles[div_index].color, browser_core::Color::parse("blue").unwrap());
        // inherited from div through no intervening override
        assert_eq!(styled.styles[p_index].color, styled.styles[div_index].color);
    }
}
