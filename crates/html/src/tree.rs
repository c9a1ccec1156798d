//! The DOM: an `indextree` arena of `Node`s. The arena owns parent/child/sibling edges;
//! node identity is the plain `indextree::NodeId` newtype-wrapped as `NodeId` so callers
//! never depend on `indextree` directly.

use std::collections::HashMap;

use indextree::Arena;
use smallvec::SmallVec;

use crate::tokenizer::AttributeList;

pub type NodeId = indextree::NodeId;

/// The element/text/comment/doctype/document discriminant. Matches the WHATWG DOM's
/// node-kind split closely enough for this pipeline's needs (no `CDATASection`,
/// `ProcessingInstruction`, or `DocumentFragment` kinds; this pipeline has no use for them).
#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Doctype { name: String },
    Element { tag_name: String, attributes: AttributeList },
    Text { data: String },
    Comment { data: String },
}

impl NodeData {
    pub fn element(tag_name: impl Into<String>, attributes: AttributeList) -> Self {
        Self::Element { tag_name: tag_name.into(), attributes }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Self::Element { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text { .. })
    }

    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Self::Element { tag_name, .. } => Some(tag_name.as_str()),
            _ => None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            Self::Element { attributes, .. } => {
                attributes.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
            }
            _ => None,
        }
    }

    pub fn attributes(&self) -> &[(String, String)] {
        match self {
            Self::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    pub fn text_data(&self) -> Option<&str> {
        match self {
            Self::Text { data } => Some(data.as_str()),
            _ => None,
        }
    }
}

/// A document: the arena plus the handful of well-known node ids the tree builder needs
/// quick access to (document element, `<head>`, `<body>`).
pub struct Document {
    pub arena: Arena<NodeData>,
    pub root: NodeId,
    pub html_element: Option<NodeId>,
    pub head_element: Option<NodeId>,
    pub body_element: Option<NodeId>,
    /// `id` attribute value -> node, refreshed on every element insertion so
    /// `get_element_by_id` stays O(1) amortized instead of walking the tree.
    id_index: HashMap<String, NodeId>,
}

impl Document {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(NodeData::Document);
        Self { arena, root, html_element: None, head_element: None, body_element: None, id_index: HashMap::new() }
    }

    pub fn create_element(&mut self, tag_name: impl Into<String>, attributes: AttributeList) -> NodeId {
        let tag_name = tag_name.into();
        let id_attr = attributes.iter().find(|(key, _)| key == "id").map(|(_, value)| value.clone());
        let node = self.arena.new_node(NodeData::element(tag_name, attributes));
        if let Some(id_value) = id_attr {
            self.id_index.insert(id_value, node);
        }
        node
    }

    pub fn create_text(&mut self, data: impl Into<String>) -> NodeId {
        self.arena.new_node(NodeData::Text { data: data.into() })
    }

    pub fn create_comment(&mut self, data: impl Into<String>) -> NodeId {
        self.arena.new_node(NodeData::Comment { data: data.into() })
    }

    pub fn create_doctype(&mut self, name: impl Into<String>) -> NodeId {
        self.arena.new_node(NodeData::Doctype { name: name.into() })
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        parent.append(child, &mut self.arena);
    }

    /// Append `child` as a new last text node merged into an existing trailing text
    /// node when one is already the last child, matching the DOM's "adjacent text
    /// nodes are not auto-merged, but the tokenizer already coalesces runs" contract:
    /// this just avoids creating two sibling text nodes back to back.
    pub fn append_text(&mut self, parent: NodeId, data: &str) {
        if let Some(last_child) = self.arena[parent].last_child() {
            if let NodeData::Text { data: existing } = self.arena[last_child].get_mut() {
                existing.push_str(data);
                return;
            }
        }
        let node = self.create_text(data);
        self.append_child(parent, node);
    }

    pub fn insert_before(&mut self, new_node: NodeId, reference: NodeId) {
        reference.insert_before(new_node, &mut self.arena);
    }

    pub fn detach(&mut self, node: NodeId) {
        node.detach(&mut self.arena);
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena[node].parent()
    }

    pub fn children(&self, node: NodeId) -> SmallVec<[NodeId; 8]> {
        node.children(&self.arena).collect()
    }

    pub fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.arena[node].last_child()
    }

    pub fn data(&self, node: NodeId) -> &NodeData {
        self.arena[node].get()
    }

    pub fn data_mut(&mut self, node: NodeId) -> &mut NodeData {
        self.arena[node].get_mut()
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    /// Depth-first, pre-order traversal over `node` and its descendants.
    pub fn descendants(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.descendants(&self.arena)
    }

    pub fn tag_name_of(&self, node: NodeId) -> Option<&str> {
        self.data(node).tag_name()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_element_indexes_by_id() {
        let mut doc = Document::new();
        let mut attrs = AttributeList::new();
        attrs.push(("id".to_owned(), "main".to_owned()));
        let el = doc.create_element("div", attrs);
        doc.append_child(doc.root, el);
        assert_eq!(doc.get_element_by_id("main"), Some(el));
    }

    #[test]
    fn append_text_merges_adjacent_runs() {
        let mut doc = Document::new();
        let div = doc.create_element("div", AttributeList::new());
        doc.append_child(doc.root, div);
        doc.append_text(div, "hello ");
        doc.append_text(div, "world");
        let children = doc.children(div);
        assert_eq!(children.len(), 1);
        assert_eq!(doc.data(children[0]).text_data(), Some("hello world"));
    }

    #[test]
    fn detach_removes_from_parent() {
        let mut doc = Document::new();
        let div = doc.create_element("div", AttributeList::new());
        doc.append_child(doc.root, div);
        doc.detach(div);
        assert_eq!(doc.children(doc.root).len(), 0);
    }

    #[test]
    fn descendants_visit_in_document_order() {
        let mut doc = Document::new();
        let div = doc.create_element("div", AttributeList::new());
        doc.append_child(doc.root, div);
        let span = doc.create_element("span", AttributeList::new());
        doc.append_child(div, span);
        let text = doc.create_text("hi");
        doc.append_child(span, text);
        let order: Vec<NodeId> = doc.descendants(doc.root).collect();
        assert_eq!(order, vec![doc.root, div, span, text]);
    }
}
