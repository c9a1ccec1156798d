//! `ElementView`: the read-only projection of an element the selector matcher needs.
//! Built once per render as a flat arena (indices instead of DOM references) so the
//! matcher has no dependency on the DOM crate and can be unit-tested in isolation.

/// One element's projection: tag, id, classes, attributes, and the structural
/// statistics positional pseudo-classes need, plus indices into the owning
/// `ElementViewArena` for `parent`/`prev_sibling` walks.
#[derive(Debug, Clone, Default)]
pub struct ElementView {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<(String, String)>,
    pub parent: Option<usize>,
    pub prev_sibling: Option<usize>,
    /// 0-based position among all element siblings (text/comment nodes don't count).
    pub index_in_parent: usize,
    pub sibling_count: usize,
    /// 0-based position among siblings sharing this element's tag name.
    pub same_type_index: usize,
    pub same_type_count: usize,
    pub child_element_count: usize,
    pub has_text_children: bool,
    /// Runtime-state markers the shell injects before a render (`hover`, `focus`,
    /// `active`, `target`) since the core has no event loop of its own.
    pub markers: Vec<String>,
}

impl ElementView {
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|(key, _)| key == name)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    pub fn has_marker(&self, name: &str) -> bool {
        self.markers.iter().any(|marker| marker == name)
    }
}

/// A flat arena of `ElementView`s in document order, indexed by `usize`.
#[derive(Debug, Clone, Default)]
pub struct ElementViewArena {
    pub views: Vec<ElementView>,
}

impl ElementViewArena {
    pub fn get(&self, index: usize) -> &ElementView {
        &self.views[index]
    }

    pub fn parent_index(&self, index: usize) -> Option<usize> {
        self.views[index].parent
    }

    pub fn prev_sibling_index(&self, index: usize) -> Option<usize> {
        self.views[index].prev_sibling
    }

    /// Ancestors of `index`, nearest first.
    pub fn ancestors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.parent_index(index), move |&current| self.parent_index(current))
    }

    /// Previous siblings of `index`, nearest first.
    pub fn prev_siblings(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.prev_sibling_index(index), move |&current| self.prev_sibling_index(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> ElementViewArena {
        // <article>(0) / <div class=intro>(1) / <p>(2)
        let article = ElementView { tag: "article".to_owned(), index_in_parent: 0, sibling_count: 1, ..Default::default() };
        let div = ElementView {
            tag: "div".to_owned(),
            classes: vec!["intro".to_owned()],
            parent: Some(0),
            index_in_parent: 0,
            sibling_count: 1,
            ..Default::default()
        };
        let p = ElementView { tag: "p".to_owned(), parent: Some(1), index_in_parent: 0, sibling_count: 1, ..Default::default() };
        ElementViewArena { views: vec![article, div, p] }
    }

    #[test]
    fn ancestors_walk_to_root() {
        let arena = arena();
        let chain: Vec<usize> = arena.ancestors(2).collect();
        assert_eq!(chain, vec![1, 0]);
    }
}
