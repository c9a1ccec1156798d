//! Selector matcher: right-to-left evaluation of a `ComplexSelector` against an
//! `ElementView`, per §4.4. Each compound requires every simple selector within it to
//! match; combinators walk the ancestor or previous-sibling chain as described.

use crate::element_view::{ElementView, ElementViewArena};
use crate::selector::{
    AttributeMatcher, Combinator, CompoundSelector, ComplexSelector, PseudoClass, SelectorList, SimpleSelector,
};

/// Does `element` (identified by its arena index) match `selector`?
pub fn matches_complex(arena: &ElementViewArena, index: usize, selector: &ComplexSelector) -> bool {
    let Some((combinator, compound)) = selector.compounds.last() else { return false };
    debug_assert!(combinator.is_none(), "rightmost compound carries no combinator");
    if !matches_compound(arena, index, compound) {
        return false;
    }
    match_ancestors(arena, index, &selector.compounds[..selector.compounds.len() - 1])
}

/// Walk the remaining `(combinator, compound)` pairs from right to left, each relative
/// to the match found for the part to its right.
fn match_ancestors(arena: &ElementViewArena, index: usize, remaining: &[(Option<Combinator>, CompoundSelector)]) -> bool {
    let Some((combinator, compound)) = remaining.last() else { return true };
    let combinator = combinator.unwrap_or(Combinator::Descendant);
    let rest = &remaining[..remaining.len() - 1];

    match combinator {
        Combinator::Child => arena.parent_index(index).is_some_and(|parent| {
            matches_compound(arena, parent, compound) && match_ancestors(arena, parent, rest)
        }),
        Combinator::Descendant => arena.ancestors(index).any(|ancestor| {
            matches_compound(arena, ancestor, compound) && match_ancestors(arena, ancestor, rest)
        }),
        Combinator::NextSibling => arena.prev_sibling_index(index).is_some_and(|sibling| {
            matches_compound(arena, sibling, compound) && match_ancestors(arena, sibling, rest)
        }),
        Combinator::SubsequentSibling => arena.prev_siblings(index).any(|sibling| {
            matches_compound(arena, sibling, compound) && match_ancestors(arena, sibling, rest)
        }),
    }
}

fn matches_compound(arena: &ElementViewArena, index: usize, compound: &CompoundSelector) -> bool {
    compound.simple_selectors.iter().all(|simple| matches_simple(arena, index, simple))
}

fn matches_simple(arena: &ElementViewArena, index: usize, simple: &SimpleSelector) -> bool {
    let element = arena.get(index);
    match simple {
        SimpleSelector::Universal => true,
        SimpleSelector::Type(name) => element.tag.eq_ignore_ascii_case(name),
        SimpleSelector::Id(name) => element.id.as_deref() == Some(name.as_str()),
        SimpleSelector::Class(name) => element.classes.iter().any(|class| class == name),
        SimpleSelector::Attribute { name, matcher } => matches_attribute(element, name, matcher),
        SimpleSelector::PseudoElement(_) => false,
        SimpleSelector::PseudoClass(pseudo) => matches_pseudo_class(arena, index, pseudo),
    }
}

fn matches_attribute(element: &ElementView, name: &str, matcher: &AttributeMatcher) -> bool {
    let Some(value) = element.attribute(name) else { return false };
    match matcher {
        AttributeMatcher::Exists => true,
        AttributeMatcher::Equals(expected) => value == expected,
        AttributeMatcher::Includes(expected) => value.split_ascii_whitespace().any(|word| word == expected),
        AttributeMatcher::DashMatch(expected) => value == expected || value.starts_with(&format!("{expected}-")),
        AttributeMatcher::Prefix(expected) => !expected.is_empty() && value.starts_with(expected.as_str()),
        AttributeMatcher::Suffix(expected) => !expected.is_empty() && value.ends_with(expected.as_str()),
        AttributeMatcher::Substring(expected) => !expected.is_empty() && value.contains(expected.as_str()),
    }
}

/// `:visited` falls back to `:link` semantics to avoid leaking browsing history through
/// style-based timing attacks.
fn matches_pseudo_class(arena: &ElementViewArena, index: usize, pseudo: &PseudoClass) -> bool {
    let element = arena.get(index);
    match pseudo {
        PseudoClass::Hover => element.has_marker("hover"),
        PseudoClass::Active => element.has_marker("active"),
        PseudoClass::Focus => element.has_marker("focus"),
        PseudoClass::FocusWithin => element.has_marker("focus") || element.has_marker("focus-within"),
        PseudoClass::Visited | PseudoClass::Link => element.has_attribute("href"),
        PseudoClass::Checked => element.has_attribute("checked"),
        PseudoClass::Disabled => element.has_attribute("disabled"),
        PseudoClass::Enabled => !element.has_attribute("disabled"),
        PseudoClass::Root => element.parent.is_none(),
        PseudoClass::Empty => element.child_element_count == 0 && !element.has_text_children,
        PseudoClass::FirstChild => element.index_in_parent == 0,
        PseudoClass::LastChild => element.index_in_parent + 1 == element.sibling_count,
        PseudoClass::OnlyChild => element.sibling_count == 1,
        PseudoClass::FirstOfType => element.same_type_index == 0,
        PseudoClass::LastOfType => element.same_type_index + 1 == element.same_type_count,
        PseudoClass::OnlyOfType => element.same_type_count == 1,
        PseudoClass::NthChild(anb) => anb.matches(position_as_i32(element.index_in_parent)),
        PseudoClass::NthLastChild(anb) => {
            anb.matches(position_as_i32(element.sibling_count - 1 - element.index_in_parent))
        }
        PseudoClass::NthOfType(anb) => anb.matches(position_as_i32(element.same_type_index)),
        PseudoClass::NthLastOfType(anb) => {
            anb.matches(position_as_i32(element.same_type_count - 1 - element.same_type_index))
        }
        PseudoClass::Not(list) => !matches_any(arena, index, list),
        PseudoClass::Is(list) | PseudoClass::Matches(list) => matches_any(arena, index, list),
        PseudoClass::Where(list) => matches_any(arena, index, list),
        PseudoClass::Has(list) => has_matching_descendant(arena, index, list),
        PseudoClass::Other(_) => false,
    }
}

/// Converts a 0-based index to the 1-based position `AnB::matches` expects.
fn position_as_i32(zero_based: usize) -> i32 {
    i32::try_from(zero_based).unwrap_or(i32::MAX).saturating_add(1)
}

fn matches_any(arena: &ElementViewArena, index: usize, list: &SelectorList) -> bool {
    list.iter().any(|selector| matches_complex(arena, index, selector))
}

/// Simplified `:has()`: true if any descendant (not just direct relative-combinator
/// targets) matches the inner selector list, per the Open Questions resolution.
fn has_matching_descendant(arena: &ElementViewArena, index: usize, list: &SelectorList) -> bool {
    fn walk(arena: &ElementViewArena, index: usize, list: &SelectorList, found: &mut bool) {
        if *found {
            return;
        }
        for (candidate_index, view) in arena.views.iter().enumerate() {
            if view.parent == Some(index) {
                if matches_any(arena, candidate_index, list) {
                    *found = true;
                    return;
                }
                walk(arena, candidate_index, list, found);
            }
        }
    }
    let mut found = false;
    walk(arena, index, list, &mut found);
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_selector_list;
    use crate::tokenizer::{CssToken, CssTokenizer};

    fn tokenize(source: &str) -> Vec<CssToken> {
        let mut tokenizer = CssTokenizer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = tokenizer.next_token();
            if token == CssToken::Eof {
                break;
            }
            tokens.push(token);
        }
        tokens
    }

    fn sample_arena() -> ElementViewArena {
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
        let outer_p =
            ElementView { tag: "p".to_owned(), parent: None, index_in_parent: 1, sibling_count: 2, ..Default::default() };
        ElementViewArena { views: vec![article, div, p, outer_p] }
    }

    #[test]
    fn descendant_combinator_matches_through_intermediate_ancestor() {
        let arena = sample_arena();
        let selectors = parse_selector_list(&tokenize("article .intro p"));
        assert!(matches_complex(&arena, 2, &selectors[0]));
        assert!(!matches_complex(&arena, 3, &selectors[0]));
    }

    #[test]
    fn nth_child_odd_matches_1_3_5() {
        let mut arena = ElementViewArena::default();
        for i in 0..10 {
            arena.views.push(ElementView {
                tag: "li".to_owned(),
                index_in_parent: i,
                sibling_count: 10,
                same_type_index: i,
                same_type_count: 10,
                ..Default::default()
            });
        }
        let selectors = parse_selector_list(&tokenize("li:nth-child(odd)"));
        let matched: Vec<usize> = (0..10).filter(|&i| matches_complex(&arena, i, &selectors[0])).collect();
        assert_eq!(matched, vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn not_pseudo_class_excludes_matching_elements() {
        let arena = sample_arena();
        let selectors = parse_selector_list(&tokenize("p:not(.intro)"));
        assert!(matches_complex(&arena, 2, &selectors[0]));
    }
}
