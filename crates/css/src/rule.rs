//! Stylesheet structure: a declaration list keyed by property name, a style rule
//! pairing a selector list with its declarations, and the stylesheet/origin wrapper the
//! cascade consumes.

use crate::selector::SelectorList;
use crate::value::CssValue;

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: CssValue,
    pub important: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DeclarationBlock {
    pub declarations: Vec<Declaration>,
}

impl DeclarationBlock {
    pub fn get(&self, property: &str) -> Option<&Declaration> {
        // Last declaration for a property wins within a single rule, per source order.
        self.declarations.iter().rev().find(|decl| decl.property == property)
    }
}

#[derive(Debug, Clone)]
pub struct StyleRule {
    pub selectors: SelectorList,
    pub declarations: DeclarationBlock,
}

/// The small subset of at-rules this pipeline understands structurally; others are
/// parsed (to keep the tokenizer stream balanced) and then discarded.
#[derive(Debug, Clone)]
pub enum AtRule {
    Media { condition_text: String, rules: Vec<StyleRule> },
    FontFace(DeclarationBlock),
    Keyframes { name: String },
    Other { name: String },
}

#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    pub rules: Vec<StyleRule>,
    pub at_rules: Vec<AtRule>,
}

/// Cascade origin, ordered exactly as `§5` requires: user-agent loses to user loses to
/// author loses to a `style=""` attribute, each category split further by importance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Origin {
    UserAgent,
    User,
    Author,
    Inline,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::CssValue;

    #[test]
    fn declaration_block_last_wins() {
        let block = DeclarationBlock {
            declarations: vec![
                Declaration { property: "color".to_owned(), value: CssValue::Keyword("red".to_owned()), important: false },
                Declaration { property: "color".to_owned(), value: CssValue::Keyword("blue".to_owned()), important: false },
            ],
        };
        assert_eq!(block.get("color").unwrap().value, CssValue::Keyword("blue".to_owned()));
    }

    #[test]
    fn origin_orders_ua_below_inline() {
        assert!(Origin::UserAgent < Origin::Inline);
        assert!(Origin::Author < Origin::Inline);
    }
}
