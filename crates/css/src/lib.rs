//! CSS tokenizer, selector/stylesheet parser, selector matcher, and cascade resolver
//! (§2.3, §2.4, §4.3, §4.4). `ElementView`/`ElementViewArena` decouple the matcher from
//! the DOM crate: the layout engine builds the arena once per render by walking the
//! styled tree, then calls `resolve_style` element by element in document order so
//! inheritance can flow from parent to child.

pub mod cascade;
pub mod computed;
pub mod element_view;
pub mod matcher;
pub mod parser;
pub mod rule;
pub mod selector;
pub mod tokenizer;
pub mod value;

pub use cascade::{resolve_pseudo_element, resolve_selection_colors, resolve_style};
pub use computed::{ComputedStyle, Display, Position};
pub use element_view::{ElementView, ElementViewArena};
pub use parser::{parse_inline_style, parse_stylesheet};
pub use rule::{Declaration, DeclarationBlock, Origin, StyleRule, StyleSheet};
pub use selector::{Combinator, SelectorList, Specificity};
