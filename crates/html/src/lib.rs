//! HTML tokenization and tree construction: turns a markup string into a `Document`
//! arena tree, tolerating malformed input the way a browser's HTML parser must.

pub mod entities;
pub mod tokenizer;
pub mod tree;
pub mod tree_builder;

pub use tokenizer::{AttributeList, HtmlTokenizer, Token, TokenizerState};
pub use tree::{Document, NodeData, NodeId};
pub use tree_builder::{parse_document, TreeBuilder};
