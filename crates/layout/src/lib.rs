//! Layout engine: turns a styled DOM into a positioned box tree (§4.5).
//!
//! `style_tree` resolves the cascade into an `ElementViewArena` + per-element
//! `ComputedStyle`; `build` walks that into an unpositioned `LayoutNode` tree,
//! synthesizing anonymous blocks and pseudo-element boxes; `block`/`inline`/`flex`
//! dispatch by formatting context to produce final geometry; `position` handles the
//! absolute/fixed/sticky second pass; `grid`/`table` cover their own minimal contracts.

pub mod block;
pub mod box_tree;
pub mod build;
pub mod flex;
pub mod grid;
pub mod inline;
pub mod position;
pub mod style_tree;
pub mod table;

pub use box_tree::{Geometry, LayoutNode, Mode};
pub use build::build_box_tree;
pub use inline::MeasureText;
pub use position::{is_out_of_flow, StickyInfo};
pub use style_tree::{build_styled_tree, StyledTree};

/// Run the full layout pipeline: box-tree construction, in-flow formatting, and the
/// out-of-flow positioning pass. Returns the positioned tree plus sticky-element info
/// the shell needs to track scroll offsets against (§6).
pub fn layout_document(
    doc: &html::Document,
    styled: &StyledTree,
    root_node: html::NodeId,
    sheets: &[&css::StyleSheet],
    viewport: (f32, f32),
    measure_text: &MeasureText<'_>,
) -> Option<(LayoutNode, Vec<StickyInfo>)> {
    let mut tree = build_box_tree(doc, styled, root_node, sheets, viewport)?;
    match tree.mode {
        Mode::Grid => {
            grid::layout_grid(&mut tree, 0.0, 0.0, viewport.0, viewport, measure_text);
        }
        Mode::Table => {
            table::layout_table(&mut tree, 0.0, 0.0, viewport.0, viewport, measure_text);
        }
        _ => {
            block::layout_block(&mut tree, 0.0, 0.0, viewport.0, viewport, measure_text);
        }
    }
    let sticky = position::layout_positioned(&mut tree, 0.0, 0.0, viewport, measure_text);
    Some((tree, sticky))
}
