//! Painter and display list (§2.6, §4.6): walks the positioned box tree into an
//! ordered `PaintCommand` stream plus the side-band hit-test region lists the shell
//! needs for link/cursor/form/`<details>`/`<select>` routing and generic hit testing.

pub mod command;
pub mod display_list;
pub mod painter;
pub mod region;

pub use command::{BlendMode, ClipShape, PaintCommand};
pub use display_list::DisplayList;
pub use painter::build_display_list;
pub use region::{CursorRegion, DetailsToggleRegion, ElementRegion, FormSubmitRegion, LinkRegion, SelectClickRegion, TextCommand};
