//! `DisplayList`: an ordered paint-command stream plus the side-band region lists
//! (§3). The balance invariant in §8 ("for every `PushClip`/`PushTransform` there
//! exists a matching pop before `EndOfList`") is tracked incrementally as commands are
//! pushed so a caller can assert it cheaply without re-walking the whole list.

use browser_core::InvariantViolation;

use crate::command::PaintCommand;
use crate::region::{CursorRegion, DetailsToggleRegion, ElementRegion, FormSubmitRegion, LinkRegion, SelectClickRegion, TextCommand};

#[derive(Debug, Default)]
pub struct DisplayList {
    pub commands: Vec<PaintCommand>,
    pub links: Vec<LinkRegion>,
    pub cursor_regions: Vec<CursorRegion>,
    pub text_commands: Vec<TextCommand>,
    pub form_submit_regions: Vec<FormSubmitRegion>,
    pub details_toggle_regions: Vec<DetailsToggleRegion>,
    pub select_click_regions: Vec<SelectClickRegion>,
    pub element_regions: Vec<ElementRegion>,
    clip_depth: u32,
    transform_depth: u32,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: PaintCommand) {
        match &command {
            PaintCommand::PushClip { .. } => self.clip_depth += 1,
            PaintCommand::PopClip => self.clip_depth = self.clip_depth.saturating_sub(1),
            PaintCommand::PushTransform { .. } => self.transform_depth += 1,
            PaintCommand::PopTransform => self.transform_depth = self.transform_depth.saturating_sub(1),
            _ => {}
        }
        self.commands.push(command);
    }

    /// §8's display-list balance property: every `PushClip`/`PushTransform` has a
    /// matching pop by the time the list is handed to the rasterizer.
    pub fn is_balanced(&self) -> bool {
        self.clip_depth == 0 && self.transform_depth == 0
    }

    /// Raises the one invariant violation a display list can carry (§7): an unbalanced
    /// clip or transform stack. The rasterizer calls this before walking the list.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        if self.is_balanced() {
            Ok(())
        } else {
            Err(InvariantViolation::new(
                "paint::DisplayList",
                format!("unbalanced stack: {} open clip(s), {} open transform(s)", self.clip_depth, self.transform_depth),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use browser_core::{AffineTransform, Color, Rect};

    #[test]
    fn balanced_push_pop_pairs_validate() {
        let mut list = DisplayList::new();
        list.push(PaintCommand::PushClip { rect: Rect::default() });
        list.push(PaintCommand::FillRect { rect: Rect::default(), color: Color::BLACK, corner_radius: 0.0 });
        list.push(PaintCommand::PopClip);
        list.push(PaintCommand::PushTransform { transform: AffineTransform::IDENTITY });
        list.push(PaintCommand::PopTransform);
        assert!(list.validate().is_ok());
    }

    #[test]
    fn unmatched_push_clip_fails_validation() {
        let mut list = DisplayList::new();
        list.push(PaintCommand::PushClip { rect: Rect::default() });
        assert!(list.validate().is_err());
    }
}
