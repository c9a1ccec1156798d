//! The one typed error in this workspace: a render that hit an invariant violation.
//! Everything else (parse recovery, selector re-parse failure, missing collaborator)
//! degrades silently per the error-handling design instead of raising.

use std::fmt;

/// Raised when a pipeline stage detects a broken invariant it cannot recover from
/// (tree-builder stack corruption, unbalanced clip/transform in a display list).
/// The caller converts this into `RenderResult { success: false, error, .. }`.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    pub stage: &'static str,
    pub detail: String,
}

impl InvariantViolation {
    pub fn new(stage: &'static str, detail: impl Into<String>) -> Self {
        Self { stage, detail: detail.into() }
    }
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "invariant violation in {}: {}", self.stage, self.detail)
    }
}

impl std::error::Error for InvariantViolation {}
