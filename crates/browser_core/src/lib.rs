//! Shared primitives for the render pipeline: geometry, color, length resolution,
//! the affine transform stack, process-wide registries, and the one typed error
//! the pipeline raises on an invariant violation.

pub mod error;
pub mod geometry;
pub mod length;
pub mod registry;
pub mod transform;

pub use error::InvariantViolation;
pub use geometry::{Color, EdgeSizes, Rect};
pub use length::{CalcExpr, Length, LengthContext};
pub use transform::AffineTransform;
