//! The software rasterizer (§4.7): walks a `paint::DisplayList` into an RGBA
//! `PixelBuffer`, the render pipeline's final stage. Everything upstream (tokenizer,
//! tree builder, cascade, layout, painter) works in resolution-independent pixels;
//! this crate is the only one that touches actual device pixels, so it owns the
//! pixel buffer, the gradient/shadow/clip-path coverage math, and the PPM/PNG sinks.

pub mod buffer;
pub mod filter;
pub mod gradient;
pub mod rasterizer;
pub mod shapes;
pub mod sink;
pub mod text;

pub use buffer::PixelBuffer;
pub use rasterizer::rasterize;
pub use sink::to_ppm;
pub use text::{GlyphRenderer, GlyphRequest};

#[cfg(feature = "png")]
pub use sink::to_png;
