//! Vertex layout description.
//!
//! A [`VertexLayout`] is declared with `begin()`, up to [`MAX_ATTRIBUTES`]
//! `set(...)` calls and `end()`. `end()` assigns every attribute its byte
//! offset and the shared stride, assuming one tightly packed, interleaved
//! vertex buffer in declaration order (no gaps, no alignment padding).

mod attribute;
mod builder;
mod error;

pub use attribute::{ComponentType, VertexAttribute};
pub use builder::{VertexLayout, WgpuVertexLayout, MAX_ATTRIBUTES};
pub use error::LayoutError;
