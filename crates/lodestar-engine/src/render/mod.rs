//! Render-time handles lent to the application between clear and present.
//!
//! Each renderer owns its GPU resources (pipelines, buffers) and records its
//! own passes against the frame's [`RenderTarget`].

mod ctx;

pub use ctx::{RenderCtx, RenderTarget};
