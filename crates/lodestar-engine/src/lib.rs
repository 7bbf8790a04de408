//! Lodestar engine crate.
//!
//! Frame lifecycle, GPU diagnostics, vertex layouts and shader programs on
//! top of `winit` + `wgpu`, plus the resource and bitmap helpers an
//! application needs to get pixels on screen.

pub mod bitmap;
pub mod core;
pub mod device;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod render;
pub mod resource;
pub mod shader;
pub mod time;
pub mod window;
