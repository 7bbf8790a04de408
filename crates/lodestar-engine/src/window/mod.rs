//! Window + frame lifecycle.
//!
//! [`FrameLoop`] drives an [`App`](crate::core::App) over any [`Platform`];
//! [`Runtime`] wires it to the `winit` window and the GPU layer.

mod lifecycle;
mod platform;
mod runtime;
mod winit_platform;

pub use lifecycle::{FrameLoop, LifecycleState};
pub use platform::{DrawFn, Platform, PlatformEvent, WindowConfig};
pub use runtime::{Runtime, RuntimeConfig};
pub use winit_platform::WinitPlatform;
