use anyhow::Result;
use winit::event::WindowEvent;

use crate::device::{DiagnosticsMode, Gpu, GpuInit};
use crate::render::{RenderCtx, RenderTarget};

/// What the platform layer needs to open the window and graphics context.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub gpu: GpuInit,
    pub diagnostics: DiagnosticsMode,
}

/// Events the frame loop reacts to.
#[derive(Debug, Clone)]
pub enum PlatformEvent {
    /// Window close or platform shutdown.
    Quit,
    /// Drawable size changed, in physical pixels.
    Resized { width: u32, height: u32 },
    /// Everything else, forwarded to [`crate::core::App::on_event`].
    Window(WindowEvent),
}

/// Draw callback lent to [`Platform::present`].
pub type DrawFn<'a> = dyn FnMut(&RenderCtx<'_>, &mut RenderTarget<'_>) + 'a;

/// Platform services used by the frame loop.
pub trait Platform {
    /// Opens the window and creates the graphics context.
    fn init(&mut self, config: &WindowConfig) -> Result<()>;

    /// Monotonic milliseconds since the platform was created.
    fn ticks_ms(&self) -> u64;

    /// Appends every pending event to `out` without blocking.
    fn drain_events(&mut self, out: &mut Vec<PlatformEvent>);

    /// Current drawable size in physical pixels.
    fn drawable_size(&self) -> (u32, u32);

    fn resize_surface(&mut self, width: u32, height: u32) -> Result<()>;

    /// Clears the frame to `clear`, runs `draw`, then presents.
    fn present(&mut self, clear: wgpu::Color, draw: &mut DrawFn<'_>) -> Result<()>;

    fn gpu(&self) -> Option<&Gpu<'static>>;

    /// Releases the graphics context and the window.
    fn terminate(&mut self);
}
