use anyhow::Result;
use winit::event::WindowEvent;

use crate::render::{RenderCtx, RenderTarget};

use super::ctx::AppCtx;

/// Lifecycle hooks driven by the frame loop.
///
/// Per run: `startup` once, then per iteration any `on_event` calls, one
/// `update` and one `render`, then `shutdown` once. An `Err` from `startup`
/// or `update` stops the loop; `shutdown` still runs and the error is
/// returned from the run.
pub trait App {
    /// Called once before the first iteration. Create GPU resources here.
    fn startup(&mut self, ctx: &mut AppCtx<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called once per iteration, after events were drained.
    fn update(&mut self, ctx: &mut AppCtx<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called once after the last iteration.
    fn shutdown(&mut self, ctx: &mut AppCtx<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Window events other than quit and resize.
    fn on_event(&mut self, ctx: &mut AppCtx<'_>, event: &WindowEvent) {
        let _ = (ctx, event);
    }

    /// Records draw passes after the frame was cleared and before it is presented.
    fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        let _ = (ctx, target);
    }
}
