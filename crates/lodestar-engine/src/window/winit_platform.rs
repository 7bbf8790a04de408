use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::device::{Diagnostics, Gpu};
use crate::time::MonotonicTicks;

use super::platform::{DrawFn, Platform, PlatformEvent, WindowConfig};

/// Upper bound on pumps spent waiting for the first `resumed`.
const MAX_STARTUP_PUMPS: usize = 64;

/// `winit` + `wgpu` platform.
///
/// The event loop is pumped with a zero timeout once per frame, so draining
/// events never blocks the frame loop.
pub struct WinitPlatform {
    event_loop: Option<EventLoop<()>>,
    handler: Handler,
    ticks: MonotonicTicks,
    gpu: Option<Gpu<'static>>,
}

#[derive(Default)]
struct Handler {
    pending: Option<WindowAttributes>,
    window: Option<Arc<Window>>,
    create_error: Option<String>,
    events: Vec<PlatformEvent>,
}

impl ApplicationHandler for Handler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let Some(attrs) = self.pending.take() else {
            return;
        };
        match event_loop.create_window(attrs) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(e) => self.create_error = Some(e.to_string()),
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let event = match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => PlatformEvent::Quit,
            WindowEvent::Resized(size) => PlatformEvent::Resized {
                width: size.width,
                height: size.height,
            },
            other => PlatformEvent::Window(other),
        };
        self.events.push(event);
    }
}

impl WinitPlatform {
    pub fn new() -> Self {
        Self {
            event_loop: None,
            handler: Handler::default(),
            ticks: MonotonicTicks::new(),
            gpu: None,
        }
    }

    pub fn window(&self) -> Option<&Window> {
        self.handler.window.as_deref()
    }

    fn pump(&mut self) -> PumpStatus {
        match self.event_loop.as_mut() {
            Some(event_loop) => event_loop.pump_app_events(Some(Duration::ZERO), &mut self.handler),
            None => PumpStatus::Exit(0),
        }
    }
}

impl Default for WinitPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for WinitPlatform {
    fn init(&mut self, config: &WindowConfig) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to initialize the windowing system")?;
        self.event_loop = Some(event_loop);

        self.handler.pending = Some(
            Window::default_attributes()
                .with_title(config.title.clone())
                .with_inner_size(LogicalSize::new(config.width as f64, config.height as f64)),
        );

        // The window is created from the first `resumed` callback.
        for _ in 0..MAX_STARTUP_PUMPS {
            if let PumpStatus::Exit(code) = self.pump() {
                bail!("event loop exited during startup (code {code})");
            }
            if self.handler.window.is_some() || self.handler.create_error.is_some() {
                break;
            }
        }

        if let Some(err) = self.handler.create_error.take() {
            bail!("failed to create window: {err}");
        }
        let window = self
            .handler
            .window
            .clone()
            .context("failed to create window: platform never resumed")?;

        let gpu = pollster::block_on(Gpu::new(
            Arc::clone(&window),
            window.inner_size(),
            config.gpu.clone(),
            Diagnostics::new(config.diagnostics),
        ))
        .context("failed to create the graphics context")?;

        log::info!(
            "window '{}' open at {:?}, surface {:?}",
            config.title,
            gpu.size(),
            gpu.surface_format()
        );
        self.gpu = Some(gpu);
        Ok(())
    }

    fn ticks_ms(&self) -> u64 {
        self.ticks.ticks_ms()
    }

    fn drain_events(&mut self, out: &mut Vec<PlatformEvent>) {
        if let PumpStatus::Exit(code) = self.pump() {
            log::debug!("event loop exit requested (code {code})");
            self.handler.events.push(PlatformEvent::Quit);
        }
        out.append(&mut self.handler.events);
    }

    fn drawable_size(&self) -> (u32, u32) {
        if let Some(gpu) = &self.gpu {
            let size = gpu.size();
            return (size.width, size.height);
        }
        self.handler
            .window
            .as_ref()
            .map(|w| {
                let size = w.inner_size();
                (size.width, size.height)
            })
            .unwrap_or((0, 0))
    }

    fn resize_surface(&mut self, width: u32, height: u32) -> Result<()> {
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.resize(PhysicalSize::new(width, height))?;
        }
        Ok(())
    }

    fn present(&mut self, clear: wgpu::Color, draw: &mut DrawFn<'_>) -> Result<()> {
        let Some(gpu) = self.gpu.as_mut() else {
            return Ok(());
        };
        if let Some(window) = &self.handler.window {
            window.pre_present_notify();
        }
        gpu.present(clear, |rctx, target| draw(rctx, target))
    }

    fn gpu(&self) -> Option<&Gpu<'static>> {
        self.gpu.as_ref()
    }

    fn terminate(&mut self) {
        // Surface before window.
        self.gpu = None;
        self.handler.window = None;
        self.handler.events.clear();
        self.event_loop = None;
    }
}
