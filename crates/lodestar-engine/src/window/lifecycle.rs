use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::core::{App, AppCtx};
use crate::resource::{prefs_path, Resources};
use crate::time::FrameClock;

use super::platform::{Platform, PlatformEvent, WindowConfig};

/// Runtime phases. Each state has exactly one successor.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LifecycleState {
    Uninitialized,
    Initializing,
    Running,
    ShuttingDown,
    Terminated,
}

impl LifecycleState {
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Uninitialized => Some(Self::Initializing),
            Self::Initializing => Some(Self::Running),
            Self::Running => Some(Self::ShuttingDown),
            Self::ShuttingDown => Some(Self::Terminated),
            Self::Terminated => None,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Running => "running",
            Self::ShuttingDown => "shutting down",
            Self::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Single-threaded frame loop over a [`Platform`].
///
/// One iteration: tick the clock, drain events, `update`, clear + `render`
/// + present, then `tprev = tnow`. A quit request only takes effect after the
/// current iteration completes.
pub struct FrameLoop<P: Platform> {
    platform: P,
    window: WindowConfig,
    org: String,
    product: String,
    clear_color: wgpu::Color,
    resources: Resources,
    prefs_path: Option<PathBuf>,

    state: LifecycleState,
    running: bool,
    clock: FrameClock,
    surface_size: (u32, u32),
    events: Vec<PlatformEvent>,
}

impl<P: Platform> FrameLoop<P> {
    pub fn new(
        platform: P,
        window: WindowConfig,
        org: impl Into<String>,
        product: impl Into<String>,
        clear_color: wgpu::Color,
        resources: Resources,
    ) -> Self {
        Self {
            platform,
            window,
            org: org.into(),
            product: product.into(),
            clear_color,
            resources,
            prefs_path: None,
            state: LifecycleState::Uninitialized,
            running: false,
            clock: FrameClock::start(0),
            surface_size: (0, 0),
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    /// Last known drawable size.
    pub fn surface_size(&self) -> (u32, u32) {
        self.surface_size
    }

    /// Completed loop iterations.
    pub fn frames(&self) -> u64 {
        self.clock.frame_index()
    }

    /// Drives `app` from startup to shutdown.
    ///
    /// `startup` and `shutdown` run exactly once each, even when the loop body
    /// runs zero times. A failing hook stops the loop; its error is returned
    /// after shutdown completed.
    pub fn run<A: App>(&mut self, app: &mut A) -> Result<()> {
        self.transition(LifecycleState::Initializing);
        if let Err(e) = self.initialize() {
            self.platform.terminate();
            return Err(e);
        }

        // `startup` may already call `quit()`.
        self.running = true;
        let mut failure = app.startup(&mut self.ctx()).context("startup failed").err();
        self.running &= failure.is_none();
        self.transition(LifecycleState::Running);

        while self.running {
            if let Err(e) = self.iterate(app) {
                failure = Some(e);
                self.running = false;
            }
        }

        self.transition(LifecycleState::ShuttingDown);
        let shutdown = app.shutdown(&mut self.ctx()).context("shutdown failed");
        self.terminate();
        self.transition(LifecycleState::Terminated);

        match failure {
            Some(e) => Err(e),
            None => shutdown,
        }
    }

    fn transition(&mut self, to: LifecycleState) {
        assert_eq!(
            self.state.next(),
            Some(to),
            "invalid lifecycle transition {} -> {}",
            self.state,
            to
        );
        log::debug!("lifecycle: {} -> {}", self.state, to);
        self.state = to;
    }

    fn initialize(&mut self) -> Result<()> {
        self.platform
            .init(&self.window)
            .with_context(|| format!("failed to initialize platform for '{}'", self.window.title))?;

        self.surface_size = self.platform.drawable_size();

        if !self.org.is_empty() || !self.product.is_empty() {
            self.prefs_path = prefs_path(&self.org, &self.product);
            match &self.prefs_path {
                Some(path) => {
                    if let Err(e) = std::fs::create_dir_all(path) {
                        log::warn!("could not create preferences dir {}: {e}", path.display());
                    }
                }
                None => log::warn!("no preferences dir for {}/{}", self.org, self.product),
            }
        }

        let now = self.platform.ticks_ms();
        self.clock = FrameClock::start(now);
        log::info!(
            "initialized: drawable {}x{}, resources at {}",
            self.surface_size.0,
            self.surface_size.1,
            self.resources.root().display()
        );
        Ok(())
    }

    fn iterate<A: App>(&mut self, app: &mut A) -> Result<()> {
        let now = self.platform.ticks_ms();
        self.clock.tick(now);

        let mut events = std::mem::take(&mut self.events);
        self.platform.drain_events(&mut events);
        for event in events.drain(..) {
            self.handle_event(app, event)?;
        }
        self.events = events;

        app.update(&mut self.ctx())?;

        self.platform
            .present(self.clear_color, &mut |rctx, target| app.render(rctx, target))?;

        self.clock.end_frame();
        Ok(())
    }

    fn handle_event<A: App>(&mut self, app: &mut A, event: PlatformEvent) -> Result<()> {
        match event {
            PlatformEvent::Quit => {
                log::debug!("quit requested");
                self.running = false;
            }
            PlatformEvent::Resized { width, height } => {
                log::info!("resized to {width}x{height}");
                self.surface_size = (width, height);
                self.platform
                    .resize_surface(width, height)
                    .context("surface reconfiguration failed")?;
            }
            PlatformEvent::Window(event) => app.on_event(&mut self.ctx(), &event),
        }
        Ok(())
    }

    fn terminate(&mut self) {
        log::info!(
            "terminating after {} frames; {}",
            self.clock.frame_index(),
            self.resources.metrics().snapshot()
        );
        self.prefs_path = None;
        self.platform.terminate();
    }

    fn ctx(&mut self) -> AppCtx<'_> {
        AppCtx {
            running: &mut self.running,
            time: self.clock.snapshot(),
            surface_size: self.surface_size,
            gpu: self.platform.gpu(),
            resources: &self.resources,
            prefs_path: self.prefs_path.as_deref(),
        }
    }
}
