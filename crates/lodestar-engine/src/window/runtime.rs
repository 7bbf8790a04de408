use std::path::PathBuf;

use anyhow::Result;

use crate::core::App;
use crate::device::{DiagnosticsMode, GpuInit};
use crate::resource::Resources;

use super::lifecycle::FrameLoop;
use super::platform::WindowConfig;
use super::winit_platform::WinitPlatform;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Organization id, used for the preferences path.
    pub org: String,
    /// Product id, used for the preferences path.
    pub product: String,
    pub clear_color: wgpu::Color,
    pub gpu: GpuInit,
    pub diagnostics: DiagnosticsMode,
    /// Overrides the resource root (otherwise env var, then executable dir).
    pub resource_root: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "lodestar".to_string(),
            width: 1280,
            height: 720,
            org: String::new(),
            product: "lodestar".to_string(),
            clear_color: wgpu::Color::GREEN,
            gpu: GpuInit::default(),
            diagnostics: DiagnosticsMode::from_env().unwrap_or_default(),
            resource_root: None,
        }
    }
}

impl RuntimeConfig {
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_ids(mut self, org: impl Into<String>, product: impl Into<String>) -> Self {
        self.org = org.into();
        self.product = product.into();
        self
    }

    pub fn with_clear_color(mut self, color: wgpu::Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn with_gpu(mut self, gpu: GpuInit) -> Self {
        self.gpu = gpu;
        self
    }

    pub fn with_diagnostics(mut self, mode: DiagnosticsMode) -> Self {
        self.diagnostics = mode;
        self
    }

    pub fn with_resource_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.resource_root = Some(root.into());
        self
    }

    fn window(&self) -> WindowConfig {
        WindowConfig {
            title: self.title.clone(),
            width: self.width,
            height: self.height,
            gpu: self.gpu.clone(),
            diagnostics: self.diagnostics,
        }
    }

    fn resources(&self) -> Resources {
        match &self.resource_root {
            Some(root) => Resources::new(root.clone()),
            None => Resources::from_base_path(),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, drives `app` until it quits, and tears everything down.
    pub fn run<A: App>(config: RuntimeConfig, mut app: A) -> Result<()> {
        let mut frame_loop = FrameLoop::new(
            WinitPlatform::new(),
            config.window(),
            config.org.clone(),
            config.product.clone(),
            config.clear_color,
            config.resources(),
        );
        frame_loop.run(&mut app)
    }

    /// [`Runtime::run`] with only the window and id parameters.
    pub fn run_with<A: App>(
        title: &str,
        width: u32,
        height: u32,
        org: &str,
        product: &str,
        app: A,
    ) -> Result<()> {
        Self::run(RuntimeConfig::new(title, width, height).with_ids(org, product), app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let config = RuntimeConfig::new("Testing", 640, 480)
            .with_ids("com.lobotony", "lodestar")
            .with_diagnostics(DiagnosticsMode::Disabled)
            .with_resource_root("/tmp/res");

        assert_eq!(config.title, "Testing");
        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.org, "com.lobotony");
        assert_eq!(config.diagnostics, DiagnosticsMode::Disabled);

        let window = config.window();
        assert_eq!(window.title, "Testing");
        assert_eq!(config.resources().root(), std::path::Path::new("/tmp/res"));
    }

    #[test]
    fn default_requests_fixed_context() {
        let config = RuntimeConfig::default();
        assert_eq!(config.gpu.present_mode, wgpu::PresentMode::Fifo);
        assert_eq!(config.gpu.desired_maximum_frame_latency, 2);
        assert_eq!(
            config.gpu.depth_format,
            Some(wgpu::TextureFormat::Depth32Float)
        );
        assert!(!config.gpu.prefer_srgb);
    }
}
