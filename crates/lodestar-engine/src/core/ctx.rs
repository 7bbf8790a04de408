use std::path::Path;

use anyhow::{Context, Result};

use crate::device::Gpu;
use crate::metrics::ResourceMetrics;
use crate::resource::Resources;
use crate::layout::VertexLayout;
use crate::shader::{load_shader_program, PipelineOptions, ShaderProgram};
use crate::time::FrameTime;

/// Per-hook view of the running application.
pub struct AppCtx<'a> {
    pub(crate) running: &'a mut bool,
    pub(crate) time: FrameTime,
    pub(crate) surface_size: (u32, u32),
    pub(crate) gpu: Option<&'a Gpu<'static>>,
    pub(crate) resources: &'a Resources,
    pub(crate) prefs_path: Option<&'a Path>,
}

impl<'a> AppCtx<'a> {
    /// Requests loop exit after the current iteration.
    pub fn quit(&mut self) {
        *self.running = false;
    }

    pub fn is_running(&self) -> bool {
        *self.running
    }

    /// Seconds since the previous frame; zero before the first frame.
    pub fn dt(&self) -> f32 {
        self.time.dt
    }

    pub fn time(&self) -> FrameTime {
        self.time
    }

    /// Drawable size in physical pixels.
    pub fn surface_size(&self) -> (u32, u32) {
        self.surface_size
    }

    /// The graphics context, when the platform has one.
    pub fn gpu(&self) -> Option<&'a Gpu<'static>> {
        self.gpu
    }

    pub fn require_gpu(&self) -> Result<&'a Gpu<'static>> {
        self.gpu.context("no graphics context on this platform")
    }

    pub fn resources(&self) -> &'a Resources {
        self.resources
    }

    pub fn metrics(&self) -> &'a ResourceMetrics {
        self.resources.metrics()
    }

    /// Per-user preferences directory, when one could be resolved.
    pub fn prefs_path(&self) -> Option<&'a Path> {
        self.prefs_path
    }

    /// Loads `<base_path>.vs` / `<base_path>.fs` from the resource root.
    pub fn load_shader_program(&self, base_path: &str) -> Result<ShaderProgram> {
        let gpu = self.require_gpu()?;
        load_shader_program(gpu, self.resources, base_path)
            .with_context(|| format!("failed to load shader program {base_path}"))
    }

    /// Uploads `contents` into a new vertex buffer.
    pub fn create_vertex_buffer(&self, label: &str, contents: &[u8]) -> Result<wgpu::Buffer> {
        let buffer = self.require_gpu()?.create_vertex_buffer(label, contents)?;
        self.metrics().record_buffer();
        Ok(buffer)
    }

    /// Builds a render pipeline for `program` fed by `layout`.
    pub fn create_pipeline(
        &self,
        program: &ShaderProgram,
        layout: &VertexLayout,
        options: &PipelineOptions,
    ) -> Result<wgpu::RenderPipeline> {
        let pipeline = program.create_pipeline(self.require_gpu()?, layout, options)?;
        self.metrics().record_pipeline();
        Ok(pipeline)
    }
}
