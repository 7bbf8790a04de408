use std::path::PathBuf;

use anyhow::Result;
use bytemuck::{Pod, Zeroable};
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{Key, NamedKey};

use lodestar_engine::bitmap::Bitmap;
use lodestar_engine::core::{App, AppCtx};
use lodestar_engine::layout::{ComponentType, VertexLayout};
use lodestar_engine::logging::{init_logging, LoggingConfig};
use lodestar_engine::render::{RenderCtx, RenderTarget};
use lodestar_engine::resource::RESOURCE_ROOT_ENV;
use lodestar_engine::shader::{PipelineOptions, ShaderProgram};
use lodestar_engine::window::{Runtime, RuntimeConfig};

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 2],
    color: [u8; 4],
}

const TRIANGLE: [Vertex; 3] = [
    Vertex { position: [0.0, 0.6], color: [255, 0, 0, 255] },
    Vertex { position: [-0.6, -0.6], color: [0, 255, 0, 255] },
    Vertex { position: [0.6, -0.6], color: [0, 0, 255, 255] },
];

#[derive(Default)]
struct TestApp {
    program: Option<ShaderProgram>,
    pipeline: Option<wgpu::RenderPipeline>,
    vertices: Option<wgpu::Buffer>,
    button: Option<Bitmap>,
    elapsed: f32,
}

impl App for TestApp {
    fn startup(&mut self, ctx: &mut AppCtx<'_>) -> Result<()> {
        let program = ctx.load_shader_program("resources/glsl/testshader")?;

        let mut layout = VertexLayout::new();
        layout
            .begin()
            .set("position", 2, ComponentType::Float)
            .set_normalized("color", 4, ComponentType::UnsignedByte)
            .end();

        let format = ctx.require_gpu()?.surface_format();
        let options = PipelineOptions::new(format);
        self.pipeline = Some(ctx.create_pipeline(&program, &layout, &options)?);
        let bytes = layout.cast_vertices(&TRIANGLE)?;
        self.vertices = Some(ctx.create_vertex_buffer("triangle", bytes)?);
        self.program = Some(program);

        match ctx.resources().load("resources/testbutton.png") {
            Ok(bytes) => match Bitmap::decode(&bytes) {
                Ok(bmp) => {
                    log::info!("test button: {}x{} {:?}", bmp.width(), bmp.height(), bmp.format());
                    self.button = Some(bmp);
                }
                Err(e) => log::warn!("test button not decoded: {e}"),
            },
            Err(e) => log::warn!("test button not loaded: {e}"),
        }

        if let Some(prefs) = ctx.prefs_path() {
            log::info!("preferences in {}", prefs.display());
        }
        Ok(())
    }

    fn update(&mut self, ctx: &mut AppCtx<'_>) -> Result<()> {
        self.elapsed += ctx.dt();
        if self.elapsed >= 5.0 {
            let (w, h) = ctx.surface_size();
            log::debug!("frame {} at {w}x{h}, dt {:.4}", ctx.time().frame_index, ctx.dt());
            self.elapsed = 0.0;
        }
        Ok(())
    }

    fn shutdown(&mut self, _ctx: &mut AppCtx<'_>) -> Result<()> {
        self.vertices = None;
        self.pipeline = None;
        self.program = None;
        self.button = None;
        Ok(())
    }

    fn on_event(&mut self, ctx: &mut AppCtx<'_>, event: &WindowEvent) {
        if let WindowEvent::KeyboardInput { event, .. } = event {
            if event.state == ElementState::Pressed
                && event.logical_key == Key::Named(NamedKey::Escape)
            {
                ctx.quit();
            }
        }
    }

    fn render(&mut self, _ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        let (Some(pipeline), Some(vertices)) = (&self.pipeline, &self.vertices) else {
            return;
        };
        let mut pass = target.begin_color_pass("triangle");
        pass.set_pipeline(pipeline);
        pass.set_vertex_buffer(0, vertices.slice(..));
        pass.draw(0..TRIANGLE.len() as u32, 0..1);
    }
}

/// Resources live next to this crate's manifest unless overridden.
fn resource_root() -> PathBuf {
    std::env::var_os(RESOURCE_ROOT_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")))
}

fn main() {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig::new("Testing", 640, 480)
        .with_ids("com.lobotony", "lodestar")
        .with_resource_root(resource_root());

    if let Err(e) = Runtime::run(config, TestApp::default()) {
        log::error!("lodestar runtime error: {e:#}");
        std::process::exit(1);
    }
}
