use std::borrow::Cow;

use crate::device::Gpu;
use crate::layout::VertexLayout;
use crate::resource::Resources;

use super::link::{LinkedProgram, StageVarying};
use super::stage::{compile_stage, ShaderStageKind};
use super::ShaderError;

/// GLSL entry point name.
const ENTRY_POINT: &str = "main";

/// Render-pipeline parameters that are not part of the program itself.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub label: Option<String>,
    pub color_format: wgpu::TextureFormat,
    pub topology: wgpu::PrimitiveTopology,
    pub cull_mode: Option<wgpu::Face>,
    pub blend: Option<wgpu::BlendState>,
}

impl PipelineOptions {
    pub fn new(color_format: wgpu::TextureFormat) -> Self {
        Self {
            label: None,
            color_format,
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
        }
    }
}

/// A linked program with its GPU shader modules.
///
/// Owned by whichever renderer loaded it; dropping it releases the modules.
#[derive(Debug)]
pub struct ShaderProgram {
    linked: LinkedProgram,
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
}

impl ShaderProgram {
    /// Creates the GPU modules for an already linked program.
    pub fn create(gpu: &Gpu<'_>, linked: LinkedProgram) -> Result<Self, ShaderError> {
        let vertex = create_module(gpu, &linked, ShaderStageKind::Vertex)?;
        let fragment = create_module(gpu, &linked, ShaderStageKind::Fragment)?;

        Ok(Self {
            linked,
            vertex,
            fragment,
        })
    }

    pub fn path(&self) -> &str {
        self.linked.path()
    }

    pub fn linked(&self) -> &LinkedProgram {
        &self.linked
    }

    pub fn vertex_inputs(&self) -> &[StageVarying] {
        self.linked.vertex_inputs()
    }

    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.linked.attribute_location(name)
    }

    pub fn vertex_module(&self) -> &wgpu::ShaderModule {
        &self.vertex
    }

    pub fn fragment_module(&self) -> &wgpu::ShaderModule {
        &self.fragment
    }

    /// Builds a render pipeline feeding `layout` into this program.
    ///
    /// Attribute names are resolved to the vertex stage's input locations.
    pub fn create_pipeline(
        &self,
        gpu: &Gpu<'_>,
        layout: &VertexLayout,
        options: &PipelineOptions,
    ) -> Result<wgpu::RenderPipeline, ShaderError> {
        let vertex_layout = layout.to_wgpu(|name| self.attribute_location(name))?;
        let label = options
            .label
            .clone()
            .unwrap_or_else(|| format!("{} pipeline", self.path()));

        let pipeline = gpu
            .device()
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&label),
                layout: None,

                vertex: wgpu::VertexState {
                    module: &self.vertex,
                    entry_point: Some(ENTRY_POINT),
                    compilation_options: Default::default(),
                    buffers: &[vertex_layout.buffer_layout()],
                },

                fragment: Some(wgpu::FragmentState {
                    module: &self.fragment,
                    entry_point: Some(ENTRY_POINT),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: options.color_format,
                        blend: options.blend,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),

                primitive: wgpu::PrimitiveState {
                    topology: options.topology,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: options.cull_mode,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },

                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        gpu.diagnostics().check(&label)?;
        Ok(pipeline)
    }
}

fn create_module(
    gpu: &Gpu<'_>,
    linked: &LinkedProgram,
    stage: ShaderStageKind,
) -> Result<wgpu::ShaderModule, ShaderError> {
    let compiled = match stage {
        ShaderStageKind::Vertex => linked.vertex(),
        ShaderStageKind::Fragment => linked.fragment(),
    };
    let label = format!("{}.{}", linked.path(), stage.extension());

    let module = gpu
        .device()
        .create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&label),
            source: wgpu::ShaderSource::Glsl {
                shader: Cow::Owned(compiled.source().to_string()),
                stage: stage.naga(),
                defines: &[],
            },
        });

    gpu.diagnostics().check(&label)?;
    Ok(module)
}

/// Loads `<base_path>.vs` and `<base_path>.fs` from `resources`, compiles,
/// links and uploads them.
///
/// Missing files are logged and read as empty sources, which then fail to
/// compile. Each call produces a new program.
pub fn load_shader_program(
    gpu: &Gpu<'_>,
    resources: &Resources,
    base_path: &str,
) -> Result<ShaderProgram, ShaderError> {
    let linked = load_linked_program(resources, base_path)?;
    let program = ShaderProgram::create(gpu, linked)?;
    log::info!("loaded shader program {base_path}");
    Ok(program)
}

/// CPU half of [`load_shader_program`]: load, compile, link.
pub fn load_linked_program(
    resources: &Resources,
    base_path: &str,
) -> Result<LinkedProgram, ShaderError> {
    let vs_bytes = resources.load_or_empty(&stage_path(base_path, ShaderStageKind::Vertex));
    let fs_bytes = resources.load_or_empty(&stage_path(base_path, ShaderStageKind::Fragment));

    // Sources are sized buffers, not terminated strings.
    let vs = String::from_utf8_lossy(&vs_bytes);
    let fs = String::from_utf8_lossy(&fs_bytes);

    // Each stage counts as soon as it compiles, even if the link fails later.
    let metrics = resources.metrics();
    let vertex = compile_stage(ShaderStageKind::Vertex, &vs, base_path)?;
    metrics.record_stage();
    let fragment = compile_stage(ShaderStageKind::Fragment, &fs, base_path)?;
    metrics.record_stage();

    let linked = LinkedProgram::link(vertex, fragment, base_path)?;
    metrics.record_program();

    Ok(linked)
}

fn stage_path(base_path: &str, stage: ShaderStageKind) -> String {
    format!("{base_path}.{}", stage.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_paths_append_extension() {
        assert_eq!(stage_path("glsl/test", ShaderStageKind::Vertex), "glsl/test.vs");
        assert_eq!(stage_path("glsl/test", ShaderStageKind::Fragment), "glsl/test.fs");
    }

    #[test]
    fn missing_sources_fail_as_vertex_compile_error() {
        let dir = tempfile::tempdir().unwrap();
        let resources = Resources::new(dir.path());

        let err = load_linked_program(&resources, "glsl/absent").unwrap_err();
        assert!(matches!(
            err,
            ShaderError::Compile { stage: ShaderStageKind::Vertex, .. }
        ));
        assert_eq!(resources.metrics().snapshot().linked_programs, 0);
    }

    #[test]
    fn pipeline_options_default_to_triangles() {
        let o = PipelineOptions::new(wgpu::TextureFormat::Rgba8Unorm);
        assert_eq!(o.topology, wgpu::PrimitiveTopology::TriangleList);
        assert!(o.cull_mode.is_none());
    }
}
