use std::fmt;

use wgpu::naga;
use wgpu::naga::front::glsl;
use wgpu::naga::valid::{Capabilities, ValidationFlags, Validator};

use super::ShaderError;

/// Programmable stage of a shader program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStageKind {
    Vertex,
    Fragment,
}

impl ShaderStageKind {
    /// File extension used by the naming convention.
    pub fn extension(self) -> &'static str {
        match self {
            ShaderStageKind::Vertex => "vs",
            ShaderStageKind::Fragment => "fs",
        }
    }

    pub(crate) fn naga(self) -> naga::ShaderStage {
        match self {
            ShaderStageKind::Vertex => naga::ShaderStage::Vertex,
            ShaderStageKind::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStageKind::Vertex => "vertex",
            ShaderStageKind::Fragment => "fragment",
        })
    }
}

/// A parsed and validated stage.
#[derive(Debug)]
pub struct CompiledStage {
    stage: ShaderStageKind,
    source: String,
    module: naga::Module,
}

impl CompiledStage {
    pub fn stage(&self) -> ShaderStageKind {
        self.stage
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn module(&self) -> &naga::Module {
        &self.module
    }

    pub(crate) fn entry_point(&self) -> Option<&naga::EntryPoint> {
        let wanted = self.stage.naga();
        self.module.entry_points.iter().find(|ep| ep.stage == wanted)
    }
}

/// Compiles one stage from GLSL source.
///
/// `path` only labels diagnostics. The returned error carries the
/// frontend or validator log rendered against `source`.
pub fn compile_stage(
    stage: ShaderStageKind,
    source: &str,
    path: &str,
) -> Result<CompiledStage, ShaderError> {
    let fail = |text: String| {
        log::error!("{stage} shader compilation failed ({path}):\n{text}");
        ShaderError::Compile {
            stage,
            path: path.to_string(),
            log: text,
        }
    };

    if source.trim().is_empty() {
        return Err(fail(format!("{path}: {stage} shader source is empty")));
    }

    let mut frontend = glsl::Frontend::default();
    let module = frontend
        .parse(&glsl::Options::from(stage.naga()), source)
        .map_err(|errors| fail(errors.emit_to_string(source)))?;

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|err| fail(err.emit_to_string(source)))?;

    log::debug!("compiled {stage} shader {path}");

    Ok(CompiledStage {
        stage,
        source: source.to_string(),
        module,
    })
}
