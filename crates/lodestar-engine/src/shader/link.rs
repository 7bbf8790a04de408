use wgpu::naga;

use super::stage::{compile_stage, CompiledStage, ShaderStageKind};
use super::ShaderError;

/// One user-defined input or output of an entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct StageVarying {
    pub location: u32,
    pub name: Option<String>,
    pub ty: naga::TypeInner,
}

/// A vertex/fragment pair whose interfaces agree.
#[derive(Debug)]
pub struct LinkedProgram {
    path: String,
    vertex: CompiledStage,
    fragment: CompiledStage,
    attributes: Vec<StageVarying>,
}

impl LinkedProgram {
    /// Compiles both stages (vertex first) and links them.
    pub fn from_sources(vertex: &str, fragment: &str, path: &str) -> Result<Self, ShaderError> {
        let vs = compile_stage(ShaderStageKind::Vertex, vertex, path)?;
        let fs = compile_stage(ShaderStageKind::Fragment, fragment, path)?;
        Self::link(vs, fs, path)
    }

    /// Links two compiled stages.
    ///
    /// Fails when either stage lacks its entry point or when a fragment
    /// input is not written by the vertex stage with the same type. The log
    /// lists every problem found.
    pub fn link(
        vertex: CompiledStage,
        fragment: CompiledStage,
        path: &str,
    ) -> Result<Self, ShaderError> {
        let mut problems = Vec::new();

        let vs_entry = vertex.entry_point();
        let fs_entry = fragment.entry_point();
        if vs_entry.is_none() {
            problems.push("vertex stage has no vertex entry point".to_string());
        }
        if fs_entry.is_none() {
            problems.push("fragment stage has no fragment entry point".to_string());
        }

        let (Some(vs_entry), Some(fs_entry)) = (vs_entry, fs_entry) else {
            return Err(link_failed(path, problems));
        };

        let attributes = inputs(vertex.module(), vs_entry);
        let produced = outputs(vertex.module(), vs_entry);
        let consumed = inputs(fragment.module(), fs_entry);

        for input in &consumed {
            let label = input.name.as_deref().unwrap_or("<unnamed>");
            match produced.iter().find(|o| o.location == input.location) {
                None => problems.push(format!(
                    "fragment input `{label}` at location {} is not written by the vertex stage",
                    input.location
                )),
                Some(out) if out.ty != input.ty => problems.push(format!(
                    "location {}: vertex stage writes {:?}, fragment input `{label}` reads {:?}",
                    input.location, out.ty, input.ty
                )),
                Some(_) => {}
            }
        }

        if !problems.is_empty() {
            return Err(link_failed(path, problems));
        }

        log::debug!("linked shader program {path}");

        Ok(Self {
            path: path.to_string(),
            vertex,
            fragment,
            attributes,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn vertex(&self) -> &CompiledStage {
        &self.vertex
    }

    pub fn fragment(&self) -> &CompiledStage {
        &self.fragment
    }

    /// User-defined vertex inputs, in declaration order.
    pub fn vertex_inputs(&self) -> &[StageVarying] {
        &self.attributes
    }

    /// Binding location of the named vertex input.
    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.attributes
            .iter()
            .find(|a| a.name.as_deref() == Some(name))
            .map(|a| a.location)
    }
}

fn link_failed(path: &str, problems: Vec<String>) -> ShaderError {
    let text = problems.join("\n");
    log::error!("shader program link failed: {path}\n{text}");
    ShaderError::Link {
        path: path.to_string(),
        log: text,
    }
}

fn inputs(module: &naga::Module, entry: &naga::EntryPoint) -> Vec<StageVarying> {
    let mut out = Vec::new();
    for arg in &entry.function.arguments {
        collect(module, arg.name.as_deref(), arg.ty, arg.binding.as_ref(), &mut out);
    }
    out
}

fn outputs(module: &naga::Module, entry: &naga::EntryPoint) -> Vec<StageVarying> {
    let mut out = Vec::new();
    if let Some(result) = &entry.function.result {
        collect(module, None, result.ty, result.binding.as_ref(), &mut out);
    }
    out
}

// Built-ins are skipped; unbound structs are flattened into their members.
fn collect(
    module: &naga::Module,
    name: Option<&str>,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut Vec<StageVarying>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => out.push(StageVarying {
            location: *location,
            name: name.map(str::to_string),
            ty: module.types[ty].inner.clone(),
        }),
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for m in members {
                    collect(module, m.name.as_deref(), m.ty, m.binding.as_ref(), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = "#version 450
layout(location = 0) in vec2 position;
layout(location = 1) in vec4 color;
layout(location = 0) out vec4 v_color;
void main() {
    v_color = color;
    gl_Position = vec4(position, 0.0, 1.0);
}
";

    const FS: &str = "#version 450
layout(location = 0) in vec4 v_color;
layout(location = 0) out vec4 frag_color;
void main() {
    frag_color = v_color;
}
";

    #[test]
    fn valid_pair_links() {
        let p = LinkedProgram::from_sources(VS, FS, "glsl/test").unwrap();
        assert_eq!(p.path(), "glsl/test");
        assert_eq!(p.attribute_location("position"), Some(0));
        assert_eq!(p.attribute_location("color"), Some(1));
        assert_eq!(p.attribute_location("normal"), None);
        assert_eq!(p.vertex_inputs().len(), 2);
    }

    #[test]
    fn vertex_syntax_error_fails_before_fragment() {
        let broken = VS.replace("v_color = color;", "v_color = color");
        let err = LinkedProgram::from_sources(&broken, FS, "glsl/test").unwrap_err();
        assert!(matches!(
            err,
            ShaderError::Compile { stage: ShaderStageKind::Vertex, .. }
        ));
        assert!(!err.log().unwrap().is_empty());
    }

    #[test]
    fn fragment_error_names_fragment_stage() {
        let broken = FS.replace("frag_color = v_color;", "frag_color = undefined_thing;");
        let err = LinkedProgram::from_sources(VS, &broken, "glsl/test").unwrap_err();
        assert!(matches!(
            err,
            ShaderError::Compile { stage: ShaderStageKind::Fragment, .. }
        ));
    }

    #[test]
    fn unwritten_fragment_input_fails_link() {
        let fs = "#version 450
layout(location = 0) in vec4 v_color;
layout(location = 3) in vec2 v_uv;
layout(location = 0) out vec4 frag_color;
void main() {
    frag_color = v_color * v_uv.x;
}
";
        let err = LinkedProgram::from_sources(VS, fs, "glsl/uv").unwrap_err();
        match err {
            ShaderError::Link { path, log } => {
                assert_eq!(path, "glsl/uv");
                assert!(log.contains("location 3"));
            }
            other => panic!("expected link error, got {other:?}"),
        }
    }

    #[test]
    fn mismatched_varying_type_fails_link() {
        let fs = "#version 450
layout(location = 0) in vec3 v_color;
layout(location = 0) out vec4 frag_color;
void main() {
    frag_color = vec4(v_color, 1.0);
}
";
        let err = LinkedProgram::from_sources(VS, fs, "glsl/test").unwrap_err();
        assert!(err.log().unwrap().contains("location 0"));
    }
}
