use lodestar_engine::layout::{ComponentType, VertexLayout};
use lodestar_engine::resource::Resources;
use lodestar_engine::shader::{load_linked_program, ShaderError, ShaderStageKind};

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

fn resources_with(files: &[(&str, &str)]) -> (tempfile::TempDir, Resources) {
    let dir = tempfile::tempdir().unwrap();
    let resources = Resources::new(dir.path());
    for (path, contents) in files {
        resources.save(path, contents.as_bytes()).unwrap();
    }
    resources.metrics().reset();
    (dir, resources)
}

#[test]
fn program_loads_from_disk_and_resolves_layout() {
    let (_dir, resources) = resources_with(&[("test.vs", VS), ("test.fs", FS)]);

    let program = load_linked_program(&resources, "test").unwrap();
    assert_eq!(program.attribute_location("position"), Some(0));
    assert_eq!(program.attribute_location("color"), Some(1));

    let mut layout = VertexLayout::new();
    layout
        .begin()
        .set("position", 2, ComponentType::Float)
        .set_normalized("color", 4, ComponentType::UnsignedByte)
        .end();

    let wgpu_layout = layout
        .to_wgpu(|name| program.attribute_location(name))
        .unwrap();
    let buffer = wgpu_layout.buffer_layout();
    assert_eq!(buffer.array_stride, 12);
    assert_eq!(buffer.attributes[1].offset, 8);
    assert_eq!(buffer.attributes[1].format, wgpu::VertexFormat::Unorm8x4);

    let m = resources.metrics().snapshot();
    assert_eq!(m.file_loads, 2);
    assert_eq!(m.bytes_loaded, (VS.len() + FS.len()) as u64);
    assert_eq!(m.compiled_stages, 2);
    assert_eq!(m.linked_programs, 1);
}

#[test]
fn missing_fragment_stage_fails_fragment_compile() {
    let (_dir, resources) = resources_with(&[("test.vs", VS)]);

    let err = load_linked_program(&resources, "test").unwrap_err();
    match err {
        ShaderError::Compile { stage, path, .. } => {
            assert_eq!(stage, ShaderStageKind::Fragment);
            assert_eq!(path, "test");
        }
        other => panic!("unexpected error: {other}"),
    }

    // The vertex stage compiled before the fragment stage failed.
    let snapshot = resources.metrics().snapshot();
    assert_eq!(snapshot.compiled_stages, 1);
    assert_eq!(snapshot.linked_programs, 0);
}

#[test]
fn mismatched_interface_fails_link() {
    let fs = FS.replace("location = 0) in vec4 v_color", "location = 3) in vec4 v_color");
    let (_dir, resources) = resources_with(&[("test.vs", VS), ("test.fs", &fs)]);

    let err = load_linked_program(&resources, "test").unwrap_err();
    assert!(matches!(err, ShaderError::Link { .. }), "{err}");
    assert!(err.log().is_some_and(|log| log.contains("location 3")));
    let snapshot = resources.metrics().snapshot();
    assert_eq!(snapshot.compiled_stages, 2);
    assert_eq!(snapshot.linked_programs, 0);
}
