//! Shader program pipeline.
//!
//! A program is built from two GLSL 450 sources found by naming convention:
//! `<base>.vs` (vertex stage) and `<base>.fs` (fragment stage). Each stage is
//! compiled and validated on the CPU with naga, the pair is linked by
//! matching the vertex outputs against the fragment inputs, and only then are
//! GPU shader modules created. Compile and link failures carry the
//! diagnostic log produced for the offending source.

mod error;
mod link;
mod program;
mod stage;

pub use error::ShaderError;
pub use link::{LinkedProgram, StageVarying};
pub use program::{load_linked_program, load_shader_program, PipelineOptions, ShaderProgram};
pub use stage::{compile_stage, CompiledStage, ShaderStageKind};
