use crate::device::DiagnosticsError;
use crate::layout::LayoutError;

use super::ShaderStageKind;

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("{stage} shader compilation failed: {path}")]
    Compile {
        stage: ShaderStageKind,
        path: String,
        log: String,
    },

    #[error("shader program link failed: {path}")]
    Link { path: String, log: String },

    #[error(transparent)]
    Gpu(#[from] DiagnosticsError),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

impl ShaderError {
    /// Compile or link diagnostic log, if this error carries one.
    pub fn log(&self) -> Option<&str> {
        match self {
            ShaderError::Compile { log, .. } | ShaderError::Link { log, .. } => Some(log),
            _ => None,
        }
    }
}
