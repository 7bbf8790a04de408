use super::ComponentType;

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("vertex layout holds at most {max} attributes")]
    CapacityExceeded { max: usize },

    #[error("attribute `{name}`: component count {count} is outside 1..=4")]
    InvalidComponentCount { name: String, count: u32 },

    #[error("vertex layout already ended; call begin() before declaring attributes")]
    AlreadyEnded,

    #[error("vertex layout was not ended")]
    NotEnded,

    #[error("attribute `{name}`: no GPU vertex format for {count} x {component_type:?} (normalized: {normalized})")]
    UnsupportedFormat {
        name: String,
        component_type: ComponentType,
        count: u32,
        normalized: bool,
    },

    #[error("vertex type is {size} bytes but the layout stride is {stride}")]
    VertexSizeMismatch { stride: u32, size: usize },

    #[error("attribute `{name}` is not an input of the vertex stage")]
    UnresolvedAttribute { name: String },
}
