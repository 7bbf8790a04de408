use thiserror::Error;

use crate::resource::ResourceError;

use super::BitmapFormat;

#[derive(Debug, Error)]
pub enum BitmapError {
    #[error("cannot decode an empty buffer")]
    Empty,

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("failed to encode png: {0}")]
    Encode(#[source] image::ImageError),

    #[error(transparent)]
    Write(#[from] ResourceError),

    #[error("{op} requires an RGBA bitmap, got {format:?}")]
    RequiresRgba {
        op: &'static str,
        format: BitmapFormat,
    },

    #[error("pixel ({x}, {y}) outside {width}x{height} bitmap")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}
