//! CPU-side bitmaps.
//!
//! Decoding and PNG encoding go through the `image` crate; the pixel
//! operations work directly on the tightly packed byte buffer.

mod error;

use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};

use crate::resource::save_bytes;

pub use error::BitmapError;

/// Pixel layout of a [`Bitmap`]. Channels are 8 bits each.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BitmapFormat {
    Alpha,
    Rgb,
    Rgba,
}

impl BitmapFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            BitmapFormat::Alpha => 1,
            BitmapFormat::Rgb => 3,
            BitmapFormat::Rgba => 4,
        }
    }

    fn color_type(self) -> ExtendedColorType {
        match self {
            BitmapFormat::Alpha => ExtendedColorType::L8,
            BitmapFormat::Rgb => ExtendedColorType::Rgb8,
            BitmapFormat::Rgba => ExtendedColorType::Rgba8,
        }
    }
}

/// Owned, row-major pixel buffer with the first row at the top.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Bitmap {
    data: Vec<u8>,
    width: u32,
    height: u32,
    format: BitmapFormat,
    premultiplied: bool,
}

impl Bitmap {
    /// Zero-filled bitmap.
    pub fn new(width: u32, height: u32, format: BitmapFormat) -> Self {
        let len = width as usize * height as usize * format.bytes_per_pixel();
        Self {
            data: vec![0; len],
            width,
            height,
            format,
            premultiplied: false,
        }
    }

    /// Decodes an encoded image (PNG, ...). Images with an alpha channel become
    /// [`BitmapFormat::Rgba`], single-channel images [`BitmapFormat::Alpha`],
    /// everything else [`BitmapFormat::Rgb`].
    pub fn decode(bytes: &[u8]) -> Result<Self, BitmapError> {
        if bytes.is_empty() {
            return Err(BitmapError::Empty);
        }
        let image = image::load_from_memory(bytes)?;
        let (width, height) = (image.width(), image.height());

        let (format, data) = match image {
            DynamicImage::ImageLuma8(gray) => (BitmapFormat::Alpha, gray.into_raw()),
            other if other.color().has_alpha() => (BitmapFormat::Rgba, other.into_rgba8().into_raw()),
            other => (BitmapFormat::Rgb, other.into_rgb8().into_raw()),
        };

        log::debug!("decoded {width}x{height} {format:?} bitmap");
        Ok(Self {
            data,
            width,
            height,
            format,
            premultiplied: false,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> BitmapFormat {
        self.format
    }

    pub fn is_premultiplied(&self) -> bool {
        self.premultiplied
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn row_bytes(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    fn require_rgba(&self, op: &'static str) -> Result<(), BitmapError> {
        match self.format {
            BitmapFormat::Rgba => Ok(()),
            format => Err(BitmapError::RequiresRgba { op, format }),
        }
    }

    /// Mirrors the rows vertically. A middle row of an odd height stays put.
    pub fn flip(&mut self) {
        let row = self.row_bytes();
        if row == 0 {
            return;
        }
        let height = self.height as usize;
        for top in 0..height / 2 {
            let bottom = height - 1 - top;
            let (upper, lower) = self.data.split_at_mut(bottom * row);
            upper[top * row..(top + 1) * row].swap_with_slice(&mut lower[..row]);
        }
    }

    /// Multiplies color channels by alpha.
    pub fn premultiply(&mut self) -> Result<(), BitmapError> {
        self.require_rgba("premultiply")?;
        for px in self.data.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            for c in &mut px[..3] {
                *c = (u16::from(*c) * a / 255) as u8;
            }
        }
        self.premultiplied = true;
        Ok(())
    }

    /// Fills every pixel with `rgba`.
    pub fn clear(&mut self, rgba: [u8; 4]) -> Result<(), BitmapError> {
        self.require_rgba("clear")?;
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
        Ok(())
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) -> Result<(), BitmapError> {
        self.require_rgba("set_pixel")?;
        if x >= self.width || y >= self.height {
            return Err(BitmapError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.data[i..i + 4].copy_from_slice(&rgba);
        Ok(())
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.format.bytes_per_pixel();
        let i = (y as usize * self.width as usize + x as usize) * bpp;
        self.data.get(i..i + bpp)
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, BitmapError> {
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(&self.data, self.width, self.height, self.format.color_type())
            .map_err(BitmapError::Encode)?;
        Ok(out)
    }

    /// Encodes as PNG and writes to `path`.
    pub fn write(&self, path: &Path) -> Result<(), BitmapError> {
        let png = self.encode_png()?;
        save_bytes(path, &png)?;
        log::debug!("wrote {}x{} bitmap to {}", self.width, self.height, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba_2x3() -> Bitmap {
        let mut bmp = Bitmap::new(2, 3, BitmapFormat::Rgba);
        for y in 0..3 {
            for x in 0..2 {
                bmp.set_pixel(x, y, [x as u8, y as u8, 0, 255]).unwrap();
            }
        }
        bmp
    }

    #[test]
    fn flip_swaps_rows_and_keeps_middle() {
        let mut bmp = rgba_2x3();
        bmp.flip();
        assert_eq!(bmp.pixel(1, 0).unwrap(), &[1, 2, 0, 255]);
        assert_eq!(bmp.pixel(0, 1).unwrap(), &[0, 1, 0, 255]);
        assert_eq!(bmp.pixel(0, 2).unwrap(), &[0, 0, 0, 255]);
    }

    #[test]
    fn premultiply_scales_color_by_alpha() {
        let mut bmp = Bitmap::new(1, 1, BitmapFormat::Rgba);
        bmp.clear([255, 128, 10, 128]).unwrap();
        bmp.premultiply().unwrap();
        assert_eq!(bmp.pixel(0, 0).unwrap(), &[128, 64, 5, 128]);
        assert!(bmp.is_premultiplied());
    }

    #[test]
    fn rgba_only_operations_reject_rgb() {
        let mut bmp = Bitmap::new(2, 2, BitmapFormat::Rgb);
        assert!(matches!(
            bmp.clear([0; 4]),
            Err(BitmapError::RequiresRgba { op: "clear", .. })
        ));
        assert!(bmp.premultiply().is_err());
    }

    #[test]
    fn set_pixel_out_of_bounds_is_an_error() {
        let mut bmp = Bitmap::new(2, 2, BitmapFormat::Rgba);
        assert!(matches!(
            bmp.set_pixel(2, 0, [0; 4]),
            Err(BitmapError::OutOfBounds { x: 2, .. })
        ));
    }

    #[test]
    fn png_encode_decodes_back() {
        let bmp = rgba_2x3();
        let png = bmp.encode_png().unwrap();
        let decoded = Bitmap::decode(&png).unwrap();
        assert_eq!(decoded, bmp);
    }

    #[test]
    fn decode_rejects_garbage_and_empty() {
        assert!(matches!(Bitmap::decode(&[]), Err(BitmapError::Empty)));
        assert!(matches!(
            Bitmap::decode(b"not an image"),
            Err(BitmapError::Decode(_))
        ));
    }

    #[test]
    fn write_creates_png_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        rgba_2x3().write(&path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }
}
