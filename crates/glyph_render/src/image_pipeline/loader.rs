use image::RgbaImage;

use crate::GlyphError;

/// Borrowed view of a decoded RGBA8 image, row-major.
#[derive(Clone, Copy, Debug)]
pub struct Bitmap<'a> {
    width: u32,
    height: u32,
    pixels: &'a [u8],
}

impl<'a> Bitmap<'a> {
    /// Wraps a raw buffer, rejecting zero-area images and buffers whose
    /// length is not `width * height * 4`.
    pub fn new(width: u32, height: u32, pixels: &'a [u8]) -> Result<Self, GlyphError> {
        if width == 0 || height == 0 {
            return Err(GlyphError::ZeroArea { width, height });
        }

        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|area| area.checked_mul(4))
            .ok_or(GlyphError::BufferLength { expected: usize::MAX, actual: pixels.len() })?;
        if pixels.len() != expected {
            return Err(GlyphError::BufferLength { expected, actual: pixels.len() });
        }

        Ok(Self { width, height, pixels })
    }

    pub fn from_rgba(image: &'a RgbaImage) -> Result<Self, GlyphError> {
        Self::new(image.width(), image.height(), image.as_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &'a [u8] {
        self.pixels
    }

    /// RGB of the pixel at `(x, y)`; alpha is ignored.
    pub fn rgb(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let px = &self.pixels[offset..offset + 3];
        Some([px[0], px[1], px[2]])
    }
}

/// Decodes an image file into an owned RGBA8 buffer.
///
/// Host-side helper; the mapping pipeline only ever sees [`Bitmap`].
pub fn open_rgba<P: AsRef<std::path::Path>>(path: P) -> Result<RgbaImage, GlyphError> {
    Ok(image::open(path)?.into_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(matches!(
            Bitmap::new(0, 0, &[]),
            Err(GlyphError::ZeroArea { width: 0, height: 0 })
        ));
        assert!(matches!(Bitmap::new(3, 0, &[]), Err(GlyphError::ZeroArea { .. })));
    }

    #[test]
    fn buffer_length_must_match() {
        let pixels = [0u8; 15];
        match Bitmap::new(2, 2, &pixels) {
            Err(GlyphError::BufferLength { expected, actual }) => {
                assert_eq!(expected, 16);
                assert_eq!(actual, 15);
            },
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rgb_reads_row_major_and_skips_alpha() {
        let pixels = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16];
        let bitmap = Bitmap::new(2, 2, &pixels).unwrap();
        assert_eq!(bitmap.rgb(1, 0), Some([5, 6, 7]));
        assert_eq!(bitmap.rgb(0, 1), Some([9, 10, 11]));
        assert_eq!(bitmap.rgb(2, 0), None);
    }

    #[test]
    fn wraps_rgba_image() {
        let image = RgbaImage::from_pixel(4, 3, image::Rgba([9, 9, 9, 255]));
        let bitmap = Bitmap::from_rgba(&image).unwrap();
        assert_eq!(bitmap.dimensions(), (4, 3));
    }
}
