use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba, RgbaImage};

use super::loader::Bitmap;
use crate::GlyphError;

/// Glyph cells are roughly twice as tall as they are wide.
pub const DEFAULT_CELL_ASPECT: f64 = 0.5;

/// Upper bound on cells per grid; 16M cells is a 4096x4096 glyph canvas.
pub const MAX_CELLS: usize = 1 << 24;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetGeometry {
    pub columns: u32,
    pub rows: u32,
    pub cell_aspect: f64,
}

impl TargetGeometry {
    /// `rows = floor(columns * (height / width) * cell_aspect)`.
    ///
    /// Returns `None` for a zero-area source.
    pub fn derive(
        source_width: u32,
        source_height: u32,
        columns: u32,
        cell_aspect: f64,
    ) -> Option<Self> {
        if source_width == 0 || source_height == 0 {
            return None;
        }

        let image_ratio = f64::from(source_height) / f64::from(source_width);
        let rows = (f64::from(columns) * image_ratio * cell_aspect).floor();
        // `as` saturates, so absurd ratios cap at u32::MAX instead of wrapping.
        let rows = if rows.is_finite() && rows > 0.0 { rows as u32 } else { 0 };

        Some(Self { columns, rows, cell_aspect })
    }

    pub fn is_empty(&self) -> bool {
        self.columns == 0 || self.rows == 0
    }

    /// Number of cells, or `None` when it overflows or exceeds [`MAX_CELLS`].
    pub fn cell_count(&self) -> Option<usize> {
        (self.columns as usize)
            .checked_mul(self.rows as usize)
            .filter(|&cells| cells <= MAX_CELLS)
    }
}

/// Bitmap scaling primitive supplied by the host.
///
/// Implementations must return an RGBA8 buffer of exactly
/// `width x height` pixels.
pub trait Resampler {
    fn resize(&self, bitmap: &Bitmap<'_>, width: u32, height: u32)
        -> Result<RgbaImage, GlyphError>;
}

/// Resampler backed by `image::imageops::resize`.
#[derive(Clone, Copy, Debug)]
pub struct ImageResampler {
    filter: FilterType,
}

impl ImageResampler {
    pub fn new(filter: FilterType) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> FilterType {
        self.filter
    }
}

impl Default for ImageResampler {
    /// Bilinear, the filter a browser canvas uses for `drawImage`.
    fn default() -> Self {
        Self::new(FilterType::Triangle)
    }
}

impl Resampler for ImageResampler {
    fn resize(
        &self,
        bitmap: &Bitmap<'_>,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, GlyphError> {
        let (source_width, source_height) = bitmap.dimensions();
        let view: ImageBuffer<Rgba<u8>, &[u8]> =
            ImageBuffer::from_raw(source_width, source_height, bitmap.pixels()).ok_or(
                GlyphError::BufferLength {
                    expected: source_width as usize * source_height as usize * 4,
                    actual: bitmap.pixels().len(),
                },
            )?;

        if (source_width, source_height) == (width, height) {
            return RgbaImage::from_raw(width, height, bitmap.pixels().to_vec()).ok_or(
                GlyphError::ResampledSize {
                    expected: (width, height),
                    actual: (source_width, source_height),
                },
            );
        }

        Ok(imageops::resize(&view, width, height, self.filter))
    }
}
