//! Bitmap to glyph grid conversion.
//!
//! The pipeline resamples a decoded RGBA8 bitmap to one pixel per glyph
//! cell, computes BT.601 luminance, applies a contrast gain around mid gray,
//! optionally inverts the result for glyph lookup and picks a glyph from a
//! [`Ramp`]. Color mode keeps the untouched source RGB on every cell.
//!
//! ```
//! use glyph_render::{convert, Bitmap, GlyphConfig, Ramp};
//!
//! let pixels = [0u8, 0, 0, 255].repeat(4);
//! let bitmap = Bitmap::new(2, 2, &pixels).unwrap();
//! let config = GlyphConfig { target_width: 2, ramp: Ramp::new("@ ").unwrap(), ..Default::default() };
//! let grid = convert(&bitmap, &config).unwrap();
//! assert_eq!(grid.to_text(), "@@\n");
//! ```

mod ascii;
mod image_pipeline;
pub mod render;

use log::{debug, trace, warn};

pub use ascii::{
    grid::{Cell, GlyphGrid},
    mapping::GlyphMapper,
    ramp::Ramp,
};
pub use image_pipeline::{
    adjust::{apply_contrast, glyph_brightness, luminance},
    loader::{open_rgba, Bitmap},
    resize::{ImageResampler, Resampler, TargetGeometry, DEFAULT_CELL_ASPECT, MAX_CELLS},
};

/// Broad failure families a caller can branch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Configuration,
    Image,
    Font,
    Io,
}

#[derive(Debug, thiserror::Error)]
pub enum GlyphError {
    #[error("bitmap has zero area ({width}x{height})")]
    ZeroArea { width: u32, height: u32 },
    #[error("pixel buffer holds {actual} bytes, expected {expected} for RGBA8")]
    BufferLength { expected: usize, actual: usize },
    #[error("resampler returned {}x{}, expected {}x{}", .actual.0, .actual.1, .expected.0, .expected.1)]
    ResampledSize { expected: (u32, u32), actual: (u32, u32) },
    #[error("{columns}x{rows} grid exceeds the limit of {max} cells", max = MAX_CELLS)]
    GridTooLarge { columns: u32, rows: u32 },
    #[error("ramp must contain at least one glyph")]
    EmptyRamp,
    #[error("target width must be at least 1")]
    ZeroWidth,
    #[error("contrast must be a finite positive number, got {0}")]
    InvalidContrast(f64),
    #[error("cell aspect must be a finite positive number, got {0}")]
    InvalidCellAspect(f64),
    #[error("failed to load image: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to parse font: {0}")]
    Font(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl GlyphError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GlyphError::ZeroArea { .. }
            | GlyphError::BufferLength { .. }
            | GlyphError::ResampledSize { .. }
            | GlyphError::GridTooLarge { .. } => ErrorKind::InvalidInput,
            GlyphError::EmptyRamp
            | GlyphError::ZeroWidth
            | GlyphError::InvalidContrast(_)
            | GlyphError::InvalidCellAspect(_) => ErrorKind::Configuration,
            GlyphError::Image(_) => ErrorKind::Image,
            GlyphError::Font(_) => ErrorKind::Font,
            GlyphError::Io(_) => ErrorKind::Io,
        }
    }
}

/// Immutable settings for one conversion.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphConfig {
    /// Number of glyph columns in the output.
    pub target_width: u32,
    pub ramp: Ramp,
    /// Gain around mid gray; 1.0 leaves brightness untouched.
    pub contrast: f64,
    /// Flips glyph lookup. Never affects emitted colors.
    pub invert: bool,
    /// Attach the source RGB to every cell.
    pub color: bool,
    /// Cell width / height ratio used to derive the row count.
    pub cell_aspect: f64,
}

impl Default for GlyphConfig {
    fn default() -> Self {
        Self {
            target_width: 100,
            ramp: Ramp::standard(),
            contrast: 1.0,
            invert: false,
            color: false,
            cell_aspect: DEFAULT_CELL_ASPECT,
        }
    }
}

impl GlyphConfig {
    pub fn validate(&self) -> Result<(), GlyphError> {
        if self.ramp.is_empty() {
            return Err(GlyphError::EmptyRamp);
        }
        if self.target_width == 0 {
            return Err(GlyphError::ZeroWidth);
        }
        if !self.contrast.is_finite() || self.contrast <= 0.0 {
            return Err(GlyphError::InvalidContrast(self.contrast));
        }
        if !self.cell_aspect.is_finite() || self.cell_aspect <= 0.0 {
            return Err(GlyphError::InvalidCellAspect(self.cell_aspect));
        }
        Ok(())
    }

    pub fn geometry_for(&self, bitmap: &Bitmap<'_>) -> Option<TargetGeometry> {
        TargetGeometry::derive(bitmap.width(), bitmap.height(), self.target_width, self.cell_aspect)
    }
}

/// Converts `bitmap` with the default bilinear [`ImageResampler`].
pub fn convert(bitmap: &Bitmap<'_>, config: &GlyphConfig) -> Result<GlyphGrid, GlyphError> {
    convert_with(bitmap, config, &ImageResampler::default())
}

/// Converts `bitmap` using a caller supplied resize primitive.
///
/// Configuration is checked before the bitmap, and the resampler is never
/// invoked for zero-area sources, grids that collapse to zero rows or grids
/// larger than [`MAX_CELLS`].
pub fn convert_with<R: Resampler + ?Sized>(
    bitmap: &Bitmap<'_>,
    config: &GlyphConfig,
    resampler: &R,
) -> Result<GlyphGrid, GlyphError> {
    config.validate()?;

    let (width, height) = bitmap.dimensions();
    let geometry =
        config.geometry_for(bitmap).ok_or(GlyphError::ZeroArea { width, height })?;
    debug!(
        "converting {width}x{height} bitmap to {}x{} glyphs (contrast {}, invert {}, color {})",
        geometry.columns, geometry.rows, config.contrast, config.invert, config.color
    );

    if geometry.cell_count().is_none() {
        return Err(GlyphError::GridTooLarge { columns: geometry.columns, rows: geometry.rows });
    }

    if geometry.is_empty() {
        warn!("{width}x{height} bitmap collapses to zero rows at {} columns", geometry.columns);
        return Ok(GlyphGrid::empty(geometry.columns));
    }

    trace!("resampling to {}x{}", geometry.columns, geometry.rows);
    let resized = resampler.resize(bitmap, geometry.columns, geometry.rows)?;
    if resized.dimensions() != (geometry.columns, geometry.rows) {
        return Err(GlyphError::ResampledSize {
            expected: (geometry.columns, geometry.rows),
            actual: resized.dimensions(),
        });
    }

    Ok(GlyphMapper::from_config(config).map_image(&resized))
}
