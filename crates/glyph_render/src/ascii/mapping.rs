use image::RgbaImage;

use super::{
    grid::{Cell, GlyphGrid},
    ramp::Ramp,
};
use crate::image_pipeline::adjust;
use crate::GlyphConfig;

/// Maps resampled pixels to cells.
///
/// Plain and color output share this one path; color mode only decides
/// whether the untouched source RGB travels with the glyph.
#[derive(Clone, Copy, Debug)]
pub struct GlyphMapper<'a> {
    ramp: &'a Ramp,
    contrast: f64,
    invert: bool,
    color: bool,
}

impl<'a> GlyphMapper<'a> {
    pub fn new(ramp: &'a Ramp, contrast: f64, invert: bool, color: bool) -> Self {
        Self { ramp, contrast, invert, color }
    }

    pub fn from_config(config: &'a GlyphConfig) -> Self {
        Self::new(&config.ramp, config.contrast, config.invert, config.color)
    }

    /// Brightness that drives glyph selection, after contrast and invert.
    pub fn brightness(&self, rgb: [u8; 3]) -> f64 {
        let [r, g, b] = rgb;
        let adjusted = adjust::apply_contrast(adjust::luminance(r, g, b), self.contrast);
        adjust::glyph_brightness(adjusted, self.invert)
    }

    pub fn glyph_index(&self, rgb: [u8; 3]) -> usize {
        self.ramp.index_for(self.brightness(rgb))
    }

    pub fn map_pixel(&self, rgb: [u8; 3]) -> Cell {
        let ch = self.ramp.chars()[self.glyph_index(rgb)];
        Cell::new(ch, self.color.then_some(rgb))
    }

    /// Builds a grid covering every pixel of an already resampled image.
    pub fn map_image(&self, image: &RgbaImage) -> GlyphGrid {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return GlyphGrid::empty(width);
        }

        let row_len = width as usize * 4;
        let cells = self.map_rows(image.as_raw(), row_len);
        GlyphGrid::new(width, height, cells)
    }

    fn map_row<'r>(&'r self, row: &'r [u8]) -> impl Iterator<Item = Cell> + 'r {
        row.chunks_exact(4).map(move |px| self.map_pixel([px[0], px[1], px[2]]))
    }

    #[cfg(feature = "parallel")]
    fn map_rows(&self, raw: &[u8], row_len: usize) -> Vec<Cell> {
        use rayon::prelude::*;

        raw.par_chunks_exact(row_len).flat_map_iter(|row| self.map_row(row)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn map_rows(&self, raw: &[u8], row_len: usize) -> Vec<Cell> {
        raw.chunks_exact(row_len).flat_map(|row| self.map_row(row)).collect()
    }
}
