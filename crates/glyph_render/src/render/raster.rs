//! Raster export using monospace metrics: a glyph advances 0.6 em and a
//! line is 1.2 em tall.

use std::path::Path;

use fontdue::{Font, FontSettings};
use image::{Rgba, RgbaImage};
use log::debug;

use crate::{GlyphError, GlyphGrid};

pub const MIN_FONT_SIZE: f32 = 4.0;
pub const MAX_FONT_SIZE: f32 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasMetrics {
    pub font_size: f32,
    pub char_width: f32,
    pub line_height: f32,
}

impl CanvasMetrics {
    pub fn for_font_size(font_size: f32) -> Self {
        Self {
            font_size,
            char_width: font_size * 3.0 / 5.0,
            line_height: font_size * 6.0 / 5.0,
        }
    }

    /// Largest font size that fits `grid` inside a `width x height` canvas,
    /// clamped to `[MIN_FONT_SIZE, MAX_FONT_SIZE]`.
    pub fn fit(grid: &GlyphGrid, width: u32, height: u32) -> Self {
        let by_width = width as f32 * 5.0 / (grid.width() as f32 * 3.0);
        let by_height = height as f32 * 5.0 / (grid.height() as f32 * 6.0);
        let size = by_width.min(by_height);
        let size = if size.is_nan() { MAX_FONT_SIZE } else { size };
        Self::for_font_size(size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE))
    }

    pub fn canvas_size(&self, grid: &GlyphGrid) -> (u32, u32) {
        let width = (grid.width() as f32 * self.char_width).ceil() as u32;
        let height = (grid.height() as f32 * self.line_height).ceil() as u32;
        (width, height)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RasterStyle {
    pub background: [u8; 3],
    /// Glyph color for cells without their own color.
    pub foreground: [u8; 3],
}

impl Default for RasterStyle {
    fn default() -> Self {
        Self { background: [0, 0, 0], foreground: [255, 255, 255] }
    }
}

/// Coverage bitmap of one glyph, positioned relative to the baseline.
#[derive(Clone, Debug, Default)]
pub struct GlyphCoverage {
    pub width: usize,
    pub height: usize,
    pub xmin: i32,
    pub ymin: i32,
    pub coverage: Vec<u8>,
}

/// Font backend used by [`rasterize`].
pub trait GlyphSource {
    /// Ascent and descent in pixels; descent is negative below the baseline.
    fn line_metrics(&self, font_size: f32) -> (f32, f32);
    fn coverage(&self, ch: char, font_size: f32) -> GlyphCoverage;
}

impl GlyphSource for Font {
    fn line_metrics(&self, font_size: f32) -> (f32, f32) {
        self.horizontal_line_metrics(font_size)
            .map(|metrics| (metrics.ascent, metrics.descent))
            .unwrap_or((font_size * 0.8, -font_size * 0.2))
    }

    fn coverage(&self, ch: char, font_size: f32) -> GlyphCoverage {
        let (metrics, coverage) = self.rasterize(ch, font_size);
        GlyphCoverage {
            width: metrics.width,
            height: metrics.height,
            xmin: metrics.xmin,
            ymin: metrics.ymin,
            coverage,
        }
    }
}

pub fn load_font<P: AsRef<Path>>(path: P) -> Result<Font, GlyphError> {
    let bytes = std::fs::read(path)?;
    Font::from_bytes(bytes, FontSettings::default())
        .map_err(|err| GlyphError::Font(err.to_string()))
}

/// Paints every glyph of `grid` onto a fresh canvas.
pub fn rasterize<F: GlyphSource + ?Sized>(
    grid: &GlyphGrid,
    font: &F,
    metrics: CanvasMetrics,
    style: RasterStyle,
) -> RgbaImage {
    let (width, height) = metrics.canvas_size(grid);
    let [br, bg, bb] = style.background;
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([br, bg, bb, 255]));
    debug!("rasterizing {}x{} grid onto {width}x{height} canvas", grid.width(), grid.height());

    let (ascent, descent) = font.line_metrics(metrics.font_size);
    let padding = (metrics.line_height - (ascent - descent)) / 2.0;

    for (y, row) in grid.rows().enumerate() {
        let baseline = y as f32 * metrics.line_height + padding + ascent;
        for (x, cell) in row.iter().enumerate() {
            if cell.ch.is_whitespace() {
                continue;
            }

            let glyph = font.coverage(cell.ch, metrics.font_size);
            let origin_x = (x as f32 * metrics.char_width).round() as i32 + glyph.xmin;
            let origin_y = baseline.round() as i32 - glyph.height as i32 - glyph.ymin;
            let color = cell.color.unwrap_or(style.foreground);
            blend_glyph(&mut canvas, &glyph, origin_x, origin_y, color);
        }
    }

    canvas
}

fn blend_glyph(canvas: &mut RgbaImage, glyph: &GlyphCoverage, ox: i32, oy: i32, color: [u8; 3]) {
    let (width, height) = (canvas.width() as i32, canvas.height() as i32);
    for gy in 0..glyph.height {
        for gx in 0..glyph.width {
            let alpha = glyph.coverage[gy * glyph.width + gx];
            if alpha == 0 {
                continue;
            }
            let px = ox + gx as i32;
            let py = oy + gy as i32;
            if px < 0 || py < 0 || px >= width || py >= height {
                continue;
            }

            let a = f32::from(alpha) / 255.0;
            let pixel = canvas.get_pixel_mut(px as u32, py as u32);
            for channel in 0..3 {
                let under = f32::from(pixel.0[channel]);
                let over = f32::from(color[channel]);
                pixel.0[channel] = (under * (1.0 - a) + over * a).round() as u8;
            }
        }
    }
}

/// Rasterizes `grid` and writes it as PNG.
pub fn export_png<F: GlyphSource + ?Sized, P: AsRef<Path>>(
    grid: &GlyphGrid,
    font: &F,
    metrics: CanvasMetrics,
    style: RasterStyle,
    path: P,
) -> Result<(), GlyphError> {
    let canvas = rasterize(grid, font, metrics, style);
    canvas.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cell;

    /// Solid box glyph filling the area between baseline and ascent.
    struct BoxFont;

    impl GlyphSource for BoxFont {
        fn line_metrics(&self, font_size: f32) -> (f32, f32) {
            (font_size * 0.8, -font_size * 0.2)
        }

        fn coverage(&self, _ch: char, font_size: f32) -> GlyphCoverage {
            let width = (font_size * 0.5) as usize;
            let height = (font_size * 0.5) as usize;
            GlyphCoverage { width, height, xmin: 0, ymin: 0, coverage: vec![255; width * height] }
        }
    }

    fn grid(cells: Vec<Cell>, width: u32) -> GlyphGrid {
        let height = cells.len() as u32 / width;
        GlyphGrid::new(width, height, cells)
    }

    #[test]
    fn metrics_scale_with_font_size() {
        let metrics = CanvasMetrics::for_font_size(10.0);
        assert!((metrics.char_width - 6.0).abs() < 1e-6);
        assert!((metrics.line_height - 12.0).abs() < 1e-6);
    }

    #[test]
    fn fit_is_clamped() {
        let small = grid(vec![Cell::new('#', None); 4], 2);
        assert_eq!(CanvasMetrics::fit(&small, 10_000, 10_000).font_size, MAX_FONT_SIZE);
        assert_eq!(CanvasMetrics::fit(&small, 1, 1).font_size, MIN_FONT_SIZE);

        let wide = grid(vec![Cell::new('#', None); 10], 10);
        // 60 / (10 * 0.6) = 10, 100 / 1.2 > 10
        assert!((CanvasMetrics::fit(&wide, 60, 100).font_size - 10.0).abs() < 1e-4);
    }

    #[test]
    fn canvas_covers_every_cell() {
        let g = grid(vec![Cell::new('#', None); 6], 3);
        let metrics = CanvasMetrics::for_font_size(10.0);
        assert_eq!(metrics.canvas_size(&g), (18, 24));
        let canvas = rasterize(&g, &BoxFont, metrics, RasterStyle::default());
        assert_eq!(canvas.dimensions(), (18, 24));
    }

    #[test]
    fn cell_color_wins_over_foreground() {
        let red = [255, 0, 0];
        let g = grid(vec![Cell::new('#', Some(red)), Cell::new(' ', None)], 2);
        let metrics = CanvasMetrics::for_font_size(10.0);
        let canvas = rasterize(&g, &BoxFont, metrics, RasterStyle::default());

        let painted: Vec<_> = canvas.pixels().filter(|px| px.0 != [0, 0, 0, 255]).collect();
        assert!(!painted.is_empty());
        assert!(painted.iter().all(|px| px.0 == [255, 0, 0, 255]));
        // The blank second cell stays background.
        for y in 0..canvas.height() {
            for x in 6..canvas.width() {
                assert_eq!(canvas.get_pixel(x, y).0, [0, 0, 0, 255]);
            }
        }
    }

    #[test]
    fn uncolored_cells_use_style_foreground() {
        let g = grid(vec![Cell::new('#', None)], 1);
        let style = RasterStyle { background: [10, 10, 10], foreground: [0, 200, 0] };
        let canvas = rasterize(&g, &BoxFont, CanvasMetrics::for_font_size(10.0), style);
        assert!(canvas.pixels().any(|px| px.0 == [0, 200, 0, 255]));
    }

    #[test]
    fn missing_font_is_io_error() {
        let err = load_font("/nonexistent/font.ttf").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Io);
    }
}
