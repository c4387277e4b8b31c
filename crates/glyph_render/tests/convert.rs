use std::cell::Cell as Counter;

use glyph_render::render::ansi::to_ansi;
use glyph_render::{
    convert, convert_with, Bitmap, ErrorKind, GlyphConfig, GlyphError, Ramp, Resampler,
};
use image::{Rgba, RgbaImage};

fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    rgba.repeat((width * height) as usize)
}

fn two_glyph_config(target_width: u32) -> GlyphConfig {
    GlyphConfig { target_width, ramp: Ramp::new("@ ").unwrap(), ..Default::default() }
}

/// Nearest-neighbour resampler that counts its invocations.
#[derive(Default)]
struct CountingResampler {
    calls: Counter<usize>,
}

impl Resampler for CountingResampler {
    fn resize(
        &self,
        bitmap: &Bitmap<'_>,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, GlyphError> {
        self.calls.set(self.calls.get() + 1);
        Ok(RgbaImage::from_fn(width, height, |x, y| {
            let sx = x * bitmap.width() / width;
            let sy = y * bitmap.height() / height;
            let [r, g, b] = bitmap.rgb(sx, sy).unwrap_or([0, 0, 0]);
            Rgba([r, g, b, 255])
        }))
    }
}

struct WrongSize;

impl Resampler for WrongSize {
    fn resize(&self, _: &Bitmap<'_>, width: u32, _: u32) -> Result<RgbaImage, GlyphError> {
        Ok(RgbaImage::new(width + 1, 1))
    }
}

#[test]
fn black_bitmap_renders_dense_glyphs() {
    let pixels = solid(2, 2, [0, 0, 0, 255]);
    let bitmap = Bitmap::new(2, 2, &pixels).unwrap();
    let grid = convert(&bitmap, &two_glyph_config(2)).unwrap();
    assert_eq!(grid.to_text(), "@@\n");
}

#[test]
fn white_bitmap_renders_sparse_glyphs() {
    let pixels = solid(2, 2, [255, 255, 255, 255]);
    let bitmap = Bitmap::new(2, 2, &pixels).unwrap();
    let grid = convert(&bitmap, &two_glyph_config(2)).unwrap();
    assert_eq!(grid.to_text(), "  \n");
}

#[test]
fn invert_swaps_glyphs_for_black_bitmap() {
    let pixels = solid(2, 2, [0, 0, 0, 255]);
    let bitmap = Bitmap::new(2, 2, &pixels).unwrap();
    let config = GlyphConfig { invert: true, ..two_glyph_config(2) };
    assert_eq!(convert(&bitmap, &config).unwrap().to_text(), "  \n");
}

#[test]
fn red_pixel_color_survives_invert() {
    let pixels = solid(4, 4, [255, 0, 0, 255]);
    let bitmap = Bitmap::new(4, 4, &pixels).unwrap();
    for invert in [false, true] {
        let config = GlyphConfig { color: true, invert, ..two_glyph_config(4) };
        let grid = convert(&bitmap, &config).unwrap();
        assert!(grid.cells().iter().all(|cell| cell.color == Some([255, 0, 0])));
    }
}

#[test]
fn plain_mode_has_no_colors() {
    let pixels = solid(4, 4, [255, 0, 0, 255]);
    let bitmap = Bitmap::new(4, 4, &pixels).unwrap();
    let grid = convert(&bitmap, &two_glyph_config(4)).unwrap();
    assert!(grid.cells().iter().all(|cell| cell.color.is_none()));
}

#[test]
fn grid_dimensions_follow_aspect() {
    let cases = [(2, 2, 2, 1), (640, 480, 100, 37), (100, 400, 10, 20), (300, 100, 7, 1)];
    for (width, height, target, rows) in cases {
        let pixels = solid(width, height, [90, 90, 90, 255]);
        let bitmap = Bitmap::new(width, height, &pixels).unwrap();
        let grid = convert_with(&bitmap, &two_glyph_config(target), &CountingResampler::default())
            .unwrap();
        assert_eq!((grid.width(), grid.height()), (target, rows), "{width}x{height} @ {target}");
        assert_eq!(grid.lines().count(), rows as usize);
        assert!(grid.lines().all(|line| line.chars().count() == target as usize));
    }
}

#[test]
fn zero_row_grid_skips_resampler() {
    let pixels = solid(100, 1, [0, 0, 0, 255]);
    let bitmap = Bitmap::new(100, 1, &pixels).unwrap();
    let resampler = CountingResampler::default();
    let grid = convert_with(&bitmap, &two_glyph_config(10), &resampler).unwrap();
    assert!(grid.is_empty());
    assert_eq!(grid.to_text(), "");
    assert_eq!(resampler.calls.get(), 0);
}

#[test]
fn zero_area_bitmap_is_invalid_input() {
    let err = Bitmap::new(0, 0, &[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn configuration_is_checked_before_resampling() {
    let pixels = solid(4, 4, [0, 0, 0, 255]);
    let bitmap = Bitmap::new(4, 4, &pixels).unwrap();
    let resampler = CountingResampler::default();
    let config = GlyphConfig { contrast: f64::INFINITY, ..two_glyph_config(4) };
    let err = convert_with(&bitmap, &config, &resampler).unwrap_err();
    assert!(matches!(err, GlyphError::InvalidContrast(_)));
    assert_eq!(resampler.calls.get(), 0);
}

#[test]
fn oversized_grid_is_rejected_before_resampling() {
    let pixels = solid(1, 1, [0, 0, 0, 255]);
    let bitmap = Bitmap::new(1, 1, &pixels).unwrap();
    let resampler = CountingResampler::default();
    let config = two_glyph_config(u32::MAX);
    let err = convert_with(&bitmap, &config, &resampler).unwrap_err();
    assert!(matches!(err, GlyphError::GridTooLarge { columns: u32::MAX, .. }));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(resampler.calls.get(), 0);

    let err = convert(&bitmap, &config).unwrap_err();
    assert!(matches!(err, GlyphError::GridTooLarge { .. }));
}

#[test]
fn misbehaving_resampler_is_rejected() {
    let pixels = solid(4, 4, [0, 0, 0, 255]);
    let bitmap = Bitmap::new(4, 4, &pixels).unwrap();
    let err = convert_with(&bitmap, &two_glyph_config(4), &WrongSize).unwrap_err();
    assert!(matches!(err, GlyphError::ResampledSize { expected: (4, 2), .. }));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn horizontal_gradient_walks_the_ramp() {
    let width = 10;
    let image = RgbaImage::from_fn(width, 20, |x, _| {
        let v = (x * 255 / (width - 1)) as u8;
        Rgba([v, v, v, 255])
    });
    let bitmap = Bitmap::from_rgba(&image).unwrap();
    let config = GlyphConfig { target_width: width, ramp: Ramp::standard(), ..Default::default() };
    let grid = convert_with(&bitmap, &config, &CountingResampler::default()).unwrap();
    let first = grid.lines().next().unwrap();
    assert!(first.starts_with('@'));
    assert!(first.ends_with(' '));
}

#[test]
fn single_glyph_ramp_fills_grid() {
    let image = RgbaImage::from_fn(8, 8, |x, y| Rgba([(x * 30) as u8, (y * 30) as u8, 0, 255]));
    let bitmap = Bitmap::from_rgba(&image).unwrap();
    let config =
        GlyphConfig { target_width: 8, ramp: Ramp::new("#").unwrap(), ..Default::default() };
    let grid = convert(&bitmap, &config).unwrap();
    assert!(grid.cells().iter().all(|cell| cell.ch == '#'));
}

#[test]
fn colored_output_renders_through_ansi() {
    let pixels = solid(2, 2, [0, 128, 255, 255]);
    let bitmap = Bitmap::new(2, 2, &pixels).unwrap();
    let config = GlyphConfig { color: true, ..two_glyph_config(2) };
    let grid = convert(&bitmap, &config).unwrap();
    let ansi = to_ansi(&grid);
    assert!(ansi.starts_with("\x1b[38;2;0;128;255m"));
    assert!(ansi.ends_with("\x1b[0m\n"));
}
