//! Tone curve applied to every sample before glyph lookup.

/// Perceptual BT.601 luminance in `[0, 255]`.
///
/// Weights are summed as integers and divided once, so pure white lands on
/// exactly 255.0.
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    let weighted = 299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b);
    f64::from(weighted) / 1000.0
}

/// Multiplicative gain around mid gray, clamped to `[0, 255]`.
pub fn apply_contrast(value: f64, contrast: f64) -> f64 {
    if contrast == 1.0 {
        return value.clamp(0.0, 255.0);
    }

    let normalized = value / 255.0 - 0.5;
    let adjusted = (normalized * contrast + 0.5) * 255.0;
    adjusted.clamp(0.0, 255.0)
}

/// Brightness used for glyph selection.
pub fn glyph_brightness(adjusted: f64, invert: bool) -> f64 {
    if invert {
        255.0 - adjusted
    } else {
        adjusted
    }
}
