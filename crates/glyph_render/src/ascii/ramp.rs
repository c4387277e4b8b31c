use std::fmt;
use std::str::FromStr;

use crate::GlyphError;

/// Ordered glyph lookup table, indexed by normalized brightness.
///
/// Index 0 is selected for brightness 0 and the last index for brightness
/// 255. Which end looks "dark" is a property of the characters themselves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ramp {
    chars: Vec<char>,
}

impl Ramp {
    pub fn new(chars: impl AsRef<str>) -> Result<Self, GlyphError> {
        let chars: Vec<char> = chars.as_ref().chars().collect();
        if chars.is_empty() {
            return Err(GlyphError::EmptyRamp);
        }
        Ok(Self { chars })
    }

    pub fn standard() -> Self {
        Self::preset("@%#*+=-:. ")
    }

    pub fn detailed() -> Self {
        Self::preset("$@B%8&WM#*oahkbdpqwmZO0QLCJUYXzcvunxrjft/\\|()1{}[]?-_+~<>i!lI;:,\"^`'. ")
    }

    pub fn blocks() -> Self {
        Self::preset("█▓▒░ ")
    }

    pub fn simple() -> Self {
        Self::preset("# .")
    }

    fn preset(chars: &str) -> Self {
        Self { chars: chars.chars().collect() }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always false for a constructed ramp.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Maps a brightness in `[0, 255]` to a ramp index.
    ///
    /// Out-of-range and NaN inputs land on the nearest end, and a single
    /// glyph ramp always yields 0.
    pub fn index_for(&self, brightness: f64) -> usize {
        let last = self.chars.len().saturating_sub(1);
        if last == 0 {
            return 0;
        }

        let scaled = (brightness / 255.0 * last as f64).floor();
        if scaled.is_nan() || scaled <= 0.0 {
            0
        } else {
            (scaled as usize).min(last)
        }
    }

    pub fn glyph_for(&self, brightness: f64) -> char {
        self.chars[self.index_for(brightness)]
    }
}

impl FromStr for Ramp {
    type Err = GlyphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Ramp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.chars.iter().try_for_each(|ch| write!(f, "{ch}"))
    }
}
