use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    /// Source RGB of the sample, present only in color mode.
    pub color: Option<[u8; 3]>,
}

impl Cell {
    pub fn new(ch: char, color: Option<[u8; 3]>) -> Self {
        Self { ch, color }
    }
}

/// Row-major grid of cells produced by a single conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphGrid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl GlyphGrid {
    pub(crate) fn new(width: u32, height: u32, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(width as usize * height as usize, cells.len());
        Self { width, height, cells }
    }

    pub(crate) fn empty(width: u32) -> Self {
        Self { width, height: 0, cells: Vec::new() }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, x: u32, y: u32) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y as usize * self.width as usize + x as usize)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks(self.width.max(1) as usize)
    }

    /// Glyphs of each row without a terminator.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.rows().map(|row| row.iter().map(|cell| cell.ch).collect::<String>())
    }

    /// Plain text with every row terminated by `\n`.
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for GlyphGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for cell in row {
                write!(f, "{}", cell.ch)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
