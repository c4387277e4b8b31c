use crate::GlyphGrid;

const RESET: &str = "\x1b[0m";

/// Renders a grid with 24-bit foreground escapes.
///
/// Runs of equally colored cells share one escape, and any open color is
/// reset before each row terminator. Cells without color are written bare.
pub fn to_ansi(grid: &GlyphGrid) -> String {
    let mut out = String::with_capacity(grid.cells().len() * 4);

    for row in grid.rows() {
        let mut current: Option<[u8; 3]> = None;
        for cell in row {
            match cell.color {
                Some(rgb) if current != Some(rgb) => {
                    let [r, g, b] = rgb;
                    out.push_str(&format!("\x1b[38;2;{r};{g};{b}m"));
                    current = Some(rgb);
                },
                None if current.is_some() => {
                    out.push_str(RESET);
                    current = None;
                },
                _ => {},
            }
            out.push(cell.ch);
        }
        if current.is_some() {
            out.push_str(RESET);
        }
        out.push('\n');
    }

    out
}
