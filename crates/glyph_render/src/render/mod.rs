//! Presentation of a finished [`GlyphGrid`](crate::GlyphGrid).
//!
//! Plain text lives on the grid itself; these modules cover terminals and
//! raster images.

pub mod ansi;
pub mod raster;
