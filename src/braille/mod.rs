mod canvas;
mod geometry;

pub use canvas::BrailleCanvas;
pub use geometry::{draw_circle, draw_line, draw_marker, draw_polyline, fill_rect};
