//! Frame assembly and ANSI screen output.

pub mod screen;

pub use screen::{ansi_wrap, blue, bold, dim, draw_frame, place_caret};
