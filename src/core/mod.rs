//! Core runtime primitives: events, signals, text math, the section trait.

pub mod component;
pub mod input;
pub mod signal;
pub mod text;
