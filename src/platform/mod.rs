//! Terminal abstraction and the raw-mode process terminal behind it.

pub mod process_terminal;
pub mod terminal;
