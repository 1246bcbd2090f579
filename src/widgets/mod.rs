//! Screen sections: scrollback cards, input box, autocomplete, overlays.

pub mod autocomplete;
pub mod content_item;
pub mod help_line;
pub mod input_box;
pub mod island;
pub mod status_bar;
pub mod windowed_content;
