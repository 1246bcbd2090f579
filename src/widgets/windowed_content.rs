//! Virtualized scrollback viewport.
//!
//! Cards cache their heights per width; the viewport sums the cache to find
//! its window and only renders the cards that intersect it. `scroll_y` is
//! measured in lines up from the bottom edge, so 0 means "follow the newest
//! output". Scrolling up pins the view until the user pages back down.

use crate::core::component::Section;
use crate::core::input::{InputEvent, Key};
use crate::state::State;
use crate::widgets::content_item::ContentItem;

#[derive(Default)]
pub struct WindowedContent {
    /// Lines scrolled up from the bottom of the history.
    scroll_y: usize,
    /// True while the user holds a scrolled-back position.
    pinned_up: bool,
    last_width: usize,
}

/// One card's contribution to the visible window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleSlice {
    pub item: usize,
    pub skip: usize,
    pub take: usize,
}

impl WindowedContent {
    pub fn new() -> WindowedContent {
        WindowedContent::default()
    }

    pub fn scroll_y(&self) -> usize {
        self.scroll_y
    }

    pub fn is_pinned_up(&self) -> bool {
        self.pinned_up
    }

    fn refresh_measurements(&mut self, state: &mut State, width: usize) -> usize {
        if width != self.last_width {
            for item in &mut state.content_items {
                item.invalidate();
            }
            self.last_width = width;
        }
        state
            .content_items
            .iter_mut()
            .map(|item| item.measure(width))
            .sum()
    }

    /// Card index and line offset within it for a global line position.
    fn locate_start_card(state: &State, start_line: usize) -> (usize, usize) {
        let mut consumed = 0usize;
        for (index, item) in state.content_items.iter().enumerate() {
            let next = consumed + item.height;
            if start_line < next {
                return (index, start_line - consumed);
            }
            consumed = next;
        }
        (state.content_items.len(), 0)
    }

    /// The card slices intersecting the window of `height` lines.
    pub fn visible_slices(
        &mut self,
        state: &mut State,
        width: usize,
        height: usize,
    ) -> Vec<VisibleSlice> {
        if height == 0 {
            return Vec::new();
        }
        // An empty history still yields one placeholder card so the viewport
        // never collapses to zero rows.
        if state.content_items.is_empty() {
            state.content_items.push(ContentItem::empty());
        }
        let total = self.refresh_measurements(state, width);

        let max_scroll = total.saturating_sub(height);
        if !self.pinned_up {
            self.scroll_y = 0;
        }
        self.scroll_y = self.scroll_y.min(max_scroll);

        let start_line = total.saturating_sub(height + self.scroll_y);
        let (mut index, mut skip) = Self::locate_start_card(state, start_line);

        let mut remaining = height.min(total);
        let mut out = Vec::new();
        while remaining > 0 && index < state.content_items.len() {
            let card_height = state.content_items[index].height;
            let take = (card_height - skip).min(remaining);
            out.push(VisibleSlice { item: index, skip, take });
            remaining -= take;
            skip = 0;
            index += 1;
        }
        out
    }

    pub fn page_up(&mut self, state: &mut State, width: usize, height: usize) {
        let total = self.refresh_measurements(state, width);
        let max_scroll = total.saturating_sub(height);
        let step = height.saturating_sub(1).max(1);
        self.scroll_y = (self.scroll_y + step).min(max_scroll);
        self.pinned_up = self.scroll_y > 0;
        state.require_redraw = true;
    }

    pub fn page_down(&mut self, state: &mut State, height: usize) {
        let step = height.saturating_sub(1).max(1);
        self.scroll_y = self.scroll_y.saturating_sub(step);
        if self.scroll_y == 0 {
            self.pinned_up = false;
        }
        state.require_redraw = true;
    }
}

impl Section for WindowedContent {
    fn build(&mut self, state: &mut State, width: usize) -> Vec<String> {
        let height = state.content_viewport_height;
        let slices = self.visible_slices(state, width, height);
        let mut out = Vec::new();
        for slice in slices {
            let lines = state.content_items[slice.item].render_lines(width);
            for line in lines.into_iter().skip(slice.skip).take(slice.take) {
                out.push(line);
            }
        }
        out
    }

    fn handle(&mut self, state: &mut State, event: &InputEvent) -> bool {
        let height = state.content_viewport_height;
        match event {
            InputEvent::Key(Key::PageUp) => {
                self.page_up(state, self.last_width.max(1), height);
                true
            }
            InputEvent::Key(Key::PageDown) => {
                self.page_down(state, height);
                true
            }
            _ => false,
        }
    }
}
