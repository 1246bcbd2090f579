//! Scrollback cards and their box-drawing chrome.
//!
//! A card caches its measured height per viewport width so the viewport can
//! locate its visible window without re-wrapping the whole history. Height
//! zero means "not measured yet"; any width change clears the cache.

use crate::core::text::{pad_to_width, soft_wrap};
use crate::render::screen::{blue, bold, dim};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Plain,
    Dim,
    Bold,
    Accent,
}

impl Style {
    pub fn apply(self, text: &str) -> String {
        match self {
            Style::Plain => text.to_string(),
            Style::Dim => dim(text),
            Style::Bold => bold(text),
            Style::Accent => blue(text),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContentItem {
    pub text: String,
    pub style: Style,
    pub has_borders: bool,
    pub title: Option<String>,
    /// Unstyled text preserved for clipboard export.
    pub original: Option<String>,
    /// Cached height at the current viewport width; 0 until measured.
    pub height: usize,
}

impl ContentItem {
    pub fn new(text: &str, style: Style, has_borders: bool, title: Option<&str>) -> ContentItem {
        ContentItem {
            text: text.to_string(),
            style,
            has_borders,
            title: title.map(str::to_string),
            original: Some(text.to_string()),
            height: 0,
        }
    }

    pub fn user_card(text: &str) -> ContentItem {
        ContentItem::new(text, Style::Plain, true, Some("You"))
    }

    pub fn response_card(text: &str) -> ContentItem {
        ContentItem::new(text, Style::Plain, true, None)
    }

    pub fn command_card(title: &str, text: &str) -> ContentItem {
        ContentItem::new(text, Style::Dim, true, Some(title))
    }

    pub fn plain(text: &str) -> ContentItem {
        ContentItem::new(text, Style::Plain, false, None)
    }

    pub fn dim_text(text: &str) -> ContentItem {
        ContentItem::new(text, Style::Dim, false, None)
    }

    pub fn empty() -> ContentItem {
        ContentItem::new("", Style::Plain, false, None)
    }

    /// Text width available inside the side borders.
    fn inner_width(width: usize) -> usize {
        width.saturating_sub(4).max(1)
    }

    /// Total rendered lines at `width`, border rows included. Caches.
    pub fn measure(&mut self, width: usize) -> usize {
        if self.height != 0 {
            return self.height;
        }
        let height = if self.has_borders {
            soft_wrap(&self.text, Self::inner_width(width)).len() + 2
        } else {
            soft_wrap(&self.text, width.max(1)).len()
        };
        self.height = height;
        height
    }

    pub fn invalidate(&mut self) {
        self.height = 0;
    }

    /// All rendered lines at `width`. The viewport slices these when a card
    /// straddles an edge.
    pub fn render_lines(&self, width: usize) -> Vec<String> {
        if !self.has_borders {
            return soft_wrap(&self.text, width.max(1))
                .iter()
                .map(|line| self.style.apply(line))
                .collect();
        }

        let inner = Self::inner_width(width);
        let mut out = Vec::new();

        let top = match &self.title {
            Some(title) => {
                let label = format!(" {title} ");
                let fill = inner.saturating_sub(label.chars().count());
                format!("╭─{label}{}╮", "─".repeat(fill + 1))
            }
            None => format!("╭{}╮", "─".repeat(inner + 2)),
        };
        out.push(dim(&top));

        for line in soft_wrap(&self.text, inner) {
            let body = self.style.apply(&pad_to_width(&line, inner));
            out.push(format!("{} {body} {}", dim("│"), dim("│")));
        }

        out.push(dim(&format!("╰{}╯", "─".repeat(inner + 2))));
        out
    }
}
