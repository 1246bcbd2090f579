//! Soft-wrap math, caret location, paste sanitization.
//!
//! Everything here is pure and char-indexed. The input buffer only ever
//! contains printable ASCII, tab and newline (see [`sanitize_paste`]), so
//! char indices, byte indices and display columns agree.

use unicode_width::UnicodeWidthStr;

/// Soft-wrap `text` to `width` and locate the caret in the wrapped output.
///
/// Two passes over the same wrap rule: a character wraps either on a literal
/// newline or when the column reaches `width`. Pass one walks
/// `0..caret_index` to produce `(caret_line, caret_col)`; pass two produces
/// the full ordered list of wrapped lines.
///
/// Returns `(lines, caret_line, caret_col)` with `caret_col < width`.
pub fn wrap_text_and_locate_caret(
    text: &str,
    caret_index: usize,
    width: usize,
) -> (Vec<String>, usize, usize) {
    let width = width.max(1);

    let mut line = 0usize;
    let mut col = 0usize;
    for ch in text.chars().take(caret_index) {
        if ch == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
            if col >= width {
                line += 1;
                col = 0;
            }
        }
    }
    let caret_line = line;
    let caret_col = col;

    let mut out = Vec::new();
    let mut buf = String::new();
    let mut col = 0usize;
    for ch in text.chars() {
        if ch == '\n' {
            out.push(std::mem::take(&mut buf));
            col = 0;
            continue;
        }
        buf.push(ch);
        col += 1;
        if col >= width {
            out.push(std::mem::take(&mut buf));
            col = 0;
        }
    }
    out.push(buf); // last line, even if empty

    (out, caret_line, caret_col)
}

/// Soft-wrap without caret tracking; same rule as
/// [`wrap_text_and_locate_caret`], used for card measurement and rendering.
pub fn soft_wrap(text: &str, width: usize) -> Vec<String> {
    let (lines, _, _) = wrap_text_and_locate_caret(text, 0, width);
    lines
}

/// Keep printable ASCII, tab and newline; normalize CRLF/CR to LF.
///
/// This is the only filtering step between a paste burst and the insert
/// primitive.
pub fn sanitize_paste(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    normalized
        .chars()
        .filter(|&ch| ch == '\n' || ch == '\t' || (' '..='~').contains(&ch))
        .collect()
}

/// Hard-line indexing: char index of each line start plus the lines split on
/// `'\n'`. Used by vertical caret movement, which operates on hard lines.
pub fn line_indexing(text: &str) -> (Vec<usize>, Vec<String>) {
    let lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    let mut starts = Vec::with_capacity(lines.len());
    let mut index = 0usize;
    for line in &lines {
        starts.push(index);
        index += line.chars().count() + 1;
    }
    (starts, lines)
}

/// Convert an absolute char index to `(hard_line, col)`.
pub fn caret_line_col(line_starts: &[usize], caret_index: usize) -> (usize, usize) {
    let mut line = 0usize;
    for (i, &start) in line_starts.iter().enumerate() {
        if start > caret_index {
            break;
        }
        line = i;
    }
    (line, caret_index - line_starts[line])
}

/// Pad (or truncate) `text` to exactly `width` display columns.
pub fn pad_to_width(text: &str, width: usize) -> String {
    let visible = UnicodeWidthStr::width(text);
    if visible >= width {
        let mut out = String::new();
        let mut used = 0usize;
        for ch in text.chars() {
            let w = UnicodeWidthStr::width(ch.to_string().as_str());
            if used + w > width {
                break;
            }
            out.push(ch);
            used += w;
        }
        out.push_str(&" ".repeat(width.saturating_sub(used)));
        return out;
    }
    format!("{text}{}", " ".repeat(width - visible))
}
