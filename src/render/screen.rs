//! Full-frame redraw over the alternate screen.
//!
//! Every frame homes the cursor, rewrites each line with erase-to-end, and
//! erases below the last line. No diffing: at chat-client sizes a full
//! rewrite per dirty tick is cheaper than tracking damage.

pub fn ansi_wrap(text: &str, prefix: &str, suffix: &str) -> String {
    format!("{prefix}{text}{suffix}")
}

pub fn dim(text: &str) -> String {
    ansi_wrap(text, "\x1b[2m", "\x1b[22m")
}

pub fn bold(text: &str) -> String {
    ansi_wrap(text, "\x1b[1m", "\x1b[22m")
}

pub fn blue(text: &str) -> String {
    ansi_wrap(text, "\x1b[34m", "\x1b[39m")
}

pub fn cyan(text: &str) -> String {
    ansi_wrap(text, "\x1b[36m", "\x1b[39m")
}

pub fn yellow(text: &str) -> String {
    ansi_wrap(text, "\x1b[33m", "\x1b[39m")
}

pub fn red(text: &str) -> String {
    ansi_wrap(text, "\x1b[31m", "\x1b[39m")
}

pub fn green(text: &str) -> String {
    ansi_wrap(text, "\x1b[32m", "\x1b[39m")
}

/// Serialize a frame: hide the cursor, home, each line erased to end of
/// line, then erase the rest of the screen. The caret is re-shown by
/// [`place_caret`] once the frame is out.
pub fn draw_frame(lines: &[String]) -> String {
    let mut out = String::from("\x1b[?25l\x1b[H");
    for (index, line) in lines.iter().enumerate() {
        if index > 0 {
            out.push_str("\r\n");
        }
        out.push_str(line);
        out.push_str("\x1b[K");
    }
    out.push_str("\x1b[J");
    out
}

/// Move the cursor to a 1-based cell and make it visible.
pub fn place_caret(row: usize, col: usize) -> String {
    format!("\x1b[{};{}H\x1b[?25h", row.max(1), col.max(1))
}

#[cfg(test)]
mod tests {
    use super::{dim, draw_frame, place_caret};
    use pretty_assertions::assert_eq;

    #[test]
    fn frame_homes_erases_each_line_and_clears_below() {
        let frame = draw_frame(&["one".to_string(), "two".to_string()]);
        assert_eq!(frame, "\x1b[?25l\x1b[Hone\x1b[K\r\ntwo\x1b[K\x1b[J");
    }

    #[test]
    fn empty_frame_still_clears_the_screen() {
        assert_eq!(draw_frame(&[]), "\x1b[?25l\x1b[H\x1b[J");
    }

    #[test]
    fn caret_placement_is_one_based_and_shows_the_cursor() {
        assert_eq!(place_caret(3, 7), "\x1b[3;7H\x1b[?25h");
        assert_eq!(place_caret(0, 0), "\x1b[1;1H\x1b[?25h");
    }

    #[test]
    fn styles_reset_their_own_attribute() {
        assert_eq!(dim("x"), "\x1b[2mx\x1b[22m");
    }
}
