//! Keyboard input parsing.
//!
//! The platform layer hands the runtime raw byte chunks read from the
//! terminal; this module turns them into a closed set of events. Bracketed
//! paste segments are carved out first, then escape sequences, control
//! bytes and printable runs.

/// Normalized key identity for the keys the runtime dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Tab,
    BackTab,
    Backspace,
    Delete,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Ctrl(char),
}

/// Input event delivered to sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(Key),
    /// Decoded printable text (possibly a multi-character burst).
    Text(String),
    /// Bracketed-paste payload, not yet sanitized.
    Paste(String),
    Resize {
        columns: u16,
        rows: u16,
    },
}

const PASTE_START: &str = "\x1b[200~";
const PASTE_END: &str = "\x1b[201~";

/// CSI / SS3 sequences mapped to keys, longest-prefix first.
const SEQUENCES: &[(&str, Key)] = &[
    ("\x1b[1~", Key::Home),
    ("\x1b[3~", Key::Delete),
    ("\x1b[4~", Key::End),
    ("\x1b[5~", Key::PageUp),
    ("\x1b[6~", Key::PageDown),
    ("\x1b[A", Key::Up),
    ("\x1b[B", Key::Down),
    ("\x1b[C", Key::Right),
    ("\x1b[D", Key::Left),
    ("\x1b[H", Key::Home),
    ("\x1b[F", Key::End),
    ("\x1b[Z", Key::BackTab),
    ("\x1bOA", Key::Up),
    ("\x1bOB", Key::Down),
    ("\x1bOC", Key::Right),
    ("\x1bOD", Key::Left),
    ("\x1bOH", Key::Home),
    ("\x1bOF", Key::End),
];

pub fn parse_input_events(data: &str) -> Vec<InputEvent> {
    if data.is_empty() {
        return Vec::new();
    }

    let mut events = Vec::new();
    let mut remaining = data;
    loop {
        let Some(start) = remaining.find(PASTE_START) else {
            parse_non_paste(remaining, &mut events);
            break;
        };

        parse_non_paste(&remaining[..start], &mut events);

        let after_start = &remaining[start + PASTE_START.len()..];
        let Some(end_rel) = after_start.find(PASTE_END) else {
            // Unterminated paste: treat the payload as plain text.
            parse_non_paste(after_start, &mut events);
            break;
        };

        events.push(InputEvent::Paste(after_start[..end_rel].to_string()));
        remaining = &after_start[end_rel + PASTE_END.len()..];
        if remaining.is_empty() {
            break;
        }
    }

    events
}

fn parse_non_paste(data: &str, events: &mut Vec<InputEvent>) {
    let mut rest = data;
    let mut text_run = String::new();

    let flush_text = |run: &mut String, events: &mut Vec<InputEvent>| {
        if !run.is_empty() {
            events.push(InputEvent::Text(std::mem::take(run)));
        }
    };

    while !rest.is_empty() {
        if rest.starts_with('\x1b') {
            flush_text(&mut text_run, events);
            if let Some((key, len)) = match_sequence(rest) {
                events.push(InputEvent::Key(key));
                rest = &rest[len..];
                continue;
            }
            if let Some(len) = unknown_csi_len(rest) {
                // Unrecognized CSI sequence: swallow it whole.
                rest = &rest[len..];
                continue;
            }
            events.push(InputEvent::Key(Key::Escape));
            rest = &rest[1..];
            continue;
        }

        let ch = match rest.chars().next() {
            Some(ch) => ch,
            None => break,
        };
        let ch_len = ch.len_utf8();

        match ch {
            '\r' | '\n' => {
                flush_text(&mut text_run, events);
                events.push(InputEvent::Key(Key::Enter));
            }
            '\t' => {
                flush_text(&mut text_run, events);
                events.push(InputEvent::Key(Key::Tab));
            }
            '\x7f' | '\x08' => {
                flush_text(&mut text_run, events);
                events.push(InputEvent::Key(Key::Backspace));
            }
            ch if (ch as u32) < 0x20 => {
                flush_text(&mut text_run, events);
                let letter = char::from_u32(ch as u32 + 0x60).unwrap_or('?');
                events.push(InputEvent::Key(Key::Ctrl(letter)));
            }
            ch => {
                text_run.push(ch);
            }
        }
        rest = &rest[ch_len..];
    }

    flush_text(&mut text_run, events);
}

fn match_sequence(data: &str) -> Option<(Key, usize)> {
    SEQUENCES
        .iter()
        .find(|(sequence, _)| data.starts_with(sequence))
        .map(|(sequence, key)| (*key, sequence.len()))
}

/// Length of an unknown-but-well-formed CSI sequence at the start of `data`.
fn unknown_csi_len(data: &str) -> Option<usize> {
    let rest = data.strip_prefix("\x1b[")?;
    for (idx, byte) in rest.bytes().enumerate() {
        if (0x40..=0x7e).contains(&byte) {
            return Some(2 + idx + 1);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{parse_input_events, InputEvent, Key};

    #[test]
    fn printable_run_is_one_text_event() {
        assert_eq!(
            parse_input_events("hello"),
            vec![InputEvent::Text("hello".to_string())]
        );
    }

    #[test]
    fn control_keys_are_parsed() {
        assert_eq!(parse_input_events("\r"), vec![InputEvent::Key(Key::Enter)]);
        assert_eq!(parse_input_events("\t"), vec![InputEvent::Key(Key::Tab)]);
        assert_eq!(
            parse_input_events("\x7f"),
            vec![InputEvent::Key(Key::Backspace)]
        );
        assert_eq!(
            parse_input_events("\x1b"),
            vec![InputEvent::Key(Key::Escape)]
        );
        assert_eq!(
            parse_input_events("\x04"),
            vec![InputEvent::Key(Key::Ctrl('d'))]
        );
        assert_eq!(
            parse_input_events("\x03"),
            vec![InputEvent::Key(Key::Ctrl('c'))]
        );
    }

    #[test]
    fn arrow_and_page_sequences_are_parsed() {
        assert_eq!(parse_input_events("\x1b[A"), vec![InputEvent::Key(Key::Up)]);
        assert_eq!(
            parse_input_events("\x1b[5~"),
            vec![InputEvent::Key(Key::PageUp)]
        );
        assert_eq!(
            parse_input_events("\x1b[6~"),
            vec![InputEvent::Key(Key::PageDown)]
        );
        assert_eq!(
            parse_input_events("\x1b[Z"),
            vec![InputEvent::Key(Key::BackTab)]
        );
    }

    #[test]
    fn mixed_chunk_preserves_order() {
        assert_eq!(
            parse_input_events("ab\x1b[Dc"),
            vec![
                InputEvent::Text("ab".to_string()),
                InputEvent::Key(Key::Left),
                InputEvent::Text("c".to_string()),
            ]
        );
    }

    #[test]
    fn bracketed_paste_is_carved_out() {
        assert_eq!(
            parse_input_events("a\x1b[200~b\nc\x1b[201~d"),
            vec![
                InputEvent::Text("a".to_string()),
                InputEvent::Paste("b\nc".to_string()),
                InputEvent::Text("d".to_string()),
            ]
        );
    }

    #[test]
    fn unknown_csi_is_swallowed() {
        assert_eq!(
            parse_input_events("\x1b[99Xq"),
            vec![InputEvent::Text("q".to_string())]
        );
    }
}
