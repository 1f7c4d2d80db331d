use std::io::{self, Write};

/// Cursor-forward escape sequence, one column per emission.
pub const CARET_RIGHT: &str = "\x1b[C";
/// Cursor-back escape sequence, one column per emission.
pub const CARET_LEFT: &str = "\x1b[D";
/// Backspace, overwrite with a space, backspace again: erases one trailing
/// char without needing erase-line support from the terminal.
pub const ERASE_CHAR: &str = "\x08 \x08";

/// What the terminal currently shows for the active prompt line. Owned by
/// the redraw path only; reset at the start of every prompt invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayState {
    drawn_value: String,
    drawn_caret: usize,
}

impl DisplayState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drawn_value(&self) -> &str {
        &self.drawn_value
    }

    /// Caret position in chars from the start of the drawn value.
    pub fn drawn_caret(&self) -> usize {
        self.drawn_caret
    }

    fn move_drawn_caret<W: Write>(&mut self, out: &mut W, to: usize) -> io::Result<()> {
        if to > self.drawn_caret {
            for _ in self.drawn_caret..to {
                out.write_all(CARET_RIGHT.as_bytes())?;
            }
        } else {
            for _ in to..self.drawn_caret {
                out.write_all(CARET_LEFT.as_bytes())?;
            }
        }
        self.drawn_caret = to;
        Ok(())
    }

    /// Reconciles the terminal with `value`/`caret`.
    ///
    /// Content changes erase and repaint only the suffix past the common
    /// prefix of the drawn and target values; caret-only changes emit pure
    /// cursor motion; no change at all emits nothing.
    pub fn redraw<W: Write>(&mut self, out: &mut W, value: &str, caret: usize) -> io::Result<()> {
        if value == self.drawn_value && caret == self.drawn_caret {
            return Ok(());
        }

        if value != self.drawn_value {
            let drawn_chars = self.drawn_value.chars().count();
            self.move_drawn_caret(out, drawn_chars)?;

            let common = common_prefix_chars(&self.drawn_value, value);
            for _ in common..drawn_chars {
                out.write_all(ERASE_CHAR.as_bytes())?;
            }
            let suffix: String = value.chars().skip(common).collect();
            out.write_all(suffix.as_bytes())?;

            self.drawn_value = value.to_string();
            self.drawn_caret = value.chars().count();
        }

        self.move_drawn_caret(out, caret)?;
        out.flush()
    }
}

fn common_prefix_chars(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .take_while(|(left, right)| left == right)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redraw_bytes(display: &mut DisplayState, value: &str, caret: usize) -> String {
        let mut out = Vec::new();
        display.redraw(&mut out, value, caret).expect("vec write");
        String::from_utf8(out).expect("utf8 output")
    }

    #[test]
    fn test_initial_draw_emits_value_verbatim() {
        let mut display = DisplayState::new();
        assert_eq!(redraw_bytes(&mut display, "ls", 2), "ls");
        assert_eq!(display.drawn_caret(), 2);
    }

    #[test]
    fn test_noop_redraw_emits_nothing() {
        let mut display = DisplayState::new();
        redraw_bytes(&mut display, "ls", 2);
        assert_eq!(redraw_bytes(&mut display, "ls", 2), "");
    }

    #[test]
    fn test_suffix_change_erases_only_past_common_prefix() {
        let mut display = DisplayState::new();
        redraw_bytes(&mut display, "pwd", 3);
        // "pwd" -> "pwx": one erase, one literal char.
        assert_eq!(redraw_bytes(&mut display, "pwx", 3), "\x08 \x08x");
    }

    #[test]
    fn test_append_emits_only_new_chars() {
        let mut display = DisplayState::new();
        redraw_bytes(&mut display, "pwd", 3);
        assert_eq!(redraw_bytes(&mut display, "pwdx", 4), "x");
    }

    #[test]
    fn test_caret_only_move_emits_cursor_motion() {
        let mut display = DisplayState::new();
        redraw_bytes(&mut display, "abc", 3);
        assert_eq!(redraw_bytes(&mut display, "abc", 1), "\x1b[D\x1b[D");
        assert_eq!(redraw_bytes(&mut display, "abc", 2), "\x1b[C");
    }

    #[test]
    fn test_content_change_with_caret_in_middle() {
        let mut display = DisplayState::new();
        redraw_bytes(&mut display, "abc", 1);
        // Repaint walks to end of drawn text first, erases the divergent
        // suffix, writes the new one, then repositions the caret.
        let bytes = redraw_bytes(&mut display, "axc", 2);
        assert_eq!(bytes, "\x1b[C\x1b[C\x08 \x08\x08 \x08xc\x1b[D");
        assert_eq!(display.drawn_caret(), 2);
    }

    #[test]
    fn test_redraw_minimality_counts() {
        let mut display = DisplayState::new();
        redraw_bytes(&mut display, "abcdef", 6);
        // Common prefix "abc": 3 erases, 2 literal chars.
        let bytes = redraw_bytes(&mut display, "abcxy", 5);
        assert_eq!(bytes.matches(ERASE_CHAR).count(), 3);
        assert!(bytes.ends_with("xy"));
        assert_eq!(bytes.matches(CARET_LEFT).count(), 0);
        assert_eq!(bytes.matches(CARET_RIGHT).count(), 0);
    }

    #[test]
    fn test_clear_to_empty() {
        let mut display = DisplayState::new();
        redraw_bytes(&mut display, "hi", 2);
        assert_eq!(redraw_bytes(&mut display, "", 0), "\x08 \x08\x08 \x08");
        assert_eq!(display.drawn_value(), "");
    }

    #[test]
    fn test_multibyte_chars_count_as_single_columns() {
        let mut display = DisplayState::new();
        redraw_bytes(&mut display, "éé", 2);
        // One char replaced: erase one, write one.
        assert_eq!(redraw_bytes(&mut display, "éa", 2), "\x08 \x08a");
    }
}
