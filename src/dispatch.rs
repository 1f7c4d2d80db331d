use crate::redraw::DisplayState;
use crate::session::{HookOutcome, Hooks, SessionCore, SubmitDecision};
use std::io::{self, Write};

/// One decoded token from the raw key source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Tab,
    Enter,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    /// Ctrl-C. Routed to the exit flow by the prompt controller.
    Interrupt,
    /// Any sequence outside the supported set (Home, End, function keys...).
    /// Dropped without touching state so unsupported terminals stay usable.
    Unrecognized,
}

/// What the state machine decided for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Submitted(String),
    Interrupted,
}

/// Applies one key to the session and repaints the line. At most one redraw
/// happens per key, and a redraw that changes nothing emits no bytes.
pub fn apply_key<W: Write>(
    key: Key,
    session: &mut SessionCore,
    hooks: &mut Hooks,
    display: &mut DisplayState,
    out: &mut W,
) -> io::Result<Outcome> {
    match key {
        Key::Interrupt => return Ok(Outcome::Interrupted),
        Key::Unrecognized => return Ok(Outcome::Continue),
        Key::Left => session.caret_left(),
        Key::Right => session.caret_right(),
        Key::Up => run_edit_hook_or(hooks.on_up.as_mut(), session, SessionCore::cursor_up),
        Key::Down => run_edit_hook_or(hooks.on_down.as_mut(), session, SessionCore::cursor_down),
        Key::Tab => {
            // Without a tab hook, Tab degrades to a plain space.
            run_edit_hook_or(hooks.on_tab.as_mut(), session, |session| session.insert(' '));
        }
        Key::Backspace => session.backspace(),
        Key::Enter => {
            let value = session.current_value().to_string();
            match hooks.on_submit.as_mut() {
                Some(hook) => {
                    if let SubmitDecision::Reject = hook(session) {
                        // Vetoed: stay active, repaint whatever the hook left behind.
                        let value = session.current_value().to_string();
                        let caret = session.caret();
                        display.redraw(out, &value, caret)?;
                        return Ok(Outcome::Continue);
                    }
                    // An accepting hook owns sealing; the entry stays where it is.
                }
                None => session.seal(),
            }
            out.write_all(b"\r\n")?;
            out.flush()?;
            return Ok(Outcome::Submitted(value));
        }
        Key::Char(ch) => {
            if (ch as u32) < 0x20 || ch == '\u{7f}' {
                // Bare control codes are outside the supported set.
                return Ok(Outcome::Continue);
            }
            session.insert(ch);
        }
    }

    let value = session.current_value().to_string();
    let caret = session.caret();
    display.redraw(out, &value, caret)?;
    Ok(Outcome::Continue)
}

fn run_edit_hook_or(
    hook: Option<&mut crate::session::EditHook>,
    session: &mut SessionCore,
    fallback: impl FnOnce(&mut SessionCore),
) {
    match hook {
        Some(hook) => {
            session.resolve();
            if let HookOutcome::Replace(value) = hook(session) {
                session.overwrite_current(value);
            }
        }
        None => fallback(session),
    }
}
