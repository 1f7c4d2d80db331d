use crate::dispatch::Key;
use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::sync::Once;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

static PANIC_HOOK_INSTALLED: Once = Once::new();

pub fn install_panic_hook_once() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            original_hook(panic_info);
        }));
    });
}

/// Puts the terminal in raw mode for its lifetime. Raw mode is what turns
/// keystrokes into unbuffered events instead of cooked lines.
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    pub fn new() -> Result<Self> {
        install_panic_hook_once();
        enable_raw_mode()?;
        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Maps a crossterm event onto the prompt's key token set. Release events
/// and non-key events produce nothing.
pub fn decode_event(event: &Event) -> Option<Key> {
    let Event::Key(key) = event else {
        return None;
    };
    if key.kind == KeyEventKind::Release {
        return None;
    }
    Some(decode_key(key))
}

pub fn decode_key(key: &KeyEvent) -> Key {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Key::Interrupt,
        KeyCode::Char(ch)
            if !key.modifiers.contains(KeyModifiers::CONTROL)
                && !key.modifiers.contains(KeyModifiers::ALT) =>
        {
            Key::Char(ch)
        }
        KeyCode::Tab => Key::Tab,
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        _ => Key::Unrecognized,
    }
}

/// Forwards decoded keys from the terminal into a prompter's channel until
/// the receiving side goes away or the event source fails.
pub fn spawn_key_reader(tx: mpsc::UnboundedSender<Key>) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || loop {
        let Ok(event) = crossterm::event::read() else {
            break;
        };
        if let Some(key) = decode_event(&event) {
            if tx.send(key).is_err() {
                break;
            }
        }
    })
}
