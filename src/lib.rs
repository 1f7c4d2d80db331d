//! History-aware interactive line prompt.
//!
//! Reads raw keystrokes, maintains an editable line buffer with a caret,
//! navigates previously entered lines like a shell history, and repaints
//! only the changed portion of the terminal line on each keystroke.

pub mod dispatch;
pub mod events;
pub mod history;
pub mod logging;
pub mod prompt;
pub mod redraw;
pub mod session;
pub mod store;
pub mod terminal;

#[cfg(test)]
pub mod test_support;

pub use dispatch::{Key, Outcome};
pub use events::{EventBus, ExitDecision, ExitListeners, ListenerId};
pub use history::HistoryList;
pub use prompt::{Interrupted, PromptRequest, Prompter};
pub use session::{
    HookOutcome, Hooks, SessionCore, SessionDescriptor, SubmitDecision, DEFAULT_SESSION,
};
pub use store::{HistoryStore, JsonFileStore, MemoryStore};
