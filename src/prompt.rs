use crate::dispatch::{self, Key, Outcome};
use crate::events::{EventBus, ExitListeners};
use crate::history::HistoryList;
use crate::logging;
use crate::redraw::DisplayState;
use crate::session::{Hooks, SessionCore, SessionDescriptor, DEFAULT_SESSION};
use crate::store::HistoryStore;
use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use tokio::sync::mpsc;

/// Returned (wrapped in `anyhow`) when an interrupt ends the prompt instead
/// of a submission. Downcast with `err.is::<Interrupted>()`.
#[derive(Debug)]
pub struct Interrupted;

impl fmt::Display for Interrupted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "prompt interrupted")
    }
}

impl std::error::Error for Interrupted {}

/// One request for `Prompter::prompt`: which named session to use and an
/// optional literal question appended after the session's prompt label.
#[derive(Debug, Clone, Default)]
pub struct PromptRequest {
    pub name: Option<String>,
    pub question: Option<String>,
}

impl PromptRequest {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            question: None,
        }
    }

    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }
}

struct Session {
    core: SessionCore,
    hooks: Hooks,
}

/// Orchestrates interactive line acquisition over a shared raw-key channel.
///
/// Sessions are named and live as long as the prompter, so history
/// accumulates across `prompt` calls. Only one prompt can be active at a
/// time; `prompt` taking `&mut self` enforces that at compile time.
pub struct Prompter<W: Write, S: HistoryStore> {
    sessions: HashMap<String, Session>,
    store: S,
    out: W,
    keys: mpsc::UnboundedReceiver<Key>,
    key_observers: EventBus<Key>,
    exit_listeners: ExitListeners,
}

impl<W: Write, S: HistoryStore> Prompter<W, S> {
    /// Builds a prompter plus the sender half of its raw-key channel. Feed
    /// decoded keys in through the sender (see `terminal::spawn_key_reader`).
    pub fn new(store: S, out: W) -> (Self, mpsc::UnboundedSender<Key>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut key_observers = EventBus::new();
        if logging::key_trace_enabled() {
            key_observers.subscribe(|key: &Key| logging::emit_key_trace(key));
        }
        let prompter = Self {
            sessions: HashMap::new(),
            store,
            out,
            keys: rx,
            key_observers,
            exit_listeners: ExitListeners::new(),
        };
        (prompter, tx)
    }

    pub fn key_observers(&mut self) -> &mut EventBus<Key> {
        &mut self.key_observers
    }

    pub fn exit_listeners(&mut self) -> &mut ExitListeners {
        &mut self.exit_listeners
    }

    /// Creates or reconfigures a named session. On first load of a
    /// persistent session the history list is pulled from the store;
    /// descriptor fields left as `None` keep their current values.
    pub fn load_session(&mut self, descriptor: SessionDescriptor) -> Result<()> {
        let SessionDescriptor {
            name,
            msg,
            persist,
            eager_save,
            storage_key,
            hooks,
        } = descriptor;

        if let Some(session) = self.sessions.get_mut(&name) {
            if let Some(msg) = msg {
                session.core.msg = msg;
            }
            if let Some(persist) = persist {
                session.core.persist = persist;
            }
            if let Some(eager_save) = eager_save {
                session.core.eager_save = eager_save;
            }
            if let Some(storage_key) = storage_key {
                session.core.storage_key = storage_key;
            }
            merge_hooks(&mut session.hooks, hooks);
            return Ok(());
        }

        let persist = persist.unwrap_or(true);
        let storage_key = storage_key.unwrap_or_else(|| name.clone());
        let entries = if persist {
            self.store
                .load(&storage_key)
                .with_context(|| format!("loading history for session '{name}'"))?
        } else {
            Vec::new()
        };
        let msg = msg.unwrap_or_else(|| default_msg(&name));
        let core = SessionCore::new(
            name.clone(),
            msg,
            persist,
            eager_save.unwrap_or(false),
            storage_key,
            HistoryList::from_entries(entries),
        );
        self.sessions.insert(name, Session { core, hooks });
        Ok(())
    }

    /// The entries currently held for a session, draft slot included.
    pub fn history(&self, name: &str) -> Option<&[String]> {
        self.sessions
            .get(name)
            .map(|session| session.core.history.entries())
    }

    pub fn save_session(&self, name: &str) -> Result<()> {
        match self.sessions.get(name) {
            Some(session) => save_one(&self.store, session),
            None => Ok(()),
        }
    }

    /// Saves every persistent session, attempting all of them and reporting
    /// the first failure.
    pub fn save_all(&self) -> Result<()> {
        save_all(&self.store, &self.sessions)
    }

    /// Runs one interactive line acquisition and resolves with the submitted
    /// text. Keys are consumed strictly in arrival order, each fully applied
    /// (state change plus repaint) before the next is read.
    pub async fn prompt(&mut self, request: PromptRequest) -> Result<String> {
        let name = request
            .name
            .unwrap_or_else(|| DEFAULT_SESSION.to_string());
        if !self.sessions.contains_key(&name) {
            self.load_session(SessionDescriptor::new(name.clone()))?;
        }

        let mut display = DisplayState::new();
        {
            let session = self
                .sessions
                .get_mut(&name)
                .ok_or_else(|| anyhow!("session '{name}' not loaded"))?;
            let question = request.question.as_deref().unwrap_or("");
            write!(self.out, "{}{}", session.core.msg, question)
                .context("writing prompt label")?;
            // The initial redraw can be a no-op, so flush the label here.
            self.out.flush().context("flushing prompt label")?;

            // The draft slot may hold leftover text from a vetoed submit.
            let value = session.core.current_value().to_string();
            let caret = session.core.caret();
            display
                .redraw(&mut self.out, &value, caret)
                .context("drawing prompt")?;
        }

        loop {
            let Some(key) = self.keys.recv().await else {
                return Err(anyhow!("raw key source closed while prompt was active"));
            };
            self.key_observers.emit(&key);

            let session = self
                .sessions
                .get_mut(&name)
                .ok_or_else(|| anyhow!("session '{name}' not loaded"))?;
            let outcome = dispatch::apply_key(
                key,
                &mut session.core,
                &mut session.hooks,
                &mut display,
                &mut self.out,
            )
            .context("writing prompt output")?;

            match outcome {
                Outcome::Continue => {}
                Outcome::Submitted(value) => {
                    if session.core.persist && session.core.eager_save {
                        save_one(&self.store, session)
                            .context("saving history before resolving prompt")?;
                    }
                    return Ok(value);
                }
                Outcome::Interrupted => {
                    let save_error = save_all(&self.store, &self.sessions).err();
                    if let Some(error) = save_error.as_ref() {
                        logging::emit_save_error(error);
                    }
                    if self.exit_listeners.notify(save_error.as_ref()) {
                        return Err(Interrupted.into());
                    }
                    // Vetoed: the prompt stays live and keeps consuming keys.
                }
            }
        }
    }
}

fn default_msg(name: &str) -> String {
    if name == DEFAULT_SESSION {
        "# ".to_string()
    } else {
        format!("{name}# ")
    }
}

fn merge_hooks(existing: &mut Hooks, update: Hooks) {
    if update.on_up.is_some() {
        existing.on_up = update.on_up;
    }
    if update.on_down.is_some() {
        existing.on_down = update.on_down;
    }
    if update.on_tab.is_some() {
        existing.on_tab = update.on_tab;
    }
    if update.on_submit.is_some() {
        existing.on_submit = update.on_submit;
    }
}

fn save_one<S: HistoryStore>(store: &S, session: &Session) -> Result<()> {
    if !session.core.persist {
        return Ok(());
    }
    store.save(&session.core.storage_key, session.core.history.entries())
}

fn save_all<S: HistoryStore>(store: &S, sessions: &HashMap<String, Session>) -> Result<()> {
    let mut first_error = None;
    for session in sessions.values() {
        if let Err(error) = save_one(store, session) {
            if first_error.is_none() {
                first_error = Some(error);
            }
        }
    }
    match first_error {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
