use crate::history::HistoryList;

pub const DEFAULT_SESSION: &str = "default";

/// Result of an up/down/tab hook.
pub enum HookOutcome {
    /// Overwrite the entry at the current history cursor with this value.
    Replace(String),
    /// Leave the entry alone / fall back to the built-in behavior.
    Default,
}

/// Result of an `on_submit` hook.
pub enum SubmitDecision {
    Accept,
    /// Keep the prompt active; nothing resolves.
    Reject,
}

pub type EditHook = Box<dyn FnMut(&mut SessionCore) -> HookOutcome + Send>;
pub type SubmitHook = Box<dyn FnMut(&mut SessionCore) -> SubmitDecision + Send>;

/// Customization hooks for one session. Kept beside `SessionCore` rather
/// than inside it so a hook can borrow the core mutably while running.
#[derive(Default)]
pub struct Hooks {
    pub on_up: Option<EditHook>,
    pub on_down: Option<EditHook>,
    pub on_tab: Option<EditHook>,
    pub on_submit: Option<SubmitHook>,
}

/// Configuration for creating or updating a named session. `None` fields
/// keep the existing value (or the default on first load).
pub struct SessionDescriptor {
    pub name: String,
    pub msg: Option<String>,
    pub persist: Option<bool>,
    pub eager_save: Option<bool>,
    pub storage_key: Option<String>,
    pub hooks: Hooks,
}

impl SessionDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            msg: None,
            persist: None,
            eager_save: None,
            storage_key: None,
            hooks: Hooks::default(),
        }
    }

    pub fn with_msg(mut self, msg: impl Into<String>) -> Self {
        self.msg = Some(msg.into());
        self
    }

    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = Some(persist);
        self
    }

    pub fn with_eager_save(mut self, eager_save: bool) -> Self {
        self.eager_save = Some(eager_save);
        self
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }

    pub fn with_on_up(
        mut self,
        hook: impl FnMut(&mut SessionCore) -> HookOutcome + Send + 'static,
    ) -> Self {
        self.hooks.on_up = Some(Box::new(hook));
        self
    }

    pub fn with_on_down(
        mut self,
        hook: impl FnMut(&mut SessionCore) -> HookOutcome + Send + 'static,
    ) -> Self {
        self.hooks.on_down = Some(Box::new(hook));
        self
    }

    pub fn with_on_tab(
        mut self,
        hook: impl FnMut(&mut SessionCore) -> HookOutcome + Send + 'static,
    ) -> Self {
        self.hooks.on_tab = Some(Box::new(hook));
        self
    }

    pub fn with_on_submit(
        mut self,
        hook: impl FnMut(&mut SessionCore) -> SubmitDecision + Send + 'static,
    ) -> Self {
        self.hooks.on_submit = Some(Box::new(hook));
        self
    }
}

/// Mutable per-session state: the history list plus the cursor into it and
/// the caret inside the current entry.
///
/// `cursor` and `caret` are lazy: `None` means "resolve on next use" — the
/// cursor resolves to the draft slot and the caret to end-of-line. Offsets
/// are counted in chars; grapheme clusters are out of scope.
pub struct SessionCore {
    pub name: String,
    pub msg: String,
    pub persist: bool,
    pub eager_save: bool,
    pub storage_key: String,
    pub history: HistoryList,
    cursor: Option<usize>,
    caret: Option<usize>,
}

impl SessionCore {
    pub fn new(
        name: impl Into<String>,
        msg: impl Into<String>,
        persist: bool,
        eager_save: bool,
        storage_key: impl Into<String>,
        history: HistoryList,
    ) -> Self {
        Self {
            name: name.into(),
            msg: msg.into(),
            persist,
            eager_save,
            storage_key: storage_key.into(),
            history,
            cursor: None,
            caret: None,
        }
    }

    /// Clamps the cursor onto a valid entry, creating the draft slot when it
    /// runs past the end, and re-clamps the caret into the entry. Returns the
    /// resolved entry index.
    pub fn resolve(&mut self) -> usize {
        let len = self.history.len();
        let index = match self.cursor {
            Some(index) if index < len => index,
            _ => self.history.ensure_draft(),
        };
        self.cursor = Some(index);

        let value_chars = self.current_char_len(index);
        let caret = match self.caret {
            Some(caret) => caret.min(value_chars),
            None => value_chars,
        };
        self.caret = Some(caret);
        index
    }

    pub fn current_value(&mut self) -> &str {
        let index = self.resolve();
        self.history.entry(index).unwrap_or("")
    }

    /// Caret offset in chars. Only meaningful after `resolve`.
    pub fn caret(&self) -> usize {
        self.caret.unwrap_or(0)
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    fn current_char_len(&self, index: usize) -> usize {
        self.history
            .entry(index)
            .map(|value| value.chars().count())
            .unwrap_or(0)
    }

    pub fn caret_left(&mut self) {
        self.resolve();
        let caret = self.caret();
        if caret > 0 {
            self.caret = Some(caret - 1);
        }
    }

    pub fn caret_right(&mut self) {
        let index = self.resolve();
        let caret = self.caret();
        if caret < self.current_char_len(index) {
            self.caret = Some(caret + 1);
        }
    }

    /// Moves the history cursor one entry back, caret to end of line.
    pub fn cursor_up(&mut self) {
        let index = self.resolve();
        self.cursor = Some(index.saturating_sub(1));
        self.caret = None;
    }

    /// Moves the history cursor one entry forward, caret to end of line.
    /// Past the end the next resolve lands on the draft slot.
    pub fn cursor_down(&mut self) {
        let index = self.resolve();
        self.cursor = Some(index + 1);
        self.caret = None;
    }

    /// Inserts `ch` at the caret, forking to the draft slot when the cursor
    /// sits on a committed entry.
    pub fn insert(&mut self, ch: char) {
        let index = self.resolve();
        let caret = self.caret();
        let value = self.history.entry(index).unwrap_or("").to_string();
        let target = self.history.fork_target(index);

        let mut next = String::with_capacity(value.len() + ch.len_utf8());
        let byte = byte_offset(&value, caret);
        next.push_str(&value[..byte]);
        next.push(ch);
        next.push_str(&value[byte..]);

        self.history.set_entry(target, next);
        self.cursor = Some(target);
        self.caret = Some(caret + 1);
    }

    /// Removes the char before the caret. No-op at offset zero. Forks the
    /// same way `insert` does.
    pub fn backspace(&mut self) {
        let index = self.resolve();
        let caret = self.caret();
        if caret == 0 {
            return;
        }
        let value = self.history.entry(index).unwrap_or("").to_string();
        let target = self.history.fork_target(index);

        let mut next = value.clone();
        let start = byte_offset(&value, caret - 1);
        let end = byte_offset(&value, caret);
        next.replace_range(start..end, "");

        self.history.set_entry(target, next);
        self.cursor = Some(target);
        self.caret = Some(caret - 1);
    }

    /// Overwrites the entry at the current cursor in place. This is the hook
    /// escape hatch: unlike `insert`/`backspace` it does not fork.
    pub fn overwrite_current(&mut self, value: String) {
        let index = self.resolve();
        self.history.set_entry(index, value);
    }

    /// Commits the current entry: the cursor is dropped so the next resolve
    /// starts from a fresh draft slot, which is created right away.
    pub fn seal(&mut self) {
        self.cursor = None;
        self.caret = None;
        self.history.ensure_draft();
    }
}

fn byte_offset(value: &str, chars: usize) -> usize {
    value
        .char_indices()
        .nth(chars)
        .map(|(offset, _)| offset)
        .unwrap_or(value.len())
}
