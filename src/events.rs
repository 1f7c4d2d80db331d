/// Opaque handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Ordered fan-out registry for observers of one event type. Owned and
/// injected explicitly; there is no process-global listener table.
pub struct EventBus<T> {
    next_id: u64,
    listeners: Vec<(ListenerId, Box<dyn FnMut(&T) + Send>)>,
}

impl<T> EventBus<T> {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&T) + Send + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false when the handle was already gone.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: &T) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<T> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A single exit listener's verdict on process termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDecision {
    Exit,
    Veto,
}

pub type ExitListener = Box<dyn FnMut(Option<&anyhow::Error>) -> ExitDecision + Send>;

/// Listeners consulted on interrupt, after pending history saves have run.
/// Each receives the save error, if any; one veto keeps the process alive.
#[derive(Default)]
pub struct ExitListeners {
    next_id: u64,
    listeners: Vec<(ListenerId, ExitListener)>,
}

impl ExitListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(Option<&anyhow::Error>) -> ExitDecision + Send + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Returns true when every listener (possibly none) allows the exit.
    pub fn notify(&mut self, save_error: Option<&anyhow::Error>) -> bool {
        let mut do_exit = true;
        for (_, listener) in &mut self.listeners {
            if listener(save_error) == ExitDecision::Veto {
                do_exit = false;
            }
        }
        do_exit
    }
}
