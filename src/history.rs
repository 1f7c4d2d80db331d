use serde::{Deserialize, Serialize};

/// Ordered list of past line values for one prompt session, oldest first.
///
/// The last element may be the draft slot: the entry still being edited and
/// not yet committed by a submission. Earlier entries are committed; edits
/// made while the history cursor points at one of them are redirected to the
/// draft slot instead (see `fork_target`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryList {
    entries: Vec<String>,
}

impl HistoryList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<String>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn last_index(&self) -> Option<usize> {
        self.entries.len().checked_sub(1)
    }

    /// Appends an empty draft entry unless the list already ends in an empty
    /// one, and returns the draft index. Never produces two empty drafts.
    pub fn ensure_draft(&mut self) -> usize {
        match self.entries.last() {
            Some(last) if last.is_empty() => {}
            _ => self.entries.push(String::new()),
        }
        self.entries.len() - 1
    }

    /// Index an edit positioned at `cursor` should write to.
    ///
    /// Editing a committed entry forks to the draft slot (created on demand)
    /// so committed history stays intact; editing the last entry edits it in
    /// place.
    pub fn fork_target(&mut self, cursor: usize) -> usize {
        match self.last_index() {
            Some(last) if cursor < last => self.ensure_draft(),
            _ => cursor,
        }
    }

    /// Writes `value` at `index`, appending when `index` is one past the end.
    pub fn set_entry(&mut self, index: usize, value: String) {
        if index == self.entries.len() {
            self.entries.push(value);
        } else {
            self.entries[index] = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_draft_is_idempotent() {
        let mut list = HistoryList::new();
        assert_eq!(list.ensure_draft(), 0);
        assert_eq!(list.ensure_draft(), 0);
        assert_eq!(list.entries(), &["".to_string()]);
    }

    #[test]
    fn test_ensure_draft_appends_after_committed_entry() {
        let mut list = HistoryList::from_entries(vec!["ls".to_string()]);
        assert_eq!(list.ensure_draft(), 1);
        assert_eq!(list.entries(), &["ls".to_string(), String::new()]);
    }

    #[test]
    fn test_fork_target_redirects_committed_edit_to_draft() {
        let mut list = HistoryList::from_entries(vec![
            "ls".to_string(),
            "pwd".to_string(),
            String::new(),
        ]);
        assert_eq!(list.fork_target(1), 2);
        assert_eq!(list.entry(1), Some("pwd"));
    }

    #[test]
    fn test_fork_target_appends_when_draft_has_content() {
        let mut list = HistoryList::from_entries(vec!["ls".to_string(), "dra".to_string()]);
        // The in-progress draft is abandoned in place; the fork gets a new slot.
        assert_eq!(list.fork_target(0), 2);
        assert_eq!(list.len(), 3);
        assert_eq!(list.entry(1), Some("dra"));
    }

    #[test]
    fn test_fork_target_keeps_last_entry_in_place() {
        let mut list = HistoryList::from_entries(vec!["ls".to_string(), "dr".to_string()]);
        assert_eq!(list.fork_target(1), 1);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_set_entry_appends_at_end() {
        let mut list = HistoryList::from_entries(vec!["ls".to_string()]);
        list.set_entry(1, "pwd".to_string());
        assert_eq!(list.entries(), &["ls".to_string(), "pwd".to_string()]);
    }
}
