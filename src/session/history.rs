//! Append-only ledger of resolved decisions.

use crate::decision::HistoryEntry;
use crate::error::{BridgeError, Result};

/// Audit ledger for one session. Entries are appended exactly once per
/// successful resolution and never edited or removed.
#[derive(Debug, Clone, Default)]
pub struct HistoryRecorder {
    entries: Vec<HistoryEntry>,
}

impl HistoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry. A decision id may appear at most once.
    pub fn append(&mut self, entry: HistoryEntry) -> Result<()> {
        if self.contains(&entry.decision_id) {
            return Err(BridgeError::user_input(format!(
                "decision {} is already resolved",
                entry.decision_id
            )));
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn contains(&self, decision_id: &str) -> bool {
        self.entries.iter().any(|e| e.decision_id == decision_id)
    }

    /// Read-only view in resolution order. Re-readable; iterating never
    /// mutates the ledger.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
