//! Journal entry entity - archived log notes.
//!
//! Entries carry epoch-millisecond timestamps (the storage format predates
//! this crate and is kept for backup compatibility). Insertion order is
//! irrelevant: display always re-sorts by timestamp descending.

use serde::{Deserialize, Serialize};

use crate::EntryId;

/// One archived journal note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: EntryId,
    /// Epoch milliseconds.
    pub ts: i64,
    pub text: String,
}

impl JournalEntry {
    pub fn new(ts: i64, text: impl Into<String>) -> Self {
        Self {
            id: EntryId::generate(),
            ts,
            text: text.into(),
        }
    }
}

/// Entries in display order: newest timestamp first. Ties keep their
/// stored relative order.
pub fn entries_sorted_desc(entries: &[JournalEntry]) -> Vec<&JournalEntry> {
    let mut sorted: Vec<&JournalEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| std::cmp::Reverse(e.ts));
    sorted
}
