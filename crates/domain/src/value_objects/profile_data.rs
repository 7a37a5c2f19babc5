//! ProfileData - the full per-profile record: journal draft and archive,
//! inventory, quest log, and character sheet.
//!
//! The UI holds no authoritative state; it always re-reads one of these
//! records, mutates it through the helpers below, and writes it back.

use serde::{Deserialize, Serialize};

use crate::entities::{entries_sorted_desc, status_counts, JournalEntry, Quest, StatusCounts};
use crate::value_objects::CharacterSheet;
use crate::{DomainError, EntryId, QuestId};

/// One profile's complete data record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
    /// In-progress journal text, saved on every keystroke, cleared on
    /// archive.
    pub log_draft: String,
    /// Append-only journal archive; display order is timestamp descending.
    pub log_entries: Vec<JournalEntry>,
    /// Free-text inventory lines, newest first.
    pub inv: Vec<String>,
    pub quests: Vec<Quest>,
    pub sheet: CharacterSheet,
}

impl ProfileData {
    // ── Journal ──────────────────────────────────────────────────────────

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.log_draft = draft.into();
    }

    /// Archive the current draft as a journal entry stamped `ts` (epoch
    /// milliseconds) and clear the draft. A blank draft is a no-op.
    pub fn archive_draft(&mut self, ts: i64) -> Option<EntryId> {
        let text = self.log_draft.trim();
        if text.is_empty() {
            return None;
        }
        let entry = JournalEntry::new(ts, text);
        let id = entry.id.clone();
        self.log_entries.insert(0, entry);
        self.log_draft.clear();
        Some(id)
    }

    /// Discard the draft without archiving.
    pub fn clear_draft(&mut self) {
        self.log_draft.clear();
    }

    /// Delete an archived entry by id. Returns false when the id is unknown.
    pub fn delete_entry(&mut self, id: &EntryId) -> bool {
        let before = self.log_entries.len();
        self.log_entries.retain(|e| &e.id != id);
        self.log_entries.len() < before
    }

    pub fn clear_entries(&mut self) {
        self.log_entries.clear();
    }

    /// Archive in display order (newest first).
    pub fn entries_sorted(&self) -> Vec<&JournalEntry> {
        entries_sorted_desc(&self.log_entries)
    }

    // ── Inventory ────────────────────────────────────────────────────────

    /// Add an inventory line at the front (newest first). Rejects blank
    /// text.
    pub fn add_item(&mut self, text: &str) -> Result<(), DomainError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::validation("inventory line cannot be empty"));
        }
        self.inv.insert(0, text.to_string());
        Ok(())
    }

    /// Remove an inventory line by position.
    pub fn remove_item(&mut self, index: usize) -> Result<String, DomainError> {
        if index >= self.inv.len() {
            return Err(DomainError::constraint("inventory index out of range"));
        }
        Ok(self.inv.remove(index))
    }

    pub fn clear_inventory(&mut self) {
        self.inv.clear();
    }

    // ── Quest log ────────────────────────────────────────────────────────

    /// Add a new quest at the front of the log. Rejects blank titles.
    pub fn add_quest(&mut self, title: &str) -> Result<QuestId, DomainError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("quest title cannot be empty"));
        }
        let quest = Quest::new(title);
        let id = quest.id.clone();
        self.quests.insert(0, quest);
        Ok(id)
    }

    pub fn quest(&self, id: &QuestId) -> Option<&Quest> {
        self.quests.iter().find(|q| &q.id == id)
    }

    pub fn quest_mut(&mut self, id: &QuestId) -> Option<&mut Quest> {
        self.quests.iter_mut().find(|q| &q.id == id)
    }

    /// Remove a quest by id. Returns false when the id is unknown.
    pub fn remove_quest(&mut self, id: &QuestId) -> bool {
        let before = self.quests.len();
        self.quests.retain(|q| &q.id != id);
        self.quests.len() < before
    }

    /// Drop every completed objective across all quests.
    pub fn clear_done_objectives(&mut self) {
        for quest in &mut self.quests {
            quest.clear_done_objectives();
        }
    }

    pub fn quest_counts(&self) -> StatusCounts {
        status_counts(&self.quests)
    }
}
