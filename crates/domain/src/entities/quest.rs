//! Quest entity - quest log entries with objectives and opaque GM metadata.
//!
//! Quests are identity-keyed: the id is what GM pack merges match on, so it
//! must survive export/import round-trips verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{DomainError, ObjectiveId, QuestId};

/// Lifecycle state of a quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QuestStatus {
    #[default]
    #[serde(rename = "IN_PROGRESS")]
    InProgress,
    #[serde(rename = "DONE")]
    Done,
    #[serde(rename = "FAILED")]
    Failed,
}

impl QuestStatus {
    /// Parse a stored status token.
    ///
    /// Storage accumulates drift across schema versions, so the legacy
    /// tokens written by earlier releases are accepted alongside the
    /// canonical ones; they are rewritten canonically on the next save.
    pub fn parse_token(token: &str) -> Option<Self> {
        match token {
            "IN_PROGRESS" | "EN_COURS" => Some(Self::InProgress),
            "DONE" | "OK" => Some(Self::Done),
            "FAILED" | "RATEE" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
            Self::Failed => "FAILED",
        }
    }
}

/// A single checkbox line under a quest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Objective {
    pub id: ObjectiveId,
    pub text: String,
    pub done: bool,
}

impl Objective {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: ObjectiveId::generate(),
            text: text.into(),
            done: false,
        }
    }
}

/// One quest log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: QuestId,
    pub title: String,
    pub status: QuestStatus,
    pub notes: String,
    pub objectives: Vec<Objective>,
    /// Opaque GM metadata carried through merges untouched. The key name is
    /// part of the document format.
    pub mj: Map<String, Value>,
}

impl Quest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: QuestId::generate(),
            title: title.into(),
            status: QuestStatus::InProgress,
            notes: String::new(),
            objectives: Vec::new(),
            mj: Map::new(),
        }
    }

    /// Append a new objective. Rejects blank text.
    pub fn add_objective(&mut self, text: &str) -> Result<ObjectiveId, DomainError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::validation("objective text cannot be empty"));
        }
        let objective = Objective::new(text);
        let id = objective.id.clone();
        self.objectives.push(objective);
        Ok(id)
    }

    /// Set an objective's done flag. Returns false when the id is unknown.
    pub fn set_objective_done(&mut self, id: &ObjectiveId, done: bool) -> bool {
        match self.objectives.iter_mut().find(|o| &o.id == id) {
            Some(o) => {
                o.done = done;
                true
            }
            None => false,
        }
    }

    /// Remove an objective by id. Returns false when the id is unknown.
    pub fn remove_objective(&mut self, id: &ObjectiveId) -> bool {
        let before = self.objectives.len();
        self.objectives.retain(|o| &o.id != id);
        self.objectives.len() < before
    }

    /// Drop every completed objective.
    pub fn clear_done_objectives(&mut self) {
        self.objectives.retain(|o| !o.done);
    }
}

/// Per-status quest tallies, as shown in the quest board header and the
/// diagnostic summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCounts {
    pub in_progress: usize,
    pub done: usize,
    pub failed: usize,
}

/// Count quests by status.
pub fn status_counts(quests: &[Quest]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for q in quests {
        match q.status {
            QuestStatus::InProgress => counts.in_progress += 1,
            QuestStatus::Done => counts.done += 1,
            QuestStatus::Failed => counts.failed += 1,
        }
    }
    counts
}
