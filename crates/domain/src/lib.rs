//! Lorebook domain - profile data model, normalization, and quest merge.
//!
//! This crate is pure: no storage, no I/O. The engine crate layers the
//! key-value registry and the import/export codec on top of it.

pub mod entities;
pub mod error;
pub mod ids;
pub mod merge;
pub mod normalize;
pub mod value_objects;

// Re-export entities
pub use entities::{
    entries_sorted_desc, status_counts, JournalEntry, Objective, Profile, Quest, QuestStatus,
    StatusCounts, FALLBACK_PROFILE_NAME,
};

pub use error::DomainError;

// Re-export merge operations
pub use merge::{merge_objectives, merge_quests};

// Re-export normalization
pub use normalize::{
    normalize_objective, normalize_profile_data, normalize_quest, normalize_sheet, renormalize,
};

// Re-export ID types
pub use ids::{EntryId, ObjectiveId, ProfileId, QuestId, SpecialId};

// Re-export value objects
pub use value_objects::{
    CharacterSheet, CombatBlock, ProfileData, Special, StatRange, Weapon, DEFAULT_STAT_MAX,
    DEFAULT_STAT_VALUE, SKILL_MAX, STAT_KEYS,
};
