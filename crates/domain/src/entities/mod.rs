pub mod journal;
pub mod profile;
pub mod quest;

pub use journal::{entries_sorted_desc, JournalEntry};
pub use profile::{Profile, FALLBACK_PROFILE_NAME};
pub use quest::{status_counts, Objective, Quest, QuestStatus, StatusCounts};
