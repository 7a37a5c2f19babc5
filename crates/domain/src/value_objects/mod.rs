pub mod character_sheet;
pub mod profile_data;

pub use character_sheet::{
    CharacterSheet, CombatBlock, Special, StatRange, Weapon, DEFAULT_STAT_MAX,
    DEFAULT_STAT_VALUE, SKILL_MAX, STAT_KEYS,
};
pub use profile_data::ProfileData;
