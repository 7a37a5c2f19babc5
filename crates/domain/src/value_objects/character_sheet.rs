//! CharacterSheet and its sub-blocks - resource gauges, stats, skills,
//! combat values, and free-form special abilities.
//!
//! The canonical default set is the richer, later schema: hp 10/20,
//! sanity 10/20, five fixed stats at 10/20. Earlier releases shipped
//! divergent defaults; those records are absorbed by normalization, not
//! reconciled here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::SpecialId;

/// The five fixed stat keys, in display order. Part of the storage format.
pub const STAT_KEYS: [&str; 5] = ["for", "dex", "end", "int", "intu"];

/// Default value/ceiling for resources and stats.
pub const DEFAULT_STAT_VALUE: i64 = 10;
pub const DEFAULT_STAT_MAX: i64 = 20;

/// Skill values are percentile.
pub const SKILL_MAX: i64 = 100;

/// A current value with its ceiling, as used by stat gauges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatRange {
    pub v: i64,
    pub max: i64,
}

impl StatRange {
    /// Build a range satisfying the gauge invariant: `max >= 1`,
    /// `0 <= v <= max`.
    pub fn clamped(v: i64, max: i64) -> Self {
        let max = max.max(1);
        Self {
            v: v.clamp(0, max),
            max,
        }
    }
}

impl Default for StatRange {
    fn default() -> Self {
        Self {
            v: DEFAULT_STAT_VALUE,
            max: DEFAULT_STAT_MAX,
        }
    }
}

/// One equipped weapon line.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weapon {
    pub name: String,
    pub dmg: String,
}

/// Combat block: flat modifiers plus two weapon slots.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatBlock {
    pub ranged: i64,
    pub melee: i64,
    pub prot: i64,
    pub w1: Weapon,
    pub w2: Weapon,
}

/// A free-form special ability line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Special {
    pub id: SpecialId,
    pub name: String,
    pub val: String,
}

impl Special {
    pub fn new(name: impl Into<String>, val: impl Into<String>) -> Self {
        Self {
            id: SpecialId::generate(),
            name: name.into(),
            val: val.into(),
        }
    }
}

/// The character sheet record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSheet {
    /// Edit lock. A locked sheet is read-only in the UI; the lock state is
    /// persisted so it survives reloads.
    pub locked: bool,
    pub hp: i64,
    pub hp_max: i64,
    pub wounds: String,
    pub san: i64,
    pub san_max: i64,
    pub troubles: String,
    /// Exactly the five `STAT_KEYS`; normalization drops anything else.
    pub stats: BTreeMap<String, StatRange>,
    /// Percentile skills, clamped to 0..=100.
    pub skills: BTreeMap<String, i64>,
    pub combat: CombatBlock,
    pub specials: Vec<Special>,
}

impl Default for CharacterSheet {
    fn default() -> Self {
        let stats = STAT_KEYS
            .iter()
            .map(|k| (k.to_string(), StatRange::default()))
            .collect();
        Self {
            locked: true,
            hp: DEFAULT_STAT_VALUE,
            hp_max: DEFAULT_STAT_MAX,
            wounds: String::new(),
            san: DEFAULT_STAT_VALUE,
            san_max: DEFAULT_STAT_MAX,
            troubles: String::new(),
            stats,
            skills: BTreeMap::new(),
            combat: CombatBlock::default(),
            specials: Vec::new(),
        }
    }
}

impl CharacterSheet {
    /// Set hit points, clamping into the gauge.
    pub fn set_hp(&mut self, hp: i64) {
        self.hp = hp.clamp(0, self.hp_max);
    }

    /// Set the hit point ceiling (at least 1), re-clamping the current value.
    pub fn set_hp_max(&mut self, hp_max: i64) {
        self.hp_max = hp_max.max(1);
        self.hp = self.hp.clamp(0, self.hp_max);
    }

    /// Set sanity, clamping into the gauge.
    pub fn set_san(&mut self, san: i64) {
        self.san = san.clamp(0, self.san_max);
    }

    /// Set the sanity ceiling (at least 1), re-clamping the current value.
    pub fn set_san_max(&mut self, san_max: i64) {
        self.san_max = san_max.max(1);
        self.san = self.san.clamp(0, self.san_max);
    }

    /// Set one of the five fixed stats. Unknown keys are ignored and
    /// reported via the return value.
    pub fn set_stat(&mut self, key: &str, v: i64, max: i64) -> bool {
        if !STAT_KEYS.contains(&key) {
            return false;
        }
        self.stats.insert(key.to_string(), StatRange::clamped(v, max));
        true
    }

    /// Set a percentile skill, clamped to 0..=100.
    pub fn set_skill(&mut self, key: impl Into<String>, value: i64) {
        self.skills.insert(key.into(), value.clamp(0, SKILL_MAX));
    }

    pub fn toggle_lock(&mut self) {
        self.locked = !self.locked;
    }
}
