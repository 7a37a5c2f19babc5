//! Normalization - total, pure defaulting/validation of profile records.
//!
//! Storage accumulates drift across schema versions and may hold records
//! written by older releases or hand-edited backups. `normalize_profile_data`
//! takes an arbitrary JSON value and always produces a complete,
//! invariant-satisfying [`ProfileData`]: missing, wrong-typed, or
//! out-of-range fields are silently replaced by their defaults; unknown
//! fields are dropped. It never fails and it is idempotent.
//!
//! Callers run it on every read and before every write, so storage always
//! holds normalized data even when the record was written by stale code.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::entities::{JournalEntry, Objective, Quest, QuestStatus};
use crate::value_objects::{
    CharacterSheet, CombatBlock, ProfileData, Special, StatRange, Weapon, SKILL_MAX, STAT_KEYS,
};
use crate::{EntryId, ObjectiveId, QuestId, SpecialId};

/// Normalize an arbitrary record into a complete profile data record.
pub fn normalize_profile_data(raw: &Value) -> ProfileData {
    let obj = match raw.as_object() {
        Some(obj) => obj,
        None => return ProfileData::default(),
    };

    // `log` is the pre-profiles draft key; accepted as an alias so old
    // single-profile exports still import.
    let log_draft = string_field(obj, "logDraft")
        .or_else(|| string_field(obj, "log"))
        .unwrap_or_default();

    let log_entries = match obj.get("logEntries").and_then(Value::as_array) {
        Some(items) => unique_entries(items.iter().map(normalize_entry).collect()),
        None => Vec::new(),
    };

    let inv = match obj.get("inv").and_then(Value::as_array) {
        Some(items) => items.iter().filter_map(inventory_line).collect(),
        None => Vec::new(),
    };

    let quests = match obj.get("quests").and_then(Value::as_array) {
        Some(items) => unique_quests(items.iter().map(normalize_quest).collect()),
        None => Vec::new(),
    };

    let sheet = normalize_sheet(obj.get("sheet").unwrap_or(&Value::Null));

    ProfileData {
        log_draft,
        log_entries,
        inv,
        quests,
        sheet,
    }
}

/// Normalize one quest record: assign an id when absent, default every
/// missing or wrong-typed field.
pub fn normalize_quest(raw: &Value) -> Quest {
    let defaults = Quest::new("");
    let obj = match raw.as_object() {
        Some(obj) => obj,
        None => return defaults,
    };

    let objectives = match obj.get("objectives").and_then(Value::as_array) {
        Some(items) => unique_objectives(items.iter().map(normalize_objective).collect()),
        None => Vec::new(),
    };

    Quest {
        id: id_field(obj, "id").map(QuestId::from_raw).unwrap_or(defaults.id),
        title: string_field(obj, "title").unwrap_or_default(),
        status: obj
            .get("status")
            .and_then(Value::as_str)
            .and_then(QuestStatus::parse_token)
            .unwrap_or_default(),
        notes: string_field(obj, "notes").unwrap_or_default(),
        objectives,
        mj: obj
            .get("mj")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default(),
    }
}

/// Normalize one objective record.
pub fn normalize_objective(raw: &Value) -> Objective {
    let obj = match raw.as_object() {
        Some(obj) => obj,
        None => return default_objective(),
    };
    Objective {
        id: id_field(obj, "id")
            .map(ObjectiveId::from_raw)
            .unwrap_or_else(ObjectiveId::generate),
        text: string_field(obj, "text").unwrap_or_default(),
        done: obj.get("done").and_then(coerce_bool).unwrap_or(false),
    }
}

/// Normalize one character sheet record.
pub fn normalize_sheet(raw: &Value) -> CharacterSheet {
    let base = CharacterSheet::default();
    let obj = match raw.as_object() {
        Some(obj) => obj,
        None => return base,
    };

    let hp_max = obj
        .get("hpMax")
        .and_then(coerce_i64)
        .unwrap_or(base.hp_max)
        .max(1);
    let hp = obj
        .get("hp")
        .and_then(coerce_i64)
        .unwrap_or(base.hp)
        .clamp(0, hp_max);
    let san_max = obj
        .get("sanMax")
        .and_then(coerce_i64)
        .unwrap_or(base.san_max)
        .max(1);
    let san = obj
        .get("san")
        .and_then(coerce_i64)
        .unwrap_or(base.san)
        .clamp(0, san_max);

    // Exactly the five fixed stat keys survive; anything else is dropped.
    let raw_stats = obj.get("stats").and_then(Value::as_object);
    let stats = STAT_KEYS
        .iter()
        .map(|key| {
            let default = StatRange::default();
            let range = match raw_stats.and_then(|s| s.get(*key)).and_then(Value::as_object) {
                Some(entry) => {
                    let max = entry.get("max").and_then(coerce_i64).unwrap_or(default.max);
                    let v = entry.get("v").and_then(coerce_i64).unwrap_or(default.v);
                    StatRange::clamped(v, max)
                }
                None => default,
            };
            (key.to_string(), range)
        })
        .collect();

    let skills = match obj.get("skills").and_then(Value::as_object) {
        Some(entries) => entries
            .iter()
            .map(|(k, v)| (k.clone(), coerce_i64(v).unwrap_or(0).clamp(0, SKILL_MAX)))
            .collect(),
        None => Default::default(),
    };

    let combat = normalize_combat(obj.get("combat").unwrap_or(&Value::Null));

    let specials = match obj.get("specials").and_then(Value::as_array) {
        Some(items) => unique_specials(items.iter().map(normalize_special).collect()),
        None => Vec::new(),
    };

    CharacterSheet {
        locked: obj.get("locked").and_then(coerce_bool).unwrap_or(base.locked),
        hp,
        hp_max,
        wounds: string_field(obj, "wounds").unwrap_or_default(),
        san,
        san_max,
        troubles: string_field(obj, "troubles").unwrap_or_default(),
        stats,
        skills,
        combat,
        specials,
    }
}

/// Re-normalize an already-typed record. Used before every write so that
/// helper-bypassing field edits cannot persist an invariant violation.
pub fn renormalize(data: &ProfileData) -> ProfileData {
    match serde_json::to_value(data) {
        Ok(value) => normalize_profile_data(&value),
        // Serializing our own types cannot fail in practice; fall back to
        // the input rather than invent data.
        Err(err) => {
            tracing::debug!(error = %err, "renormalize serialization failed");
            data.clone()
        }
    }
}

fn normalize_combat(raw: &Value) -> CombatBlock {
    let obj = match raw.as_object() {
        Some(obj) => obj,
        None => return CombatBlock::default(),
    };
    CombatBlock {
        ranged: obj.get("ranged").and_then(coerce_i64).unwrap_or(0),
        melee: obj.get("melee").and_then(coerce_i64).unwrap_or(0),
        prot: obj.get("prot").and_then(coerce_i64).unwrap_or(0),
        w1: normalize_weapon(obj.get("w1").unwrap_or(&Value::Null)),
        w2: normalize_weapon(obj.get("w2").unwrap_or(&Value::Null)),
    }
}

fn normalize_weapon(raw: &Value) -> Weapon {
    let obj = match raw.as_object() {
        Some(obj) => obj,
        None => return Weapon::default(),
    };
    Weapon {
        name: string_field(obj, "name").unwrap_or_default(),
        dmg: string_field(obj, "dmg").unwrap_or_default(),
    }
}

fn normalize_special(raw: &Value) -> Special {
    let obj = match raw.as_object() {
        Some(obj) => obj,
        None => {
            return Special {
                id: SpecialId::generate(),
                name: String::new(),
                val: String::new(),
            }
        }
    };
    Special {
        id: id_field(obj, "id")
            .map(SpecialId::from_raw)
            .unwrap_or_else(SpecialId::generate),
        name: string_field(obj, "name").unwrap_or_default(),
        val: display_string(obj.get("val")),
    }
}

fn normalize_entry(raw: &Value) -> JournalEntry {
    let obj = match raw.as_object() {
        Some(obj) => obj,
        None => return JournalEntry::new(0, ""),
    };
    JournalEntry {
        id: id_field(obj, "id")
            .map(EntryId::from_raw)
            .unwrap_or_else(EntryId::generate),
        ts: obj.get("ts").and_then(coerce_i64).unwrap_or(0),
        text: string_field(obj, "text").unwrap_or_default(),
    }
}

fn default_objective() -> Objective {
    Objective {
        id: ObjectiveId::generate(),
        text: String::new(),
        done: false,
    }
}

// ── Field coercion helpers ──────────────────────────────────────────────

/// Permissive numeric coercion: JSON numbers and numeric strings; anything
/// non-finite or non-numeric is rejected (caller substitutes the default).
fn coerce_i64(value: &Value) -> Option<i64> {
    let f = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    f.is_finite().then_some(f as i64)
}

/// Permissive boolean coercion: booleans, the classic 0/1 numerics, and
/// the string literals.
fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

/// A non-empty string id, if present.
fn id_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Strings kept verbatim, scalars stringified, containers dropped.
fn inventory_line(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Free-text field that tolerates numeric input.
fn display_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

// ── Id uniqueness ───────────────────────────────────────────────────────
//
// The first occurrence keeps its stored id (merge identity stays stable);
// later duplicates get a fresh id.

fn unique_quests(mut quests: Vec<Quest>) -> Vec<Quest> {
    let mut seen = HashSet::new();
    for quest in &mut quests {
        if !seen.insert(quest.id.as_str().to_string()) {
            quest.id = QuestId::generate();
            seen.insert(quest.id.as_str().to_string());
        }
    }
    quests
}

fn unique_objectives(mut objectives: Vec<Objective>) -> Vec<Objective> {
    let mut seen = HashSet::new();
    for objective in &mut objectives {
        if !seen.insert(objective.id.as_str().to_string()) {
            objective.id = ObjectiveId::generate();
            seen.insert(objective.id.as_str().to_string());
        }
    }
    objectives
}

fn unique_entries(mut entries: Vec<JournalEntry>) -> Vec<JournalEntry> {
    let mut seen = HashSet::new();
    for entry in &mut entries {
        if !seen.insert(entry.id.as_str().to_string()) {
            entry.id = EntryId::generate();
            seen.insert(entry.id.as_str().to_string());
        }
    }
    entries
}

fn unique_specials(mut specials: Vec<Special>) -> Vec<Special> {
    let mut seen = HashSet::new();
    for special in &mut specials {
        if !seen.insert(special.id.as_str().to_string()) {
            special.id = SpecialId::generate();
            seen.insert(special.id.as_str().to_string());
        }
    }
    specials
}
