//! Import/export codec - document detection, parsing, and file naming.
//!
//! Three document kinds, distinguished by shape, never guessed:
//!
//! - full backup: `profiles` array plus `dataByProfile` object;
//! - single-profile backup: a `data` object, optionally with a `profile`
//!   metadata object, or a bare profile-data-shaped object;
//! - GM pack: the literal `kind: "pack_mj"` tag plus a `quests` array.
//!
//! Parse and shape failures abort before any state change. Exports
//! produce pretty JSON text plus a date-stamped file name; actual file
//! and clipboard I/O stays with the caller.

pub mod backup;
pub mod pack;

use serde_json::{Map, Value};
use thiserror::Error;

pub use backup::{
    export_full, export_profile, import_full, import_profile, FULL_BACKUP_VERSION,
    PROFILE_BACKUP_VERSION,
};
pub use pack::{
    apply_pack, export_pack, GmPack, PackOutcome, PackTarget, GM_PACK_KIND, GM_PACK_VERSION,
};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("document is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("unrecognized document shape")]
    UnrecognizedFormat,

    #[error("backup contains no usable profile")]
    EmptyBackup,

    #[error("document is not a GM pack")]
    NotAGmPack,

    #[error("pack carries no campaign id")]
    MissingCampaignId,

    #[error("no profiles in campaign {0:?}")]
    NoMatchingProfiles(String),
}

/// A parsed import document, ready for the matching apply routine.
#[derive(Debug, Clone)]
pub enum Document {
    FullBackup {
        requested_active: Option<String>,
        profiles: Vec<Value>,
        data_by_profile: Map<String, Value>,
    },
    ProfileBackup {
        profile: Option<Value>,
        data: Value,
    },
    GmPack(GmPack),
}

/// Keys whose presence marks a bare object as profile-data-shaped.
const DATA_SHAPE_KEYS: [&str; 6] = ["sheet", "logDraft", "log", "logEntries", "inv", "quests"];

/// Detect and parse an import document from raw text.
pub fn parse_document(text: &str) -> Result<Document, CodecError> {
    let raw: Value = serde_json::from_str(text)?;
    let obj = raw.as_object().ok_or(CodecError::UnrecognizedFormat)?;

    if obj.get("kind").and_then(Value::as_str) == Some(GM_PACK_KIND) {
        return Ok(Document::GmPack(GmPack::from_object(obj)?));
    }

    let has_profiles = obj.get("profiles").map(Value::is_array) == Some(true);
    let has_data_map = obj.get("dataByProfile").map(Value::is_object) == Some(true);
    if has_profiles && has_data_map {
        let profiles = obj
            .get("profiles")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let data_by_profile = obj
            .get("dataByProfile")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        let requested_active = obj
            .get("activeProfileId")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        return Ok(Document::FullBackup {
            requested_active,
            profiles,
            data_by_profile,
        });
    }

    if let Some(data) = obj.get("data").filter(|d| d.is_object()) {
        return Ok(Document::ProfileBackup {
            profile: obj.get("profile").cloned(),
            data: data.clone(),
        });
    }

    if DATA_SHAPE_KEYS.iter().any(|k| obj.contains_key(*k)) {
        return Ok(Document::ProfileBackup {
            profile: None,
            data: raw.clone(),
        });
    }

    Err(CodecError::UnrecognizedFormat)
}

/// An export ready to hand to the caller's file/clipboard boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    /// Suggested download name, date-stamped.
    pub file_name: String,
    /// Pretty-printed JSON text.
    pub json: String,
}

/// Today's date stamp for export file names.
pub(crate) fn date_stamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

/// File-name slug: lowercase, non-alphanumeric runs collapsed to `-`,
/// trimmed at both ends. An all-symbol name slugs to `profile`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::new();
    let mut gap = false;
    for ch in name.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            if gap && !slug.is_empty() {
                slug.push('-');
            }
            gap = false;
            slug.push(ch);
        } else {
            gap = true;
        }
    }
    if slug.is_empty() {
        "profile".to_string()
    } else {
        slug
    }
}
