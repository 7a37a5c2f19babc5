//! Profile entity - one player character's identity record.
//!
//! A profile is the registry-level record (name, campaign tag, creation
//! time); the associated `ProfileData` record lives under its own storage
//! key, keyed by the profile id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ProfileId;

/// Fallback display name for profiles imported without a usable name.
pub const FALLBACK_PROFILE_NAME: &str = "Profile";

/// One player character's identity record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: ProfileId,
    pub name: String,
    /// Free-text campaign tag. Campaign-scoped GM pack application matches
    /// this by exact string equality on the trimmed value.
    pub campaign: String,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(name: impl Into<String>, campaign: impl Into<String>) -> Self {
        Self {
            id: ProfileId::generate(),
            name: name.into(),
            campaign: campaign.into(),
            created_at: Utc::now(),
        }
    }

    /// Rebuild a profile from a loosely-typed stored or imported record.
    ///
    /// Returns `None` when the record has no usable id; every other field
    /// falls back to a default. This is the per-entry filter applied both
    /// when reading the registry and when importing a full backup.
    pub fn from_value(raw: &Value) -> Option<Self> {
        let obj = raw.as_object()?;
        let id = obj.get("id")?.as_str()?.trim();
        if id.is_empty() {
            return None;
        }

        let name = obj
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(FALLBACK_PROFILE_NAME);
        let campaign = obj
            .get("campaign")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or("");
        let created_at = obj
            .get("createdAt")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        Some(Self {
            id: ProfileId::from_raw(id),
            name: name.to_string(),
            campaign: campaign.to_string(),
            created_at,
        })
    }

    /// Whether this profile belongs to the given campaign (exact equality
    /// on the trimmed tag, no case folding).
    pub fn in_campaign(&self, campaign_id: &str) -> bool {
        self.campaign.trim() == campaign_id
    }
}
