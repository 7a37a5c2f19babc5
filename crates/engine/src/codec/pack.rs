//! GM pack export and application.
//!
//! A pack never replaces: its quest list is merged into each target
//! profile's existing quests so re-applying a re-exported pack cannot
//! reset player progress. A non-empty briefing is prepended to the
//! target's journal draft under a campaign-tagged header; the archive is
//! never touched.

use chrono::Utc;
use lorebook_domain::{merge_quests, normalize_quest, Profile, ProfileData, ProfileId, Quest};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::codec::{date_stamp, slugify, CodecError, ExportDocument};
use crate::registry::ProfileRegistry;

pub const GM_PACK_KIND: &str = "pack_mj";
pub const GM_PACK_VERSION: u32 = 3;

/// A GM-authored quest pack.
///
/// Quests are carried loosely typed; they are normalized at application
/// time like any other external record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmPack {
    pub kind: String,
    pub v: u32,
    pub exported_at: String,
    pub campaign_id: String,
    pub briefing: String,
    pub quests: Vec<Value>,
}

impl GmPack {
    /// Parse a pack from raw text. Anything that is not a pack-shaped
    /// object fails with [`CodecError::NotAGmPack`].
    pub fn parse(text: &str) -> Result<Self, CodecError> {
        let raw: Value = serde_json::from_str(text)?;
        let obj = raw.as_object().ok_or(CodecError::NotAGmPack)?;
        Self::from_object(obj)
    }

    /// Rebuild a pack from a loosely-typed parsed object. The kind tag
    /// and a quests array are required; everything else defaults.
    pub(crate) fn from_object(obj: &Map<String, Value>) -> Result<Self, CodecError> {
        if obj.get("kind").and_then(Value::as_str) != Some(GM_PACK_KIND) {
            return Err(CodecError::NotAGmPack);
        }
        let quests = obj
            .get("quests")
            .and_then(Value::as_array)
            .cloned()
            .ok_or(CodecError::NotAGmPack)?;

        let str_field = |key: &str| {
            obj.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Ok(Self {
            kind: GM_PACK_KIND.to_string(),
            v: obj
                .get("v")
                .and_then(Value::as_u64)
                .map(|v| v as u32)
                .unwrap_or(GM_PACK_VERSION),
            exported_at: str_field("exportedAt"),
            campaign_id: str_field("campaignId").trim().to_string(),
            briefing: str_field("briefing"),
            quests,
        })
    }

    /// Normalized quest list, ready for merging.
    pub fn normalized_quests(&self) -> Vec<Quest> {
        self.quests.iter().map(normalize_quest).collect()
    }
}

/// Export a profile's quest list as a GM pack for re-authoring. The
/// campaign id comes from the profile's campaign tag; the briefing
/// starts empty.
pub fn export_pack(profile: &Profile, data: &ProfileData) -> Result<ExportDocument, CodecError> {
    let pack = GmPack {
        kind: GM_PACK_KIND.to_string(),
        v: GM_PACK_VERSION,
        exported_at: Utc::now().to_rfc3339(),
        campaign_id: profile.campaign.trim().to_string(),
        briefing: String::new(),
        quests: data
            .quests
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<_, _>>()?,
    };
    Ok(ExportDocument {
        file_name: format!("lorebook-pack-{}-{}.json", slugify(&profile.name), date_stamp()),
        json: serde_json::to_string_pretty(&pack)?,
    })
}

/// Which profiles a pack applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackTarget {
    /// The active profile only.
    Active,
    /// Every registered profile. Irreversible in bulk; confirming with
    /// the user first is the caller's responsibility.
    AllProfiles,
    /// Profiles whose campaign tag equals the pack's campaign id.
    Campaign,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackOutcome {
    pub applied_to: Vec<ProfileId>,
    pub campaign_id: String,
}

/// Merge a pack into the selected profiles. Target selection is
/// validated before the first write; a failed selection leaves every
/// profile untouched. Notifies once at the end.
pub fn apply_pack(
    registry: &mut ProfileRegistry,
    pack: &GmPack,
    target: PackTarget,
) -> Result<PackOutcome, CodecError> {
    let targets: Vec<ProfileId> = match target {
        PackTarget::Active => vec![registry.ensure_active_profile()],
        PackTarget::AllProfiles => {
            registry.ensure_active_profile();
            registry.profiles().into_iter().map(|p| p.id).collect()
        }
        PackTarget::Campaign => {
            if pack.campaign_id.trim().is_empty() {
                return Err(CodecError::MissingCampaignId);
            }
            let campaign = pack.campaign_id.trim();
            let matches: Vec<ProfileId> = registry
                .profiles()
                .into_iter()
                .filter(|p| p.in_campaign(campaign))
                .map(|p| p.id)
                .collect();
            if matches.is_empty() {
                return Err(CodecError::NoMatchingProfiles(campaign.to_string()));
            }
            matches
        }
    };

    let incoming = pack.normalized_quests();
    let briefing_block = briefing_block(pack);

    for id in &targets {
        let mut data = registry.profile_data(id);
        data.quests = merge_quests(&data.quests, &incoming);
        if let Some(block) = &briefing_block {
            data.log_draft = format!("{block}{}", data.log_draft);
        }
        registry.set_profile_data(id, &data);
    }

    tracing::debug!(
        targets = targets.len(),
        quests = incoming.len(),
        campaign = %pack.campaign_id,
        "gm pack applied"
    );
    registry.notify();
    Ok(PackOutcome {
        applied_to: targets,
        campaign_id: pack.campaign_id.clone(),
    })
}

/// The text prepended to the journal draft, or `None` for a blank
/// briefing. The header skips the campaign tag when the pack has none.
fn briefing_block(pack: &GmPack) -> Option<String> {
    let briefing = pack.briefing.trim();
    if briefing.is_empty() {
        return None;
    }
    let mut header_parts = vec!["GM PACK".to_string()];
    let campaign = pack.campaign_id.trim();
    if !campaign.is_empty() {
        header_parts.push(campaign.to_string());
    }
    header_parts.push(date_stamp());
    Some(format!("[{}]\n{briefing}\n\n", header_parts.join(" ")))
}
