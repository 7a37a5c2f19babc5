//! Backup export/import - the full-registry document and the
//! single-profile document.
//!
//! Imports replace wholesale (full backup replaces the entire registry,
//! profile backup replaces the active profile's data record); nothing is
//! merged. All validation happens before the first write.

use chrono::Utc;
use lorebook_domain::{normalize_profile_data, renormalize, Profile, ProfileData, ProfileId};
use serde_json::{json, Map, Value};

use crate::codec::{date_stamp, slugify, CodecError, ExportDocument};
use crate::registry::ProfileRegistry;
use crate::stores::keys;

pub const FULL_BACKUP_VERSION: u32 = 3;
pub const PROFILE_BACKUP_VERSION: u32 = 2;

/// Serialize the whole registry: every profile, every data record, and
/// the active pointer.
pub fn export_full(registry: &ProfileRegistry) -> Result<ExportDocument, CodecError> {
    let profiles = registry.profiles();
    let mut data_by_profile = Map::new();
    for profile in &profiles {
        let data = renormalize(&registry.profile_data(&profile.id));
        data_by_profile.insert(profile.id.to_string(), serde_json::to_value(&data)?);
    }

    let doc = json!({
        "v": FULL_BACKUP_VERSION,
        "exportedAt": Utc::now().to_rfc3339(),
        "activeProfileId": registry.active_id(),
        "profiles": profiles,
        "dataByProfile": data_by_profile,
    });
    Ok(ExportDocument {
        file_name: format!("lorebook-backup-{}.json", date_stamp()),
        json: serde_json::to_string_pretty(&doc)?,
    })
}

/// Replace the entire registry with the backup's contents.
///
/// Malformed profile entries are filtered out first; a backup with no
/// usable profile is rejected before anything is touched. The active
/// pointer becomes the requested id when it resolves to an imported
/// profile, else the first imported one. Notifies once at the end.
pub fn import_full(
    registry: &mut ProfileRegistry,
    profiles: &[Value],
    data_by_profile: &Map<String, Value>,
    requested_active: Option<&str>,
) -> Result<Vec<Profile>, CodecError> {
    let imported: Vec<Profile> = profiles.iter().filter_map(Profile::from_value).collect();
    if imported.is_empty() {
        return Err(CodecError::EmptyBackup);
    }

    // Drop data records of profiles that will no longer exist.
    for old in registry.profiles() {
        if !imported.iter().any(|p| p.id == old.id) {
            registry
                .storage()
                .delete(&keys::profile_data(old.id.as_str()));
        }
    }

    registry.replace_profiles(&imported);
    for profile in &imported {
        let data = data_by_profile
            .get(profile.id.as_str())
            .map(normalize_profile_data)
            .unwrap_or_default();
        registry.set_profile_data(&profile.id, &data);
    }

    let active = requested_active
        .and_then(|req| imported.iter().find(|p| p.id.as_str() == req))
        .unwrap_or(&imported[0])
        .id
        .clone();
    registry.set_active_silent(&active);

    tracing::debug!(profiles = imported.len(), "full backup imported");
    registry.notify();
    Ok(imported)
}

/// Serialize one profile: its metadata plus its data record.
pub fn export_profile(
    profile: &Profile,
    data: &ProfileData,
) -> Result<ExportDocument, CodecError> {
    let doc = json!({
        "v": PROFILE_BACKUP_VERSION,
        "exportedAt": Utc::now().to_rfc3339(),
        "profile": profile,
        "data": renormalize(data),
    });
    Ok(ExportDocument {
        file_name: format!("lorebook-{}-{}.json", slugify(&profile.name), date_stamp()),
        json: serde_json::to_string_pretty(&doc)?,
    })
}

/// Replace the active profile's data record with the backup's.
///
/// Profile metadata is refreshed only from fields that are present and
/// non-empty; everything else keeps its current value. Notifies once.
pub fn import_profile(
    registry: &mut ProfileRegistry,
    profile_meta: Option<&Value>,
    data: &Value,
) -> Result<ProfileId, CodecError> {
    let target = registry.ensure_active_profile();
    registry.set_profile_data(&target, &normalize_profile_data(data));

    if let Some(meta) = profile_meta.and_then(Value::as_object) {
        let name = meta
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let campaign = meta
            .get("campaign")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty());
        if name.is_some() || campaign.is_some() {
            // rename_profile keeps the old name when given a blank one,
            // and it already notifies
            let _ = registry.rename_profile(&target, name.unwrap_or(""), campaign);
            return Ok(target);
        }
    }

    registry.notify();
    Ok(target)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::codec::{parse_document, Document};
    use crate::stores::{MemoryStore, Storage};

    fn registry() -> ProfileRegistry {
        ProfileRegistry::new(Storage::new(Arc::new(MemoryStore::new())))
    }

    #[test]
    fn export_full_carries_every_profile_and_record() {
        let mut registry = registry();
        let first = registry.ensure_active_profile();
        let second = registry.create_profile("Vera", "ORION");
        let mut data = registry.profile_data(&second);
        data.add_item("rope").expect("added");
        registry.set_profile_data(&second, &data);

        let export = export_full(&registry).expect("exported");
        assert!(export.file_name.starts_with("lorebook-backup-"));
        assert!(export.file_name.ends_with(".json"));

        let doc: Value = serde_json::from_str(&export.json).expect("valid json");
        assert_eq!(doc["v"], FULL_BACKUP_VERSION);
        assert_eq!(doc["activeProfileId"], first.as_str());
        assert_eq!(doc["profiles"].as_array().expect("array").len(), 2);
        assert_eq!(doc["dataByProfile"][second.as_str()]["inv"][0], "rope");
    }

    #[test]
    fn import_full_rejects_backup_with_no_usable_profile() {
        let mut registry = registry();
        let before = registry.ensure_active_profile();

        let err = import_full(
            &mut registry,
            &[json!({ "name": "no id" }), json!({ "id": "  " })],
            &Map::new(),
            None,
        )
        .expect_err("rejected");
        assert!(matches!(err, CodecError::EmptyBackup));
        // prior state untouched
        assert_eq!(registry.active_id(), Some(before));
    }

    #[test]
    fn import_full_replaces_registry_and_cleans_stale_records() {
        let mut registry = registry();
        let old = registry.ensure_active_profile();

        let profiles = vec![
            json!({ "id": "p1", "name": "Vera", "campaign": "ORION" }),
            json!({ "id": "p2", "name": "Nadia" }),
        ];
        let mut data_by_profile = Map::new();
        data_by_profile.insert("p1".to_string(), json!({ "inv": ["rope"] }));

        import_full(&mut registry, &profiles, &data_by_profile, Some("p2"))
            .expect("imported");

        let names: Vec<String> = registry.profiles().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Vera", "Nadia"]);
        assert_eq!(registry.active_id().expect("active").as_str(), "p2");
        assert!(registry
            .storage()
            .get_value(&keys::profile_data(old.as_str()))
            .is_none());
        assert_eq!(
            registry.profile_data(&ProfileId::from_raw("p1")).inv,
            vec!["rope"]
        );
    }

    #[test]
    fn import_full_falls_back_to_first_profile_when_active_dangles() {
        let mut registry = registry();
        registry.ensure_active_profile();

        import_full(
            &mut registry,
            &[json!({ "id": "p1" }), json!({ "id": "p2" })],
            &Map::new(),
            Some("ghost"),
        )
        .expect("imported");
        assert_eq!(registry.active_id().expect("active").as_str(), "p1");
    }

    #[test]
    fn profile_backup_round_trips_through_the_parser() {
        let mut source = registry();
        let id = source.ensure_active_profile();
        source
            .rename_profile(&id, "Vera Oduya", Some("ORION"))
            .expect("renamed");
        let mut data = source.profile_data(&id);
        data.set_draft("field notes");
        data.add_quest("Find the relay").expect("added");
        source.set_profile_data(&id, &data);

        let profile = source.profile(&id).expect("profile");
        let export = export_profile(&profile, &source.profile_data(&id)).expect("exported");
        assert!(export.file_name.starts_with("lorebook-vera-oduya-"));

        let mut target = registry();
        match parse_document(&export.json).expect("parsed") {
            Document::ProfileBackup { profile, data } => {
                let applied =
                    import_profile(&mut target, profile.as_ref(), &data).expect("imported");
                let got = target.profile_data(&applied);
                assert_eq!(got.log_draft, "field notes");
                assert_eq!(got.quests[0].title, "Find the relay");
                let meta = target.profile(&applied).expect("profile");
                assert_eq!(meta.name, "Vera Oduya");
                assert_eq!(meta.campaign, "ORION");
            }
            other => panic!("expected profile backup, got {other:?}"),
        }
    }

    #[test]
    fn bare_data_import_keeps_profile_metadata() {
        let mut registry = registry();
        let id = registry.ensure_active_profile();
        registry
            .rename_profile(&id, "Vera", None)
            .expect("renamed");

        import_profile(&mut registry, None, &json!({ "inv": ["rope"] })).expect("imported");

        assert_eq!(registry.profile(&id).expect("profile").name, "Vera");
        assert_eq!(registry.profile_data(&id).inv, vec!["rope"]);
    }
}
