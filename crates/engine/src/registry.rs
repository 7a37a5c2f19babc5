//! Profile registry - the list of profiles, the active pointer, and the
//! per-profile data records, all persisted through [`Storage`].
//!
//! Mutations broadcast a "profiles changed" signal to subscribed listeners
//! synchronously, on the caller's stack, in registration order. Writing a
//! profile's data record does NOT broadcast; callers that edit data refresh
//! their own view.

use lorebook_domain::{
    normalize_profile_data, renormalize, Profile, ProfileData, ProfileId, FALLBACK_PROFILE_NAME,
};
use serde_json::Value;
use thiserror::Error;

use crate::stores::{keys, Storage};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("cannot delete the last remaining profile")]
    LastProfile,

    #[error("unknown profile: {0}")]
    UnknownProfile(ProfileId),
}

/// Handle returned by [`ProfileRegistry::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn Fn() + Send + Sync>;

/// Registry of profiles backed by a key-value namespace.
pub struct ProfileRegistry {
    storage: Storage,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl ProfileRegistry {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub(crate) fn storage(&self) -> &Storage {
        &self.storage
    }

    // ── Profile list ─────────────────────────────────────────────────────

    /// All registered profiles, in storage order. Entries without a usable
    /// id are dropped silently.
    pub fn profiles(&self) -> Vec<Profile> {
        self.storage
            .get_value(keys::PROFILES)
            .and_then(|v| v.as_array().cloned())
            .map(|entries| entries.iter().filter_map(Profile::from_value).collect())
            .unwrap_or_default()
    }

    pub fn profile(&self, id: &ProfileId) -> Option<Profile> {
        self.profiles().into_iter().find(|p| &p.id == id)
    }

    fn write_profiles(&self, profiles: &[Profile]) -> bool {
        self.storage.set(keys::PROFILES, &profiles)
    }

    /// Replace the whole profile list without notifying. The codec uses
    /// this during full-backup import and notifies once at the end.
    pub(crate) fn replace_profiles(&self, profiles: &[Profile]) -> bool {
        self.write_profiles(profiles)
    }

    // ── Active pointer ───────────────────────────────────────────────────

    /// The active profile id as stored, without checking that it resolves.
    pub fn active_id(&self) -> Option<ProfileId> {
        let raw = self.storage.get_value(keys::ACTIVE_PROFILE)?;
        let id = raw.as_str()?.trim();
        (!id.is_empty()).then(|| ProfileId::from_raw(id))
    }

    pub fn set_active(&mut self, id: &ProfileId) {
        self.storage.set(keys::ACTIVE_PROFILE, &id.as_str());
        self.notify();
    }

    pub(crate) fn set_active_silent(&self, id: &ProfileId) {
        self.storage.set(keys::ACTIVE_PROFILE, &id.as_str());
    }

    /// Make the registry usable: guarantee at least one profile exists and
    /// the active pointer resolves to one of them. Idempotent; notifies
    /// only when it repaired something.
    ///
    /// On a completely empty registry this also migrates the pre-profiles
    /// records (a bare draft string and inventory array) into the
    /// synthesized first profile.
    pub fn ensure_active_profile(&mut self) -> ProfileId {
        let mut profiles = self.profiles();

        if profiles.is_empty() {
            let profile = Profile::new("P1", "");
            let id = profile.id.clone();
            let data = self.migrate_legacy_records();
            profiles.push(profile);
            self.write_profiles(&profiles);
            self.storage
                .set(&keys::profile_data(id.as_str()), &renormalize(&data));
            self.set_active_silent(&id);
            self.notify();
            return id;
        }

        match self.active_id() {
            Some(active) if profiles.iter().any(|p| p.id == active) => active,
            _ => {
                // Unset or dangling pointer: rebind to the first profile.
                let first = profiles[0].id.clone();
                self.set_active_silent(&first);
                self.notify();
                first
            }
        }
    }

    /// Pull the single-profile schema's records into a fresh data record.
    fn migrate_legacy_records(&self) -> ProfileData {
        let mut data = ProfileData::default();

        if let Some(Value::String(draft)) = self.storage.get_value(keys::LEGACY_DRAFT) {
            data.log_draft = draft;
        }
        if let Some(Value::Array(items)) = self.storage.get_value(keys::LEGACY_INVENTORY) {
            data.inv = items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
        }

        if !data.log_draft.is_empty() || !data.inv.is_empty() {
            tracing::debug!(
                inv_items = data.inv.len(),
                "migrated legacy records into first profile"
            );
        }
        self.storage.delete(keys::LEGACY_DRAFT);
        self.storage.delete(keys::LEGACY_INVENTORY);
        data
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    /// Register a new profile with a fresh default data record. Does not
    /// change the active pointer.
    pub fn create_profile(&mut self, name: &str, campaign: &str) -> ProfileId {
        let name = name.trim();
        let name = if name.is_empty() {
            FALLBACK_PROFILE_NAME
        } else {
            name
        };
        let profile = Profile::new(name, campaign.trim());
        let id = profile.id.clone();

        let mut profiles = self.profiles();
        profiles.push(profile);
        self.write_profiles(&profiles);
        self.storage.set(
            &keys::profile_data(id.as_str()),
            &renormalize(&ProfileData::default()),
        );
        self.notify();
        id
    }

    /// Update a profile's name and, when given, its campaign tag. An empty
    /// name keeps the old one; `Some("")` clears the campaign.
    pub fn rename_profile(
        &mut self,
        id: &ProfileId,
        name: &str,
        campaign: Option<&str>,
    ) -> Result<(), RegistryError> {
        let mut profiles = self.profiles();
        let profile = profiles
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| RegistryError::UnknownProfile(id.clone()))?;

        let name = name.trim();
        if !name.is_empty() {
            profile.name = name.to_string();
        }
        if let Some(campaign) = campaign {
            profile.campaign = campaign.trim().to_string();
        }

        self.write_profiles(&profiles);
        self.notify();
        Ok(())
    }

    /// Delete a profile and its data record. The last remaining profile
    /// cannot be deleted; deleting the active profile re-activates the
    /// first remaining one.
    pub fn delete_profile(&mut self, id: &ProfileId) -> Result<(), RegistryError> {
        let mut profiles = self.profiles();
        if profiles.len() <= 1 {
            return Err(RegistryError::LastProfile);
        }
        let before = profiles.len();
        profiles.retain(|p| &p.id != id);
        if profiles.len() == before {
            return Err(RegistryError::UnknownProfile(id.clone()));
        }

        self.write_profiles(&profiles);
        self.storage.delete(&keys::profile_data(id.as_str()));

        let active_gone = self.active_id().map(|a| &a == id).unwrap_or(true);
        if active_gone {
            self.set_active_silent(&profiles[0].id);
        }
        self.notify();
        Ok(())
    }

    // ── Data records ─────────────────────────────────────────────────────

    /// The profile's data record, normalized. A missing or corrupt record
    /// yields the default record, never an error.
    pub fn profile_data(&self, id: &ProfileId) -> ProfileData {
        match self.storage.get_value(&keys::profile_data(id.as_str())) {
            Some(raw) => normalize_profile_data(&raw),
            None => ProfileData::default(),
        }
    }

    /// Re-normalize and persist a data record. Returns false when the
    /// write failed. Does not notify.
    pub fn set_profile_data(&self, id: &ProfileId, data: &ProfileData) -> bool {
        self.storage
            .set(&keys::profile_data(id.as_str()), &renormalize(data))
    }

    // ── Change notification ──────────────────────────────────────────────

    /// Register a listener invoked after every registry mutation. Delivery
    /// is synchronous, on the mutating call's stack, in registration order.
    pub fn subscribe(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener. Returns false when the id is unknown.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() < before
    }

    pub(crate) fn notify(&self) {
        for (_, listener) in &self.listeners {
            listener();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::stores::MemoryStore;

    fn registry() -> ProfileRegistry {
        ProfileRegistry::new(Storage::new(Arc::new(MemoryStore::new())))
    }

    #[test]
    fn ensure_active_synthesizes_first_profile() {
        let mut registry = registry();
        let id = registry.ensure_active_profile();

        let profiles = registry.profiles();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].name, "P1");
        assert_eq!(registry.active_id(), Some(id.clone()));

        // idempotent
        assert_eq!(registry.ensure_active_profile(), id);
        assert_eq!(registry.profiles().len(), 1);
    }

    #[test]
    fn ensure_active_migrates_legacy_records() {
        let store = Arc::new(MemoryStore::new());
        let storage = Storage::new(store);
        storage.set(keys::LEGACY_DRAFT, &"old draft");
        storage.set(keys::LEGACY_INVENTORY, &vec!["rope", "geiger counter"]);

        let mut registry = ProfileRegistry::new(storage.clone());
        let id = registry.ensure_active_profile();

        let data = registry.profile_data(&id);
        assert_eq!(data.log_draft, "old draft");
        assert_eq!(data.inv, vec!["rope", "geiger counter"]);
        assert!(storage.get_value(keys::LEGACY_DRAFT).is_none());
        assert!(storage.get_value(keys::LEGACY_INVENTORY).is_none());
    }

    #[test]
    fn ensure_active_rebinds_dangling_pointer() {
        let mut registry = registry();
        let id = registry.ensure_active_profile();
        registry
            .storage
            .set(keys::ACTIVE_PROFILE, &"no-such-profile");

        assert_eq!(registry.ensure_active_profile(), id);
        assert_eq!(registry.active_id(), Some(id));
    }

    #[test]
    fn create_does_not_steal_active() {
        let mut registry = registry();
        let first = registry.ensure_active_profile();
        let second = registry.create_profile("Vera", "ORION");

        assert_eq!(registry.active_id(), Some(first));
        let profile = registry.profile(&second).expect("created");
        assert_eq!(profile.name, "Vera");
        assert_eq!(profile.campaign, "ORION");
        // data record exists from the start
        assert_eq!(registry.profile_data(&second), ProfileData::default());
    }

    #[test]
    fn create_with_blank_name_uses_fallback() {
        let mut registry = registry();
        let id = registry.create_profile("   ", "");
        assert_eq!(
            registry.profile(&id).expect("created").name,
            FALLBACK_PROFILE_NAME
        );
    }

    #[test]
    fn rename_keeps_old_name_when_blank() {
        let mut registry = registry();
        let id = registry.create_profile("Vera", "ORION");

        registry.rename_profile(&id, "  ", None).expect("renamed");
        assert_eq!(registry.profile(&id).expect("profile").name, "Vera");

        registry
            .rename_profile(&id, "Nadia", Some(""))
            .expect("renamed");
        let profile = registry.profile(&id).expect("profile");
        assert_eq!(profile.name, "Nadia");
        assert_eq!(profile.campaign, "");

        let ghost = ProfileId::from_raw("ghost");
        assert_eq!(
            registry.rename_profile(&ghost, "X", None),
            Err(RegistryError::UnknownProfile(ghost))
        );
    }

    #[test]
    fn last_profile_cannot_be_deleted() {
        let mut registry = registry();
        let id = registry.ensure_active_profile();
        assert_eq!(
            registry.delete_profile(&id),
            Err(RegistryError::LastProfile)
        );
        assert_eq!(registry.profiles().len(), 1);
    }

    #[test]
    fn deleting_active_rebinds_to_first_remaining() {
        let mut registry = registry();
        let first = registry.ensure_active_profile();
        let second = registry.create_profile("Vera", "");
        registry.set_active(&second);

        registry.delete_profile(&second).expect("deleted");

        assert_eq!(registry.active_id(), Some(first));
        assert_eq!(registry.profiles().len(), 1);
        // data record gone
        assert!(registry
            .storage
            .get_value(&keys::profile_data(second.as_str()))
            .is_none());
    }

    #[test]
    fn listeners_fire_in_registration_order() {
        use std::sync::Mutex;

        let order = Arc::new(Mutex::new(Vec::new()));
        let mut registry = registry();

        let o1 = Arc::clone(&order);
        let first = registry.subscribe(Box::new(move || {
            if let Ok(mut v) = o1.lock() {
                v.push("a");
            }
        }));
        let o2 = Arc::clone(&order);
        registry.subscribe(Box::new(move || {
            if let Ok(mut v) = o2.lock() {
                v.push("b");
            }
        }));

        registry.create_profile("Vera", "");
        assert_eq!(*order.lock().expect("order"), vec!["a", "b"]);

        assert!(registry.unsubscribe(first));
        assert!(!registry.unsubscribe(first));
        registry.create_profile("Nadia", "");
        assert_eq!(*order.lock().expect("order"), vec!["a", "b", "b"]);
    }

    #[test]
    fn set_profile_data_does_not_notify() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let hits = Arc::new(AtomicUsize::new(0));
        let mut registry = registry();
        let id = registry.ensure_active_profile();

        let h = Arc::clone(&hits);
        registry.subscribe(Box::new(move || {
            h.fetch_add(1, Ordering::SeqCst);
        }));

        let mut data = registry.profile_data(&id);
        data.set_draft("quiet write");
        assert!(registry.set_profile_data(&id, &data));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn profile_data_normalizes_on_read() {
        let mut registry = registry();
        let id = registry.ensure_active_profile();

        // hand-write a loose record straight into storage
        registry.storage.set(
            &keys::profile_data(id.as_str()),
            &serde_json::json!({ "sheet": { "hp": 9999, "hpMax": 20 }, "log": "draft text" }),
        );

        let data = registry.profile_data(&id);
        assert_eq!(data.sheet.hp, 20);
        assert_eq!(data.log_draft, "draft text");
    }
}
