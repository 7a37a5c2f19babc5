//! GM pack application end to end: parse, target, merge, briefing.

use std::sync::Arc;

use lorebook_domain::QuestStatus;
use lorebook_engine::{
    apply_pack, parse_document, Document, MemoryStore, PackTarget, ProfileRegistry, Storage,
};
use serde_json::json;

fn registry() -> ProfileRegistry {
    ProfileRegistry::new(Storage::new(Arc::new(MemoryStore::new())))
}

fn parse_pack(text: &str) -> lorebook_engine::GmPack {
    match parse_document(text).expect("parsed") {
        Document::GmPack(pack) => pack,
        other => panic!("expected gm pack, got {other:?}"),
    }
}

#[test]
fn reapplied_pack_updates_structure_but_keeps_player_progress() {
    let mut registry = registry();
    let id = registry.ensure_active_profile();

    // player state: quest completed, objective ticked
    let mut data = registry.profile_data(&id);
    data.quests = vec![lorebook_domain::normalize_quest(&json!({
        "id": "q1",
        "title": "Find the relay",
        "status": "DONE",
        "objectives": [{ "id": "o1", "text": "Reach the hub", "done": true }]
    }))];
    registry.set_profile_data(&id, &data);

    let pack = parse_pack(
        &json!({
            "kind": "pack_mj",
            "v": 3,
            "campaignId": "",
            "briefing": "",
            "quests": [{
                "id": "q1",
                "title": "Find the relay (updated)",
                "status": "IN_PROGRESS",
                "objectives": [
                    { "id": "o1", "text": "Reach the comms hub", "done": false },
                    { "id": "o2", "text": "Report back", "done": false }
                ]
            }]
        })
        .to_string(),
    );
    apply_pack(&mut registry, &pack, PackTarget::Active).expect("applied");

    let quests = registry.profile_data(&id).quests;
    assert_eq!(quests.len(), 1);
    let merged = &quests[0];
    assert_eq!(merged.id.as_str(), "q1");
    assert_eq!(merged.title, "Find the relay (updated)");
    assert_eq!(merged.status, QuestStatus::Done);
    assert_eq!(merged.objectives.len(), 2);
    assert_eq!(merged.objectives[0].id.as_str(), "o1");
    assert_eq!(merged.objectives[0].text, "Reach the comms hub");
    assert!(merged.objectives[0].done);
    assert_eq!(merged.objectives[1].id.as_str(), "o2");
    assert_eq!(merged.objectives[1].text, "Report back");
    assert!(!merged.objectives[1].done);
}

#[test]
fn new_quests_are_adopted_and_unmatched_existing_kept_last() {
    let mut registry = registry();
    let id = registry.ensure_active_profile();

    let mut data = registry.profile_data(&id);
    data.add_quest("Player-made quest").expect("added");
    registry.set_profile_data(&id, &data);

    let pack = parse_pack(
        &json!({
            "kind": "pack_mj",
            "quests": [{ "id": "gm1", "title": "GM quest" }]
        })
        .to_string(),
    );
    apply_pack(&mut registry, &pack, PackTarget::Active).expect("applied");

    let quests = registry.profile_data(&id).quests;
    assert_eq!(quests.len(), 2);
    assert_eq!(quests[0].title, "GM quest");
    assert_eq!(quests[1].title, "Player-made quest");
}

#[test]
fn campaign_scoped_pack_touches_only_matching_profiles() {
    let mut registry = registry();
    let default = registry.ensure_active_profile();
    let orion_a = registry.create_profile("Vera", "ORION");
    let orion_b = registry.create_profile("Nadia", "ORION");

    let pack = parse_pack(
        &json!({
            "kind": "pack_mj",
            "campaignId": "ORION",
            "briefing": "Rendezvous at dawn.",
            "quests": [{ "id": "q1", "title": "Shared objective" }]
        })
        .to_string(),
    );
    let outcome = apply_pack(&mut registry, &pack, PackTarget::Campaign).expect("applied");

    assert_eq!(outcome.applied_to, vec![orion_a.clone(), orion_b.clone()]);
    assert_eq!(outcome.campaign_id, "ORION");
    for id in [&orion_a, &orion_b] {
        let data = registry.profile_data(id);
        assert_eq!(data.quests[0].title, "Shared objective");
        assert!(data.log_draft.starts_with("[GM PACK ORION "));
        assert!(data.log_draft.contains("Rendezvous at dawn.\n\n"));
    }

    let untouched = registry.profile_data(&default);
    assert!(untouched.quests.is_empty());
    assert_eq!(untouched.log_draft, "");
}

#[test]
fn failed_target_selection_leaves_every_profile_untouched() {
    let mut registry = registry();
    let id = registry.ensure_active_profile();
    let mut data = registry.profile_data(&id);
    data.add_quest("Existing").expect("added");
    registry.set_profile_data(&id, &data);
    let before = registry.profile_data(&id);

    let pack = parse_pack(
        &json!({
            "kind": "pack_mj",
            "campaignId": "NOBODY-HOME",
            "quests": [{ "id": "q1", "title": "Never applied" }]
        })
        .to_string(),
    );
    apply_pack(&mut registry, &pack, PackTarget::Campaign).expect_err("no matching profiles");

    assert_eq!(registry.profile_data(&id), before);
}

#[test]
fn legacy_status_tokens_in_packs_are_normalized() {
    let mut registry = registry();
    let id = registry.ensure_active_profile();

    let pack = parse_pack(
        &json!({
            "kind": "pack_mj",
            "quests": [
                { "id": "q1", "title": "Old done", "status": "OK" },
                { "id": "q2", "title": "Old failed", "status": "RATEE" },
                { "id": "q3", "title": "Old running", "status": "EN_COURS" }
            ]
        })
        .to_string(),
    );
    apply_pack(&mut registry, &pack, PackTarget::Active).expect("applied");

    let quests = registry.profile_data(&id).quests;
    assert_eq!(quests[0].status, QuestStatus::Done);
    assert_eq!(quests[1].status, QuestStatus::Failed);
    assert_eq!(quests[2].status, QuestStatus::InProgress);
}
