//! End-to-end tour: file-backed store, two profiles, a GM pack, and the
//! diagnostic summary.
//!
//! Run with `cargo run -p lorebook-engine --example tour`.

use std::sync::Arc;

use lorebook_engine::{
    apply_pack, diagnostic_summary, export_full, parse_document, Document, FileStore, PackTarget,
    ProfileRegistry, Storage,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lorebook_engine=debug,lorebook_domain=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let dir = tempfile::tempdir()?;
    let store = FileStore::open(dir.path().join("lorebook.json"))?;
    let mut registry = ProfileRegistry::new(Storage::new(Arc::new(store)));

    registry.subscribe(Box::new(|| tracing::info!("profiles changed")));

    // First run synthesizes a profile; give it a real identity.
    let hero = registry.ensure_active_profile();
    registry.rename_profile(&hero, "Vera Oduya", Some("ORION"))?;
    registry.create_profile("Backup Character", "");

    // Play a little.
    let mut data = registry.profile_data(&hero);
    data.set_draft("Met the informant at the docks.");
    data.archive_draft(chrono::Utc::now().timestamp_millis());
    data.add_item("Geiger counter")?;
    let quest = data.add_quest("Find the relay")?;
    if let Some(q) = data.quest_mut(&quest) {
        q.add_objective("Reach the comms hub")?;
    }
    registry.set_profile_data(&hero, &data);

    // The GM sends a pack for the ORION campaign.
    let pack_text = serde_json::json!({
        "kind": "pack_mj",
        "v": 3,
        "campaignId": "ORION",
        "briefing": "The relay went dark an hour ago. Move.",
        "quests": [{
            "id": "q-relay",
            "title": "Restore the relay",
            "objectives": [{ "id": "o-power", "text": "Re-route power", "done": false }]
        }]
    })
    .to_string();
    let pack = match parse_document(&pack_text)? {
        Document::GmPack(pack) => pack,
        other => anyhow::bail!("expected a GM pack, got {other:?}"),
    };
    let outcome = apply_pack(&mut registry, &pack, PackTarget::Campaign)?;
    tracing::info!(profiles = outcome.applied_to.len(), "pack applied");

    let export = export_full(&registry)?;
    tracing::info!(file = %export.file_name, bytes = export.json.len(), "backup ready");

    println!("{}", diagnostic_summary(&mut registry));
    Ok(())
}
