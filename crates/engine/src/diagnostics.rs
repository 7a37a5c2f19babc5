//! Plain-text diagnostic summary for support flows. One screen, safe to
//! paste: no journal text, no inventory, just identity and tallies.

use crate::registry::ProfileRegistry;

/// Build the copy-to-clipboard diagnostic block for the active profile.
pub fn diagnostic_summary(registry: &mut ProfileRegistry) -> String {
    let id = registry.ensure_active_profile();
    let data = registry.profile_data(&id);
    let counts = data.quest_counts();

    let (name, campaign) = registry
        .profile(&id)
        .map(|p| (p.name, p.campaign))
        .unwrap_or_default();
    let campaign = if campaign.is_empty() {
        "(none)".to_string()
    } else {
        campaign
    };

    format!(
        "Lorebook v{version}\n\
         Profile: {name} ({id})\n\
         Campaign: {campaign}\n\
         HP {hp}/{hp_max} | SAN {san}/{san_max}\n\
         Quests: {ip} in progress, {done} done, {failed} failed\n",
        version = env!("CARGO_PKG_VERSION"),
        id = id.as_str(),
        hp = data.sheet.hp,
        hp_max = data.sheet.hp_max,
        san = data.sheet.san,
        san_max = data.sheet.san_max,
        ip = counts.in_progress,
        done = counts.done,
        failed = counts.failed,
    )
}
