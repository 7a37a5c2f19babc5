//! Quest merge - reconciles an incoming GM quest list against a player's
//! existing quest log.
//!
//! Field-level precedence, keyed by stable id:
//! - player state wins for mutable progress fields (status, notes,
//!   objective done flags);
//! - GM content wins for structural fields (title, objective text, new
//!   quests and objectives).
//!
//! Re-applying the same pack therefore never resets completed work.
//! Ordering is insertion order of the merge: incoming-derived entries
//! first, then unmatched existing entries. No sorting happens here;
//! display order is a view concern.
//!
//! Both lists are expected to be normalized (see [`crate::normalize`]);
//! callers pull incoming quests through `normalize_quest` before merging.

use std::collections::{HashMap, HashSet};

use crate::entities::{Objective, Quest};

/// Merge an incoming quest list into an existing one.
pub fn merge_quests(existing: &[Quest], incoming: &[Quest]) -> Vec<Quest> {
    let by_id: HashMap<&str, &Quest> = existing
        .iter()
        .filter(|q| !q.id.is_empty())
        .map(|q| (q.id.as_str(), q))
        .collect();

    let mut merged: Vec<Quest> = Vec::with_capacity(existing.len() + incoming.len());

    for inc in incoming {
        match by_id.get(inc.id.as_str()) {
            Some(cur) => merged.push(merge_matched_quest(cur, inc)),
            None => merged.push(inc.clone()),
        }
    }

    let taken: HashSet<String> = merged.iter().map(|q| q.id.as_str().to_owned()).collect();
    for cur in existing {
        if !taken.contains(cur.id.as_str()) {
            merged.push(cur.clone());
        }
    }

    merged
}

/// Merge an incoming objective list into an existing one. Incoming
/// objectives lead; matched ones keep the player's done flag, unmatched
/// existing ones are appended last.
pub fn merge_objectives(existing: &[Objective], incoming: &[Objective]) -> Vec<Objective> {
    let by_id: HashMap<&str, &Objective> = existing
        .iter()
        .filter(|o| !o.id.is_empty())
        .map(|o| (o.id.as_str(), o))
        .collect();

    let mut merged: Vec<Objective> = Vec::with_capacity(existing.len() + incoming.len());

    for inc in incoming {
        match by_id.get(inc.id.as_str()) {
            Some(cur) => merged.push(Objective {
                id: inc.id.clone(),
                // GM text refreshes the line when provided
                text: if inc.text.is_empty() {
                    cur.text.clone()
                } else {
                    inc.text.clone()
                },
                // player progress wins
                done: cur.done,
            }),
            None => merged.push(inc.clone()),
        }
    }

    let taken: HashSet<String> = merged.iter().map(|o| o.id.as_str().to_owned()).collect();
    for cur in existing {
        if !taken.contains(cur.id.as_str()) {
            merged.push(cur.clone());
        }
    }

    merged
}

fn merge_matched_quest(cur: &Quest, inc: &Quest) -> Quest {
    // Union of GM metadata; existing keys take precedence so locally
    // annotated values survive a pack re-apply.
    let mut mj = inc.mj.clone();
    for (key, value) in &cur.mj {
        mj.insert(key.clone(), value.clone());
    }

    Quest {
        id: inc.id.clone(),
        title: if inc.title.is_empty() {
            cur.title.clone()
        } else {
            inc.title.clone()
        },
        status: cur.status,
        notes: if cur.notes.trim().is_empty() {
            inc.notes.clone()
        } else {
            cur.notes.clone()
        },
        objectives: merge_objectives(&cur.objectives, &inc.objectives),
        mj,
    }
}
