//! Profile enrichment for subject-reference collections
// src/enrich.rs
use crate::constants;
use crate::error::Result;
use crate::records::Profile;
use crate::session::Session;
use crate::store::RecordStore;
use chrono::{DateTime, Utc};
use log::debug;
use std::collections::HashMap;

/// Whether records of `collection` get profile enrichment in this session.
/// Only the repository owner sees subject status, and only for collections
/// whose records point at an actor.
pub fn is_enrichable(session: &Session, collection: &str) -> bool {
    session.is_owner() && constants::SUBJECT_COLLECTIONS.contains(&collection)
}

/// Annotate the records appended at `start..` with subject status notes.
/// Runs once per fetched page and never touches earlier pages.
pub async fn enrich_page(session: &Session, store: &mut RecordStore, start: usize) -> Result<()> {
    let subjects: Vec<String> = store.records()[start..]
        .iter()
        .filter_map(|r| r.subject().map(str::to_string))
        .collect();
    if subjects.is_empty() {
        return Ok(());
    }

    let profiles = fetch_profiles(session, &subjects).await?;
    debug!(
        "enrichment: {} subjects, {} profiles returned",
        subjects.len(),
        profiles.len()
    );
    let notes = subject_notes(&subjects, &profiles, Utc::now());
    store.apply_notes(start, &notes);
    Ok(())
}

/// Fetch profiles in allow-listed batch sizes and concatenate the results
async fn fetch_profiles(session: &Session, subjects: &[String]) -> Result<Vec<Profile>> {
    let mut profiles = Vec::with_capacity(subjects.len());
    for group in subjects.chunks(constants::PROFILE_BATCH_SIZE) {
        profiles.extend(session.get_profiles(group).await?);
    }
    Ok(profiles)
}

/// Build the note string for every subject of a page.
///
/// Per subject: moderation label values verbatim, then an activity tag,
/// then blocked/muted viewer state. Subjects with no returned profile are
/// tagged "missing" (deleted or taken down).
fn subject_notes(
    subjects: &[String],
    profiles: &[Profile],
    now: DateTime<Utc>,
) -> HashMap<String, String> {
    let by_did: HashMap<&str, &Profile> = profiles.iter().map(|p| (p.did.as_str(), p)).collect();

    let mut notes = HashMap::new();
    for subject in subjects {
        let mut parts: Vec<String> = Vec::new();
        match by_did.get(subject.as_str()) {
            Some(profile) => {
                parts.extend(profile.labels.iter().map(|l| l.val.clone()));
                parts.push(activity_note(now, latest_activity(profile)).to_string());
                if profile.viewer.blocked_by {
                    parts.push("blocked".to_string());
                }
                if profile.viewer.muted {
                    parts.push("muted".to_string());
                }
            }
            None => parts.push("missing".to_string()),
        }
        notes.insert(subject.clone(), parts.join(","));
    }
    notes
}

/// Latest of the profile's creation time and all label application times
fn latest_activity(profile: &Profile) -> DateTime<Utc> {
    let mut latest = profile
        .created_at
        .as_deref()
        .and_then(parse_time)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    for label in &profile.labels {
        if let Some(cts) = parse_time(&label.cts) {
            latest = latest.max(cts);
        }
    }
    latest
}

fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Staleness tag for a profile's most recent activity: over 30 days →
/// "30d-deactive", over 7 days → "7d-deactive", otherwise "active"
pub fn activity_note(now: DateTime<Utc>, last_active: DateTime<Utc>) -> &'static str {
    let elapsed_ms = now.signed_duration_since(last_active).num_milliseconds();
    if elapsed_ms > constants::THIRTY_DAYS_MS {
        "30d-deactive"
    } else if elapsed_ms > constants::SEVEN_DAYS_MS {
        "7d-deactive"
    } else {
        "active"
    }
}
