use anyhow::Context;
use serde_json::Value;
use uuid::Uuid;

use crate::engine::{Notification, Preferences};

/// A data-provider snapshot: the full notification set for the session user,
/// optionally with that user's preference record.
#[derive(Debug)]
pub struct FeedContents {
    pub notifications: Vec<Notification>,
    pub preferences: Option<Preferences>,
    pub skipped: usize,
}

/// Parse a feed document. Entries are parsed one by one: a malformed entry
/// (e.g. missing timestamp) is skipped and counted, never fatal. Entries
/// without an id get one assigned. A malformed `preferences` block IS fatal,
/// since silently dropping it could leave stale toggles in place.
pub fn parse_feed(text: &str) -> anyhow::Result<FeedContents> {
    let root: Value = serde_json::from_str(text).context("feed is not valid JSON")?;

    let entries = root
        .get("notifications")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    let mut notifications = Vec::with_capacity(entries.len());
    let mut skipped = 0usize;
    for mut entry in entries {
        backfill_id(&mut entry);
        match serde_json::from_value::<Notification>(entry) {
            Ok(n) => notifications.push(n),
            Err(_) => skipped += 1,
        }
    }

    let preferences = match root.get("preferences") {
        Some(v) if !v.is_null() => Some(
            serde_json::from_value::<Preferences>(v.clone())
                .context("feed preferences block is malformed")?
                .normalize(),
        ),
        _ => None,
    };

    Ok(FeedContents {
        notifications,
        preferences,
        skipped,
    })
}

/// Assign a fresh id to a raw notification object that has none. Records are
/// created by the data provider and normally arrive with ids; this covers
/// hand-written fixtures and ad-hoc pushes.
pub fn backfill_id(entry: &mut Value) {
    let missing = entry
        .get("id")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().is_empty())
        .unwrap_or(true);
    if missing {
        if let Some(obj) = entry.as_object_mut() {
            obj.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        }
    }
}
