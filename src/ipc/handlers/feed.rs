use crate::feed;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn handle_import(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(path) = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
    else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    let text = match std::fs::read_to_string(&path) {
        Ok(t) => t,
        Err(e) => {
            return err(
                &req.id,
                "feed_read_failed",
                format!("{}: {}", path.to_string_lossy(), e),
                None,
            );
        }
    };

    match feed::parse_feed(&text) {
        Ok(contents) => {
            let loaded = contents.notifications.len();
            let preferences_applied = contents.preferences.is_some();
            state.notifications = contents.notifications;
            if let Some(prefs) = contents.preferences {
                state.preferences = prefs;
            }
            ok(
                &req.id,
                json!({
                    "loaded": loaded,
                    "skipped": contents.skipped,
                    "preferencesApplied": preferences_applied
                }),
            )
        }
        Err(e) => err(&req.id, "feed_parse_failed", format!("{e:#}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "feed.import" => Some(handle_import(state, req)),
        _ => None,
    }
}
