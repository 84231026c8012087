use crate::engine::{self, ActiveFilter, CurrentUser, Notification};
use crate::feed;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn require_session(state: &AppState, req: &Request) -> Result<CurrentUser, serde_json::Value> {
    match state.session.clone() {
        Some(user) => Ok(user),
        None => Err(err(&req.id, "no_session", "open a session first", None)),
    }
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let user = match require_session(state, req) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    let filter_raw = req
        .params
        .get("filter")
        .and_then(|v| v.as_str())
        .unwrap_or("All");
    let filter = ActiveFilter::parse(filter_raw);

    let visible = engine::resolve_visible(&state.notifications, &user, &state.preferences, &filter);
    let items: Vec<serde_json::Value> = visible
        .iter()
        .map(|n| serde_json::to_value(n).unwrap_or_else(|_| json!({})))
        .collect();
    let unread = engine::unread_count(&state.notifications, &user, &state.preferences);

    ok(&req.id, json!({ "items": items, "unreadCount": unread }))
}

fn handle_unread_count(state: &mut AppState, req: &Request) -> serde_json::Value {
    let user = match require_session(state, req) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    let unread = engine::unread_count(&state.notifications, &user, &state.preferences);
    ok(&req.id, json!({ "unreadCount": unread }))
}

fn handle_mark_read(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(id) = req.params.get("id").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing params.id", None);
    };
    // Unknown id or already-read record: no-op, not an error.
    let changed = engine::mark_read(&mut state.notifications, id);
    ok(&req.id, json!({ "changed": changed }))
}

fn handle_mark_all_read(state: &mut AppState, req: &Request) -> serde_json::Value {
    let user = match require_session(state, req) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    let marked = engine::mark_all_read(&mut state.notifications, &user, &state.preferences);
    ok(&req.id, json!({ "marked": marked }))
}

fn handle_load(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(entries) = req.params.get("notifications").and_then(|v| v.as_array()) else {
        return err(&req.id, "bad_params", "missing params.notifications", None);
    };

    let mut incoming = Vec::with_capacity(entries.len());
    let mut skipped = 0usize;
    for entry in entries {
        let mut entry = entry.clone();
        feed::backfill_id(&mut entry);
        match serde_json::from_value::<Notification>(entry) {
            Ok(n) => incoming.push(n),
            Err(_) => skipped += 1,
        }
    }

    let loaded = incoming.len();
    state.notifications = incoming;
    ok(&req.id, json!({ "loaded": loaded, "skipped": skipped }))
}

fn handle_push(state: &mut AppState, req: &Request) -> serde_json::Value {
    if !req.params.is_object() {
        return err(
            &req.id,
            "bad_params",
            "params must be a notification object",
            None,
        );
    }
    let mut entry = req.params.clone();
    feed::backfill_id(&mut entry);
    let incoming: Notification = match serde_json::from_value(entry) {
        Ok(n) => n,
        Err(e) => {
            return err(
                &req.id,
                "bad_params",
                format!("invalid notification: {}", e),
                None,
            );
        }
    };

    let id = incoming.id.clone();
    match state.notifications.iter_mut().find(|n| n.id == id) {
        Some(slot) => *slot = incoming,
        None => state.notifications.push(incoming),
    }
    ok(&req.id, json!({ "id": id }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "notifications.list" => Some(handle_list(state, req)),
        "notifications.unreadCount" => Some(handle_unread_count(state, req)),
        "notifications.markRead" => Some(handle_mark_read(state, req)),
        "notifications.markAllRead" => Some(handle_mark_all_read(state, req)),
        "notifications.load" => Some(handle_load(state, req)),
        "notifications.push" => Some(handle_push(state, req)),
        _ => None,
    }
}
