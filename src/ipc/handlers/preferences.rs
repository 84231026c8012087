use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    match serde_json::to_value(&state.preferences) {
        Ok(v) => ok(&req.id, v),
        Err(e) => err(&req.id, "internal", e.to_string(), None),
    }
}

fn handle_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    if !req.params.is_object() {
        return err(&req.id, "bad_params", "params must be an object", None);
    }

    let mut prefs = state.preferences.clone();
    if let Some(v) = req.params.get("assignmentReminders").and_then(|v| v.as_bool()) {
        prefs.assignment_reminders = v;
    }
    if let Some(v) = req.params.get("generalAlerts").and_then(|v| v.as_bool()) {
        prefs.general_alerts = v;
    }
    // Mandatory keys in params are ignored; normalize keeps them on.
    state.preferences = prefs.normalize();

    match serde_json::to_value(&state.preferences) {
        Ok(v) => ok(&req.id, v),
        Err(e) => err(&req.id, "internal", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "preferences.get" => Some(handle_get(state, req)),
        "preferences.set" => Some(handle_set(state, req)),
        _ => None,
    }
}
