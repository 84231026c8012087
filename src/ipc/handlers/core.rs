use crate::engine::{CurrentUser, Role};
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "sessionUserId": state.session.as_ref().map(|u| u.id.clone()),
            "notificationCount": state.notifications.len()
        }),
    )
}

fn handle_session_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(user_id) = req.params.get("userId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing params.userId", None);
    };
    let Some(role_raw) = req.params.get("role").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing params.role", None);
    };
    let role: Role = match serde_json::from_value(json!(role_raw)) {
        Ok(r) => r,
        Err(_) => {
            return err(
                &req.id,
                "bad_params",
                format!("unknown role: {}", role_raw),
                None,
            );
        }
    };

    state.session = Some(CurrentUser {
        id: user_id.to_string(),
        role,
    });
    ok(&req.id, json!({ "userId": user_id, "role": role_raw }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "session.open" => Some(handle_session_open(state, req)),
        _ => None,
    }
}
