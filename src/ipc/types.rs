use serde::Deserialize;

use crate::engine::{CurrentUser, Notification, Preferences};

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub session: Option<CurrentUser>,
    pub notifications: Vec<Notification>,
    pub preferences: Preferences,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            session: None,
            notifications: Vec::new(),
            preferences: Preferences::default(),
        }
    }
}
