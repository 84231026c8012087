use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recipient id sentinel: "every user in this scope", as opposed to a
/// specific user id.
pub const BROADCAST_RECIPIENT: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Attendance,
    Marks,
    Assignment,
    Announcement,
    General,
    /// Anything the sidecar does not recognize. Keeps the raw text so the
    /// record round-trips; never matched by category-specific checks.
    Unknown(String),
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        match s.as_str() {
            "attendance" => Category::Attendance,
            "marks" => Category::Marks,
            "assignment" => Category::Assignment,
            "announcement" => Category::Announcement,
            "general" => Category::General,
            _ => Category::Unknown(s),
        }
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        match c {
            Category::Attendance => "attendance".to_string(),
            Category::Marks => "marks".to_string(),
            Category::Assignment => "assignment".to_string(),
            Category::Announcement => "announcement".to_string(),
            Category::General => "general".to_string(),
            Category::Unknown(raw) => raw,
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Unknown(String::new())
    }
}

/// Audience tag carried by `recipientRole`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Audience {
    Student,
    Faculty,
    All,
    Unknown(String),
}

impl From<String> for Audience {
    fn from(s: String) -> Self {
        match s.as_str() {
            "student" => Audience::Student,
            "faculty" => Audience::Faculty,
            "all" => Audience::All,
            _ => Audience::Unknown(s),
        }
    }
}

impl From<Audience> for String {
    fn from(a: Audience) -> Self {
        match a {
            Audience::Student => "student".to_string(),
            Audience::Faculty => "faculty".to_string(),
            Audience::All => "all".to_string(),
            Audience::Unknown(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Faculty,
    HodPrincipal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Normal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_role: Option<Audience>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub category: Category,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

/// Per-user notification toggles. `lowAttendance`, `marksUpdate` and
/// `announcements` are mandatory categories and stay `true` no matter what
/// the caller sends; only `assignmentReminders` and `generalAlerts` are
/// user-editable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default = "default_true")]
    pub low_attendance: bool,
    #[serde(default = "default_true")]
    pub marks_update: bool,
    #[serde(default = "default_true")]
    pub assignment_reminders: bool,
    #[serde(default = "default_true")]
    pub announcements: bool,
    #[serde(default = "default_true")]
    pub general_alerts: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            low_attendance: true,
            marks_update: true,
            assignment_reminders: true,
            announcements: true,
            general_alerts: true,
        }
    }
}

impl Preferences {
    /// Force the mandatory toggles back on. Applied to every record coming
    /// in from outside, so a stray `false` in a feed can never opt a user
    /// out of attendance, marks or announcement notifications.
    pub fn normalize(mut self) -> Self {
        self.low_attendance = true;
        self.marks_update = true;
        self.announcements = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveFilter {
    All,
    Unread,
    Category(Category),
}

impl ActiveFilter {
    /// `"All"` and `"Unread"` are reserved filter names; anything else is
    /// treated as a category literal.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "All" => ActiveFilter::All,
            "Unread" => ActiveFilter::Unread,
            other => ActiveFilter::Category(Category::from(other.to_string())),
        }
    }
}

fn addressed_directly(n: &Notification, user_id: &str) -> bool {
    n.recipient_id.as_deref() == Some(user_id)
}

fn broadcast_by_id(n: &Notification) -> bool {
    n.recipient_id.as_deref() == Some(BROADCAST_RECIPIENT)
}

fn student_sees(n: &Notification, user_id: &str) -> bool {
    addressed_directly(n, user_id)
        || broadcast_by_id(n)
        || matches!(
            n.recipient_role,
            Some(Audience::All) | Some(Audience::Student)
        )
}

// Faculty see announcements only. Not configurable.
fn faculty_sees(n: &Notification) -> bool {
    n.category == Category::Announcement
}

fn hod_sees(n: &Notification, user_id: &str) -> bool {
    addressed_directly(n, user_id)
        || broadcast_by_id(n)
        || matches!(n.recipient_role, Some(Audience::All))
}

fn role_gate(n: &Notification, user: &CurrentUser) -> bool {
    match user.role {
        Role::Student => student_sees(n, &user.id),
        Role::Faculty => faculty_sees(n),
        Role::HodPrincipal => hod_sees(n, &user.id),
    }
}

// Only assignment and general are gated; the mandatory categories and
// anything unrecognized pass through.
fn preference_gate(n: &Notification, prefs: &Preferences) -> bool {
    match n.category {
        Category::Assignment => prefs.assignment_reminders,
        Category::General => prefs.general_alerts,
        _ => true,
    }
}

/// Role gate plus preference gate (the preference gate applies to students
/// only). The active filter is layered on top by `resolve_visible`.
pub fn visible_to(n: &Notification, user: &CurrentUser, prefs: &Preferences) -> bool {
    if !role_gate(n, user) {
        return false;
    }
    if user.role == Role::Student && !preference_gate(n, prefs) {
        return false;
    }
    true
}

fn matches_filter(n: &Notification, filter: &ActiveFilter) -> bool {
    match filter {
        ActiveFilter::All => true,
        ActiveFilter::Unread => !n.is_read,
        ActiveFilter::Category(want) => {
            // Unknown categories fall through to "All"/"Unread" only.
            if matches!(want, Category::Unknown(_)) || matches!(n.category, Category::Unknown(_)) {
                return false;
            }
            n.category == *want
        }
    }
}

/// Compute the display list: role gate, preference gate, active filter,
/// then most-recent-first. The sort is stable, so records with equal
/// timestamps keep their input order.
pub fn resolve_visible<'a>(
    notifications: &'a [Notification],
    user: &CurrentUser,
    prefs: &Preferences,
    filter: &ActiveFilter,
) -> Vec<&'a Notification> {
    let mut out: Vec<&Notification> = notifications
        .iter()
        .filter(|n| visible_to(n, user, prefs) && matches_filter(n, filter))
        .collect();
    out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    out
}

/// Badge count: unread records surviving the role and preference gates,
/// ignoring the active filter.
pub fn unread_count(notifications: &[Notification], user: &CurrentUser, prefs: &Preferences) -> usize {
    notifications
        .iter()
        .filter(|n| !n.is_read && visible_to(n, user, prefs))
        .count()
}

/// One-way read transition. Returns whether anything changed; an unknown id
/// or an already-read record is a no-op, not an error.
pub fn mark_read(notifications: &mut [Notification], id: &str) -> bool {
    for n in notifications.iter_mut() {
        if n.id == id {
            if n.is_read {
                return false;
            }
            n.is_read = true;
            return true;
        }
    }
    false
}

/// Mark every notification currently visible to `user` (role + preference
/// gates) as read. Returns how many records transitioned.
pub fn mark_all_read(
    notifications: &mut [Notification],
    user: &CurrentUser,
    prefs: &Preferences,
) -> usize {
    let mut marked = 0;
    for n in notifications.iter_mut() {
        if !n.is_read && visible_to(n, user, prefs) {
            n.is_read = true;
            marked += 1;
        }
    }
    marked
}
