use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Identity of the locally authenticated participant.
///
/// Owned by the session for the process lifetime: set once at login/restore,
/// gone when the client is torn down at logout.
#[derive(Clone, Debug)]
pub struct SessionUser {
    pub id: String,
    pub full_name: String,
    pub role: String,
}

/// Directory entry from `GET /users`.
#[derive(Clone, Debug, Deserialize)]
pub struct UserInfo {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    pub full_name: String,
}

/// Group record from `GET /groups` / `POST /groups`.
#[derive(Clone, Debug, Deserialize)]
pub struct GroupInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub members: Vec<String>,
    #[serde(with = "super::message::ts")]
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}
