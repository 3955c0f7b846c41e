use serde::{Deserialize, Serialize};

use super::{UnixSeconds, UserId};

/// Account owner. Only the registration time matters here: it anchors
/// promotion eligibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: UnixSeconds,
}

impl User {
    pub fn new(id: UserId, created_at: UnixSeconds) -> Self {
        Self {
            id,
            username: None,
            email: None,
            created_at,
        }
    }
}
