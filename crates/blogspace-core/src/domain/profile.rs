use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::null_as_empty;

/// Profile - public identity attached to an account.
///
/// The backend creates it alongside the account; this application only
/// reads it and edits the display name and bio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub display_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub bio: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Initial used for the author badge.
    pub fn initial(&self) -> Option<char> {
        self.display_name
            .chars()
            .next()
            .map(|c| c.to_uppercase().next().unwrap_or(c))
    }
}

/// Editable profile fields.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileChanges {
    pub display_name: String,
    pub bio: String,
    pub updated_at: DateTime<Utc>,
}
