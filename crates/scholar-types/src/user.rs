//! User profile reference used for personalization.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder used in prompts when a user's first name is not known.
pub const ABSENT_NAME: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl UserProfile {
    /// The first name for prompt injection, or [`ABSENT_NAME`] when missing or blank.
    pub fn display_first_name(&self) -> &str {
        self.first_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(ABSENT_NAME)
    }
}
