//! Thought domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of a thought, in characters
pub const MAX_THOUGHT_LENGTH: usize = 280;

/// A short text post owned by a user. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thought {
    pub id: i64,
    pub user_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}
