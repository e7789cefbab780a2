//! Profile domain model

use serde::{Deserialize, Serialize};

/// Image path used until a user uploads their own avatar
pub const DEFAULT_AVATAR: &str = "default.jpg";

/// Contents written to [`DEFAULT_AVATAR`] when the media directory lacks it
pub const DEFAULT_AVATAR_BYTES: &[u8] = include_bytes!("../../assets/default.jpg");

/// Per-user supplementary data, one row per user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,
    /// Media-relative path of the avatar image
    pub image: String,
}
