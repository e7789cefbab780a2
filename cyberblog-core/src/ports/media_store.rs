//! Media storage port - where uploaded avatars end up

use crate::domain::result::Result;

/// Storage for user-uploaded files, addressed by media-relative paths
/// such as `profile_pics/3f2c.png`
pub trait MediaStore: Send + Sync {
    /// Store `bytes` under `relative_path`, replacing any existing file
    fn save(&self, relative_path: &str, bytes: &[u8]) -> Result<()>;

    /// Remove a stored file; missing files are not an error
    fn delete(&self, relative_path: &str) -> Result<()>;

    /// True if a file is stored under `relative_path`
    fn exists(&self, relative_path: &str) -> bool;
}
