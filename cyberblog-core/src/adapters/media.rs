//! Filesystem media store

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::domain::result::{Error, Result};
use crate::ports::MediaStore;

/// Stores media under a root directory on local disk
pub struct FsMediaStore {
    root: PathBuf,
}

impl FsMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a relative path, refusing anything that could leave the root
    fn resolve(&self, relative_path: &str) -> Result<PathBuf> {
        let rel = Path::new(relative_path);
        let safe = !relative_path.is_empty()
            && rel
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(Error::Media(format!("invalid media path: {}", relative_path)));
        }
        Ok(self.root.join(rel))
    }
}

impl MediaStore for FsMediaStore {
    fn save(&self, relative_path: &str, bytes: &[u8]) -> Result<()> {
        let path = self.resolve(relative_path)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        Ok(())
    }

    fn delete(&self, relative_path: &str) -> Result<()> {
        let path = self.resolve(relative_path)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, relative_path: &str) -> bool {
        self.resolve(relative_path)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }
}
