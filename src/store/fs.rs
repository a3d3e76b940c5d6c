use std::fs;
use std::path::{Path, PathBuf};

use crate::app::{Result, ScrivenerError};
use crate::store::DocumentStore;

/// Writes documents as files in one output directory
pub struct FsStore {
    dir: PathBuf,
}

impl FsStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl DocumentStore for FsStore {
    fn persist(&self, id: &str, contents: &str) -> Result<PathBuf> {
        let path = self.dir.join(id);
        let persistence = |source| ScrivenerError::Persistence {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(persistence)?;
        }
        fs::write(&path, contents).map_err(persistence)?;
        Ok(path)
    }

    fn artifact_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}
