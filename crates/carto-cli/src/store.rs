//! Directory-backed artifact store

use std::path::{Path, PathBuf};

use carto_discover::{ArchiveError, ArtifactStore};

/// Subdirectory archived files are placed in
pub const DEFAULT_FILES_DIR: &str = "wlsdeploy/files";

/// Copies archived files into `<root>/<subdir>`
///
/// Stored names are relative to `root` and use `/`. A second file with an
/// already stored name gets a numeric suffix, e.g. `identity-1.jks`.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
    subdir: String,
    stored: Vec<PathBuf>,
}

impl DirectoryStore {
    /// Store under `root` using [`DEFAULT_FILES_DIR`]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            subdir: DEFAULT_FILES_DIR.to_string(),
            stored: Vec::new(),
        }
    }

    /// With subdirectory
    #[must_use]
    pub fn with_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.subdir = subdir.into();
        self
    }

    /// Source files stored so far
    #[inline]
    #[must_use]
    pub fn stored(&self) -> &[PathBuf] {
        &self.stored
    }

    fn free_name(&self, dir: &Path, file: &Path) -> Result<String, ArchiveError> {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ArchiveError::Rejected {
                path: file.to_path_buf(),
                reason: "not a file path".to_string(),
            })?;
        if !dir.join(&name).exists() {
            return Ok(name);
        }

        let stem = file.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
        let extension = file.extension().map(|e| format!(".{}", e.to_string_lossy())).unwrap_or_default();
        let mut counter = 1;
        loop {
            let candidate = format!("{stem}-{counter}{extension}");
            if !dir.join(&candidate).exists() {
                return Ok(candidate);
            }
            counter += 1;
        }
    }
}

impl ArtifactStore for DirectoryStore {
    fn add_file(&mut self, path: &Path) -> Result<String, ArchiveError> {
        if !path.is_file() {
            return Err(ArchiveError::Rejected {
                path: path.to_path_buf(),
                reason: "file does not exist".to_string(),
            });
        }

        let dir = self.root.join(&self.subdir);
        std::fs::create_dir_all(&dir).map_err(|source| ArchiveError::Io {
            path: dir.clone(),
            source,
        })?;
        let name = self.free_name(&dir, path)?;
        std::fs::copy(path, dir.join(&name)).map_err(|source| ArchiveError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        self.stored.push(path.to_path_buf());
        Ok(format!("{}/{name}", self.subdir.trim_end_matches('/')))
    }
}
