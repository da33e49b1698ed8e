//! Side-artifact archival
//!
//! Attributes such as keystore or script locations name files that must
//! travel with the model. [`ArchivingHandler`] copies those files into an
//! [`ArtifactStore`] and rewrites the attribute to the stored name.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use carto_coerce::ModelValue;
use carto_path::Location;

use crate::{ArchiveError, AttributeHandler};

/// Destination for side artifacts
pub trait ArtifactStore: Send {
    /// Store the file at `path`, returning the name it is stored under
    ///
    /// # Errors
    /// [`ArchiveError`] if the file cannot be stored.
    fn add_file(&mut self, path: &Path) -> Result<String, ArchiveError>;
}

/// Attribute handler that archives the file an attribute names
///
/// Relative file values are resolved against the domain home when one is
/// configured. Files under an excluded root (product install locations) are
/// left as they are. A failure to store a file is logged and the original
/// value is kept.
#[derive(Debug)]
pub struct ArchivingHandler<S> {
    store: Arc<Mutex<S>>,
    domain_home: Option<PathBuf>,
    excluded_roots: Vec<PathBuf>,
}

impl<S> Clone for ArchivingHandler<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            domain_home: self.domain_home.clone(),
            excluded_roots: self.excluded_roots.clone(),
        }
    }
}

impl<S: ArtifactStore> ArchivingHandler<S> {
    /// Handler writing to a shared store
    #[inline]
    #[must_use]
    pub fn new(store: Arc<Mutex<S>>) -> Self {
        Self {
            store,
            domain_home: None,
            excluded_roots: Vec::new(),
        }
    }

    /// With directory relative file values are resolved against
    #[must_use]
    pub fn with_domain_home(mut self, domain_home: impl Into<PathBuf>) -> Self {
        self.domain_home = Some(domain_home.into());
        self
    }

    /// With a root whose files are never archived
    #[must_use]
    pub fn with_excluded_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.excluded_roots.push(root.into());
        self
    }

    /// The shared store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<Mutex<S>> {
        &self.store
    }

    /// Absolute form of a file value
    #[must_use]
    pub fn resolve(&self, file: &str) -> PathBuf {
        let path = PathBuf::from(file);
        match &self.domain_home {
            Some(home) if path.is_relative() => home.join(path),
            _ => path,
        }
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.excluded_roots.iter().any(|root| path.starts_with(root))
    }
}

impl<S: ArtifactStore> AttributeHandler for ArchivingHandler<S> {
    fn transform(&self, name: &str, value: ModelValue, location: &Location) -> Option<ModelValue> {
        let file = match value.as_str() {
            Some(file) if !file.is_empty() => file,
            _ => return Some(value),
        };

        let path = self.resolve(file);
        if self.is_excluded(&path) {
            tracing::debug!("not archiving {} for {} at {}: under an excluded root", path.display(), name, location);
            return Some(value);
        }

        let stored = self.store.lock().add_file(&path);
        match stored {
            Ok(stored) => {
                tracing::debug!("archived {} for {} as {}", path.display(), name, stored);
                Some(ModelValue::String(stored))
            }
            Err(e) => {
                tracing::warn!("failed to archive {} for attribute {} at {}: {}", path.display(), name, location, e);
                Some(value)
            }
        }
    }
}
