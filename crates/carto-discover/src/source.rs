//! Tree source seam
//!
//! [`TreeSource`] is the only way discovery touches the management tree.
//! [`Session`] owns one source and its current-path cursor for a single pass.

use indexmap::IndexMap;

use carto_coerce::RawValue;

use crate::SourceError;

/// Live or offline management tree addressed by `/`-separated paths
///
/// Sources are cursor-like: a live connection keeps a current directory that
/// [`TreeSource::set_current_path`] moves. Every operation may fail with a
/// transport error.
#[cfg_attr(test, mockall::automock)]
pub trait TreeSource {
    /// Names of the child folders or instances at `path`
    fn list_child_names(&mut self, path: &str) -> Result<Vec<String>, SourceError>;

    /// Bulk listing of the attributes at `path`, in tree order
    fn list_attributes(&mut self, path: &str) -> Result<IndexMap<String, RawValue>, SourceError>;

    /// Fetch one attribute at `path` on its own
    fn get_attribute(&mut self, path: &str, name: &str) -> Result<RawValue, SourceError>;

    /// Check whether `path` exists
    fn path_exists(&mut self, path: &str) -> Result<bool, SourceError>;

    /// Move the cursor to `path`
    fn set_current_path(&mut self, path: &str) -> Result<(), SourceError>;
}

/// A tree source plus its cursor, owned by one discovery pass
#[derive(Debug)]
pub struct Session<S> {
    source: S,
    current: Option<String>,
}

impl<S: TreeSource> Session<S> {
    /// Start a session on `source`
    #[inline]
    #[must_use]
    pub fn new(source: S) -> Self {
        Self { source, current: None }
    }

    /// Path the cursor was last moved to
    #[inline]
    #[must_use]
    pub fn current_path(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Borrow the source
    #[inline]
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// End the session, returning the source
    #[inline]
    pub fn into_source(self) -> S {
        self.source
    }

    /// Move the cursor to `path`
    ///
    /// # Errors
    /// The source's error if the path cannot be entered.
    pub fn navigate(&mut self, path: &str) -> Result<(), SourceError> {
        tracing::debug!("navigating to {}", path);
        self.source.set_current_path(path)?;
        self.current = Some(path.to_string());
        Ok(())
    }

    /// Navigate to `path` and list its children
    ///
    /// # Errors
    /// The source's error.
    pub fn list_child_names(&mut self, path: &str) -> Result<Vec<String>, SourceError> {
        self.navigate(path)?;
        self.source.list_child_names(path)
    }

    /// Navigate to `path` and list its attributes
    ///
    /// # Errors
    /// The source's error.
    pub fn list_attributes(&mut self, path: &str) -> Result<IndexMap<String, RawValue>, SourceError> {
        self.navigate(path)?;
        self.source.list_attributes(path)
    }

    /// Fetch a single attribute at `path`
    ///
    /// # Errors
    /// The source's error.
    pub fn get_attribute(&mut self, path: &str, name: &str) -> Result<RawValue, SourceError> {
        if self.current.as_deref() != Some(path) {
            self.navigate(path)?;
        }
        self.source.get_attribute(path, name)
    }

    /// Check whether `path` exists without moving the cursor
    ///
    /// # Errors
    /// The source's error.
    pub fn path_exists(&mut self, path: &str) -> Result<bool, SourceError> {
        self.source.path_exists(path)
    }
}
