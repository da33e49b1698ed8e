//! Traversal location
//!
//! Provides [`Location`], the model folder path of the folder being visited
//! together with the instance names bound to name tokens on the way down.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use indexmap::IndexMap;

use crate::ResolutionError;

/// Model folder path plus token bindings
///
/// Folders are pushed and popped as the walker descends; tokens are bound
/// and unbound in the same last-in first-out order.
///
/// # Examples
/// - folders `["Server", "SSL"]` → `/Server/SSL`
/// - token `SERVER` bound to `AdminServer` expands `%SERVER%` in templates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    folders: Vec<String>,
    tokens: IndexMap<String, String>,
}

impl Location {
    /// Root location
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Location with the given folders and no bindings
    #[must_use]
    pub fn from_folders(folders: &[impl AsRef<str>]) -> Self {
        Self {
            folders: folders.iter().map(|f| f.as_ref().to_string()).collect(),
            tokens: IndexMap::new(),
        }
    }

    /// Model folder names from the root
    #[inline]
    #[must_use]
    pub fn folders(&self) -> &[String] {
        &self.folders
    }

    /// Number of folders
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.folders.len()
    }

    /// Check whether no folder has been entered
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.folders.is_empty()
    }

    /// Innermost folder
    #[inline]
    #[must_use]
    pub fn current_folder(&self) -> Option<&str> {
        self.folders.last().map(String::as_str)
    }

    /// Enter a folder
    #[inline]
    pub fn push_folder(&mut self, folder: impl Into<String>) {
        self.folders.push(folder.into());
    }

    /// Leave the innermost folder
    #[inline]
    pub fn pop_folder(&mut self) -> Option<String> {
        self.folders.pop()
    }

    /// Copy of this location with one more folder
    #[must_use]
    pub fn child(&self, folder: impl Into<String>) -> Self {
        let mut child = self.clone();
        child.push_folder(folder);
        child
    }

    /// Bind `token` to an instance name, replacing an earlier binding
    pub fn bind(&mut self, token: impl Into<String>, name: impl Into<String>) {
        self.tokens.insert(token.into(), name.into());
    }

    /// Remove the binding of `token`
    pub fn unbind(&mut self, token: &str) -> Option<String> {
        self.tokens.shift_remove(token)
    }

    /// Instance name bound to `token`
    #[inline]
    #[must_use]
    pub fn token(&self, token: &str) -> Option<&str> {
        self.tokens.get(token).map(String::as_str)
    }

    /// Bindings in the order they were made
    #[inline]
    #[must_use]
    pub fn tokens(&self) -> &IndexMap<String, String> {
        &self.tokens
    }

    /// Folder path such as `/Server/SSL`; the root is `/`
    #[must_use]
    pub fn folder_path(&self) -> String {
        if self.folders.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", self.folders.join("/"))
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.folder_path())?;
        if !self.tokens.is_empty() {
            let bound: Vec<String> = self.tokens.iter().map(|(k, v)| format!("{k}={v}")).collect();
            write!(f, " [{}]", bound.join(", "))?;
        }
        Ok(())
    }
}

impl FromStr for Location {
    type Err = ResolutionError;

    /// Parse a folder path such as `/Server/SSL`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::new());
        }
        let folders = trimmed
            .split('/')
            .map(|segment| {
                if segment.is_empty() {
                    Err(ResolutionError::InvalidLocation(s.to_string()))
                } else {
                    Ok(segment.to_string())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            folders,
            tokens: IndexMap::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_root() {
        let location = Location::new();
        assert!(location.is_root());
        assert_eq!(location.folder_path(), "/");
        assert_eq!(location.current_folder(), None);
    }

    #[test]
    fn location_push_pop() {
        let mut location = Location::new();
        location.push_folder("Server");
        location.push_folder("SSL");
        assert_eq!(location.folder_path(), "/Server/SSL");
        assert_eq!(location.depth(), 2);
        assert_eq!(location.pop_folder().as_deref(), Some("SSL"));
        assert_eq!(location.current_folder(), Some("Server"));
    }

    #[test]
    fn location_child_leaves_parent() {
        let parent = Location::from_folders(&["Server"]);
        let child = parent.child("Log");
        assert_eq!(child.folder_path(), "/Server/Log");
        assert_eq!(parent.folder_path(), "/Server");
    }

    #[test]
    fn location_bind_unbind() {
        let mut location = Location::from_folders(&["Server"]);
        location.bind("SERVER", "AdminServer");
        assert_eq!(location.token("SERVER"), Some("AdminServer"));
        assert_eq!(location.to_string(), "/Server [SERVER=AdminServer]");
        assert_eq!(location.unbind("SERVER").as_deref(), Some("AdminServer"));
        assert_eq!(location.token("SERVER"), None);
        assert_eq!(location.to_string(), "/Server");
    }

    #[test]
    fn location_from_str() {
        let location: Location = "/Server/SSL/".parse().unwrap();
        assert_eq!(location.folders(), &["Server", "SSL"]);
        assert!("/".parse::<Location>().unwrap().is_root());
        assert!(matches!(
            "/Server//SSL".parse::<Location>(),
            Err(ResolutionError::InvalidLocation(_))
        ));
    }
}
