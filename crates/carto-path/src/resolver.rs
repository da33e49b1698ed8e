//! Folder path resolution
//!
//! Turns the symbolic path table of a [`FolderFragment`] into concrete tree
//! paths for the current [`Location`] and access mode.

use std::fmt::{self, Display, Formatter};

use indexmap::IndexMap;

use carto_schema::FolderFragment;
use carto_version::AccessMode;

use crate::template::{expand_tokens, strip_trailing_segments, variant_for};
use crate::{Location, ResolutionError};

/// Purpose of a folder path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathRole {
    /// Where the folder's attributes are listed
    Attributes,
    /// Where the folder's child folders are listed
    Subfolders,
    /// Where instance names of the folder are listed
    List,
    /// Where new instances of the folder are created
    Create,
}

impl PathRole {
    /// Segments below the create path at which this role's path sits
    #[inline]
    #[must_use]
    pub fn depth(self) -> usize {
        match self {
            Self::Create => 0,
            Self::List => 1,
            Self::Attributes | Self::Subfolders => 2,
        }
    }

    /// Trailing segments to strip from an `actual` path to reach `desired`
    ///
    /// Zero when `desired` is not above `actual`.
    #[inline]
    #[must_use]
    pub fn segments_to_strip(desired: Self, actual: Self) -> usize {
        actual.depth().saturating_sub(desired.depth())
    }

    /// Lowercase name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Attributes => "attributes",
            Self::Subfolders => "subfolders",
            Self::List => "list",
            Self::Create => "create",
        }
    }

    fn declared_key(self, fragment: &FolderFragment) -> Option<&str> {
        let paths = &fragment.paths;
        match self {
            Self::Attributes => Some(paths.attributes.as_str()),
            Self::Subfolders => paths.subfolders.as_deref(),
            Self::List => paths.list.as_deref(),
            Self::Create => paths.create.as_deref(),
        }
    }
}

impl Display for PathRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every concrete path of one folder instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    /// Attributes path
    pub attributes: String,
    /// Subfolders path
    pub subfolders: String,
    /// List path
    pub list: String,
    /// Create path
    pub create: String,
    /// Resolved path of every attribute path key used by the fragment
    pub attribute_paths: IndexMap<String, String>,
}

/// Resolves fragment path templates for one access mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathResolver {
    mode: AccessMode,
}

impl PathResolver {
    /// Create resolver
    #[inline]
    #[must_use]
    pub fn new(mode: AccessMode) -> Self {
        Self { mode }
    }

    /// Access mode the resolver picks template variants for
    #[inline]
    #[must_use]
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    fn template<'a>(
        fragment: &'a FolderFragment,
        location: &Location,
        key: &str,
    ) -> Result<&'a str, ResolutionError> {
        fragment
            .paths
            .template(key)
            .ok_or_else(|| ResolutionError::MissingPathKey {
                folder: location.folder_path(),
                key: key.to_string(),
            })
    }

    /// Unexpanded template of the folder's base path
    ///
    /// The subfolders template if declared, else the attributes template.
    ///
    /// # Errors
    /// [`ResolutionError::MissingPathKey`] if the key is not in the table.
    pub fn base_template<'a>(
        &self,
        fragment: &'a FolderFragment,
        location: &Location,
    ) -> Result<&'a str, ResolutionError> {
        let key = fragment.paths.subfolders.as_deref().unwrap_or(fragment.paths.attributes.as_str());
        Self::template(fragment, location, key)
    }

    /// Concrete base path of the folder at `location`
    ///
    /// # Errors
    /// [`ResolutionError::MissingPathKey`] for a dangling key,
    /// [`ResolutionError::UnresolvedTokens`] for an unbound token.
    pub fn resolve_base_path(&self, fragment: &FolderFragment, location: &Location) -> Result<String, ResolutionError> {
        let template = self.base_template(fragment, location)?;
        expand_tokens(location, &variant_for(template, self.mode))
    }

    /// Concrete path of one role
    ///
    /// A role without a declared key is derived from the attributes template
    /// by stripping trailing segments before tokens are expanded, so the
    /// list path of a named collection resolves before its instance token
    /// is bound.
    ///
    /// # Errors
    /// [`ResolutionError::MissingPathKey`] for a dangling key,
    /// [`ResolutionError::UnresolvedTokens`] for an unbound token.
    pub fn resolve_role(
        &self,
        fragment: &FolderFragment,
        role: PathRole,
        location: &Location,
    ) -> Result<String, ResolutionError> {
        let template = match role.declared_key(fragment) {
            Some(key) => variant_for(Self::template(fragment, location, key)?, self.mode),
            None => {
                let attributes = Self::template(fragment, location, &fragment.paths.attributes)?;
                let strip = PathRole::segments_to_strip(role, PathRole::Attributes);
                strip_trailing_segments(&variant_for(attributes, self.mode), strip)
            }
        };
        expand_tokens(location, &template)
    }

    /// Resolve every role and every attribute path key of a folder
    ///
    /// Requires the folder's own name token to be bound.
    ///
    /// # Errors
    /// The first [`ResolutionError`] of any role or attribute path.
    pub fn resolve_folder_paths(
        &self,
        fragment: &FolderFragment,
        location: &Location,
    ) -> Result<ResolvedPaths, ResolutionError> {
        let attributes = self.resolve_role(fragment, PathRole::Attributes, location)?;
        let subfolders = self.resolve_role(fragment, PathRole::Subfolders, location)?;
        let list = self.resolve_role(fragment, PathRole::List, location)?;
        let create = self.resolve_role(fragment, PathRole::Create, location)?;

        let mut attribute_paths = IndexMap::new();
        for attribute in fragment.attributes.values().flatten() {
            if !attribute_paths.contains_key(&attribute.path_key) {
                let path = self.resolve_attribute_path(fragment, &attribute.path_key, location)?;
                attribute_paths.insert(attribute.path_key.clone(), path);
            }
        }

        tracing::trace!("resolved paths for {}: attributes {}", location, attributes);
        Ok(ResolvedPaths {
            attributes,
            subfolders,
            list,
            create,
            attribute_paths,
        })
    }

    /// Concrete path of an attribute path key
    ///
    /// # Errors
    /// [`ResolutionError::MissingPathKey`] for a dangling key,
    /// [`ResolutionError::UnresolvedTokens`] for an unbound token.
    pub fn resolve_attribute_path(
        &self,
        fragment: &FolderFragment,
        path_key: &str,
        location: &Location,
    ) -> Result<String, ResolutionError> {
        let template = Self::template(fragment, location, path_key)?;
        expand_tokens(location, &variant_for(template, self.mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carto_coerce::{DataType, TypeSpec};
    use carto_schema::{AttributeSchema, PathSet};
    use pretty_assertions::assert_eq;

    fn server_fragment() -> FolderFragment {
        FolderFragment::new("Server", PathSet::new("WP001", "/Server${:s}/%SERVER%")).with_name_token("SERVER")
    }

    fn bound() -> Location {
        let mut location = Location::from_folders(&["Server"]);
        location.bind("SERVER", "ms1");
        location
    }

    #[test]
    fn strip_counts() {
        assert_eq!(PathRole::segments_to_strip(PathRole::Create, PathRole::Attributes), 2);
        assert_eq!(PathRole::segments_to_strip(PathRole::List, PathRole::Attributes), 1);
        assert_eq!(PathRole::segments_to_strip(PathRole::Subfolders, PathRole::Attributes), 0);
        assert_eq!(PathRole::segments_to_strip(PathRole::Attributes, PathRole::Create), 0);
    }

    #[test]
    fn derived_roles() {
        let resolver = PathResolver::new(AccessMode::Online);
        let paths = resolver.resolve_folder_paths(&server_fragment(), &bound()).unwrap();
        assert_eq!(paths.attributes, "/Servers/ms1");
        assert_eq!(paths.subfolders, "/Servers/ms1");
        assert_eq!(paths.list, "/Servers");
        assert_eq!(paths.create, "/");
    }

    #[test]
    fn list_path_resolves_before_binding() {
        let resolver = PathResolver::new(AccessMode::Offline);
        let location = Location::from_folders(&["Server"]);
        assert_eq!(
            resolver.resolve_role(&server_fragment(), PathRole::List, &location).unwrap(),
            "/Server"
        );
        assert!(matches!(
            resolver.resolve_role(&server_fragment(), PathRole::Attributes, &location),
            Err(ResolutionError::UnresolvedTokens { .. })
        ));
    }

    #[test]
    fn declared_roles_win() {
        let fragment = FolderFragment::new(
            "Log",
            PathSet::new("WP001", "/Server/%SERVER%/Log/%LOG%")
                .with_template("WP002", "/Server/%SERVER%/Log")
                .with_list("WP002")
                .with_subfolders("WP002"),
        );
        let resolver = PathResolver::new(AccessMode::Offline);
        let mut location = bound();
        location.bind("LOG", "ms1");
        let paths = resolver.resolve_folder_paths(&fragment, &location).unwrap();
        assert_eq!(paths.list, "/Server/ms1/Log");
        assert_eq!(paths.subfolders, "/Server/ms1/Log");
        assert_eq!(
            resolver.resolve_base_path(&fragment, &location).unwrap(),
            "/Server/ms1/Log"
        );
    }

    #[test]
    fn missing_declared_list_key() {
        let mut fragment = server_fragment();
        fragment.paths.list = Some("WP009".into());
        let resolver = PathResolver::new(AccessMode::Offline);
        let err = resolver.resolve_role(&fragment, PathRole::List, &bound()).unwrap_err();
        assert_eq!(
            err,
            ResolutionError::MissingPathKey {
                folder: "/Server".into(),
                key: "WP009".into(),
            }
        );
    }

    #[test]
    fn attribute_paths_resolved() {
        let fragment = server_fragment()
            .with_attribute(AttributeSchema::new("ListenPort", "WP001", TypeSpec::new(DataType::Integer)))
            .with_attribute(AttributeSchema::new("Broken", "WP404", TypeSpec::new(DataType::String)));
        let resolver = PathResolver::new(AccessMode::Offline);
        let err = resolver.resolve_folder_paths(&fragment, &bound()).unwrap_err();
        assert!(matches!(err, ResolutionError::MissingPathKey { ref key, .. } if key == "WP404"));
    }

    #[test]
    fn base_path_falls_back_to_attributes() {
        let resolver = PathResolver::new(AccessMode::Offline);
        assert_eq!(
            resolver.base_template(&server_fragment(), &bound()).unwrap(),
            "/Server${:s}/%SERVER%"
        );
    }
}
