//! Typed schema records
//!
//! These are immutable once loaded. Every cross-reference they contain
//! (role keys, attribute path keys, name tokens) has been checked by the
//! loader, so lookups here only fail when a folder or fragment does not
//! apply to the current [`Target`].

use indexmap::IndexMap;

use carto_coerce::TypeSpec;
use carto_version::{ModeScope, RangeByMode, Target, VersionRange};

/// How an attribute value is read from the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMethod {
    /// Taken from the bulk attribute listing of the folder
    #[default]
    Bulk,
    /// Fetched on its own; the bulk listing does not carry a usable value
    Explicit,
}

/// Symbolic path table of a fragment plus its role keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSet {
    /// Symbolic key to path template
    pub templates: IndexMap<String, String>,
    /// Key of the attributes path
    pub attributes: String,
    /// Key of the subfolders path, if declared
    pub subfolders: Option<String>,
    /// Key of the list path, if declared
    pub list: Option<String>,
    /// Key of the create path, if declared
    pub create: Option<String>,
}

impl PathSet {
    /// Path set with one template used as the attributes path
    #[must_use]
    pub fn new(attributes_key: impl Into<String>, template: impl Into<String>) -> Self {
        let attributes = attributes_key.into();
        let mut templates = IndexMap::new();
        templates.insert(attributes.clone(), template.into());
        Self {
            templates,
            attributes,
            subfolders: None,
            list: None,
            create: None,
        }
    }

    /// With additional template
    #[must_use]
    pub fn with_template(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.templates.insert(key.into(), template.into());
        self
    }

    /// With subfolders role key
    #[must_use]
    pub fn with_subfolders(mut self, key: impl Into<String>) -> Self {
        self.subfolders = Some(key.into());
        self
    }

    /// With list role key
    #[must_use]
    pub fn with_list(mut self, key: impl Into<String>) -> Self {
        self.list = Some(key.into());
        self
    }

    /// With create role key
    #[must_use]
    pub fn with_create(mut self, key: impl Into<String>) -> Self {
        self.create = Some(key.into());
        self
    }

    /// Template bound to `key`
    #[inline]
    #[must_use]
    pub fn template(&self, key: &str) -> Option<&str> {
        self.templates.get(key).map(String::as_str)
    }
}

/// One attribute of a folder, scoped to a version range and mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSchema {
    /// Name in the model document
    pub model_name: String,
    /// Name in the live tree, may be dual-variant
    pub wire_name: String,
    /// Key into the fragment's path table
    pub path_key: String,
    /// Declared, read and preferred types
    pub types: TypeSpec,
    /// Array element subtype
    pub subtype: Option<String>,
    /// Versions the attribute exists in
    pub versions: VersionRange,
    /// Modes the attribute exists in
    pub scope: ModeScope,
    /// How the value is read
    pub fetch: FetchMethod,
    /// Default value text, coerced with the attribute's type before comparing;
    /// equal values are not written
    pub default: Option<String>,
}

impl AttributeSchema {
    /// Attribute available in every version and mode
    #[must_use]
    pub fn new(model_name: impl Into<String>, path_key: impl Into<String>, types: TypeSpec) -> Self {
        let model_name = model_name.into();
        Self {
            wire_name: model_name.clone(),
            model_name,
            path_key: path_key.into(),
            types,
            subtype: None,
            versions: VersionRange::all(),
            scope: ModeScope::Both,
            fetch: FetchMethod::Bulk,
            default: None,
        }
    }

    /// With wire name
    #[must_use]
    pub fn with_wire_name(mut self, wire_name: impl Into<String>) -> Self {
        self.wire_name = wire_name.into();
        self
    }

    /// With fetch method
    #[must_use]
    pub fn with_fetch(mut self, fetch: FetchMethod) -> Self {
        self.fetch = fetch;
        self
    }

    /// With default value text
    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// With version range and mode scope
    #[must_use]
    pub fn with_availability(mut self, versions: VersionRange, scope: ModeScope) -> Self {
        self.versions = versions;
        self.scope = scope;
        self
    }

    /// Check whether the attribute applies to `target`
    #[inline]
    #[must_use]
    pub fn admits(&self, target: &Target) -> bool {
        target.admits(&self.versions, self.scope)
    }
}

/// Version-scoped description of one folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderFragment {
    /// Versions the fragment applies to
    pub versions: VersionRange,
    /// Modes the fragment applies to
    pub scope: ModeScope,
    /// Folder name in the live tree, may be dual-variant
    pub wire_type: String,
    /// Token bound to the instance name, e.g. `SERVER`
    pub name_token: Option<String>,
    /// A single instance whose name is supplied by the live tree
    pub single_unknown_name: bool,
    /// Path table and role keys
    pub paths: PathSet,
    /// Model attribute name to its versioned schemas
    pub attributes: IndexMap<String, Vec<AttributeSchema>>,
    /// Nested folders
    pub children: IndexMap<String, FolderSchema>,
}

impl FolderFragment {
    /// Fragment available in every version and mode
    #[must_use]
    pub fn new(wire_type: impl Into<String>, paths: PathSet) -> Self {
        Self {
            versions: VersionRange::all(),
            scope: ModeScope::Both,
            wire_type: wire_type.into(),
            name_token: None,
            single_unknown_name: false,
            paths,
            attributes: IndexMap::new(),
            children: IndexMap::new(),
        }
    }

    /// With name token
    #[must_use]
    pub fn with_name_token(mut self, token: impl Into<String>) -> Self {
        self.name_token = Some(token.into());
        self
    }

    /// Mark as a single instance with an unpredictable name
    #[must_use]
    pub fn with_single_unknown_name(mut self) -> Self {
        self.single_unknown_name = true;
        self
    }

    /// With version range and mode scope
    #[must_use]
    pub fn with_availability(mut self, versions: VersionRange, scope: ModeScope) -> Self {
        self.versions = versions;
        self.scope = scope;
        self
    }

    /// With attribute, appended to the schemas of its model name
    #[must_use]
    pub fn with_attribute(mut self, attribute: AttributeSchema) -> Self {
        self.attributes
            .entry(attribute.model_name.clone())
            .or_default()
            .push(attribute);
        self
    }

    /// With child folder
    #[must_use]
    pub fn with_child(mut self, child: FolderSchema) -> Self {
        self.children.insert(child.name.clone(), child);
        self
    }

    /// Check whether the fragment applies to `target`
    #[inline]
    #[must_use]
    pub fn admits(&self, target: &Target) -> bool {
        target.admits(&self.versions, self.scope)
    }

    /// First schema of `model_name` that applies to `target`
    #[must_use]
    pub fn attribute(&self, model_name: &str, target: &Target) -> Option<&AttributeSchema> {
        self.attributes.get(model_name)?.iter().find(|a| a.admits(target))
    }

    /// Every attribute schema that applies to `target`, in declaration order
    pub fn attributes_for<'a>(&'a self, target: &'a Target) -> impl Iterator<Item = &'a AttributeSchema> + 'a {
        self.attributes
            .values()
            .filter_map(move |schemas| schemas.iter().find(|a| a.admits(target)))
    }

    /// Nested folder schema by model name
    #[inline]
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&FolderSchema> {
        self.children.get(name)
    }
}

/// All fragments of one folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderSchema {
    /// Model folder name
    pub name: String,
    /// Fragments in declaration order
    pub fragments: Vec<FolderFragment>,
}

impl FolderSchema {
    /// Create folder schema
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, fragments: Vec<FolderFragment>) -> Self {
        Self {
            name: name.into(),
            fragments,
        }
    }

    /// First fragment that applies to `target`
    #[must_use]
    pub fn select(&self, target: &Target) -> Option<&FolderFragment> {
        self.fragments.iter().find(|f| f.admits(target))
    }

    /// Versions the folder exists in, per mode
    #[must_use]
    pub fn availability(&self) -> RangeByMode {
        let mut ranges = RangeByMode::new();
        for fragment in &self.fragments {
            ranges.update(fragment.scope, &fragment.versions);
        }
        ranges
    }

    /// Versions in which an attribute matching `pred` exists, per mode
    #[must_use]
    pub fn attribute_availability(&self, pred: impl Fn(&AttributeSchema) -> bool) -> RangeByMode {
        let mut ranges = RangeByMode::new();
        for attribute in self.fragments.iter().flat_map(|f| f.attributes.values().flatten()) {
            if pred(attribute) {
                ranges.update(attribute.scope, &attribute.versions);
            }
        }
        ranges
    }
}

/// The whole schema, keyed by top-level folder name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaSet {
    folders: IndexMap<String, FolderSchema>,
}

impl SchemaSet {
    /// Create from top-level folders
    #[inline]
    #[must_use]
    pub fn new(folders: IndexMap<String, FolderSchema>) -> Self {
        Self { folders }
    }

    /// Top-level folders
    #[inline]
    #[must_use]
    pub fn folders(&self) -> &IndexMap<String, FolderSchema> {
        &self.folders
    }

    /// Folder schema at a model folder path
    ///
    /// Intermediate levels are resolved with the fragment that applies to
    /// `target`. An empty path has no folder.
    #[must_use]
    pub fn folder_at<S: AsRef<str>>(&self, folders: &[S], target: &Target) -> Option<&FolderSchema> {
        let (last, parents) = folders.split_last()?;
        let mut level = &self.folders;
        for name in parents {
            level = &level.get(name.as_ref())?.select(target)?.children;
        }
        level.get(last.as_ref())
    }

    /// Applicable fragment at a model folder path
    ///
    /// Returns `None` when any folder on the path is unknown or has no
    /// fragment for `target`; the folder does not exist in that version.
    #[must_use]
    pub fn fragment_at<S: AsRef<str>>(&self, folders: &[S], target: &Target) -> Option<&FolderFragment> {
        self.folder_at(folders, target)?.select(target)
    }

    /// Number of folder schemas at every depth
    #[must_use]
    pub fn folder_count(&self) -> usize {
        fn count(level: &IndexMap<String, FolderSchema>) -> usize {
            level
                .values()
                .map(|folder| 1 + folder.fragments.iter().map(|f| count(&f.children)).sum::<usize>())
                .sum()
        }
        count(&self.folders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carto_coerce::DataType;
    use carto_version::AccessMode;

    fn target(version: &str, mode: AccessMode) -> Target {
        Target::new(version.parse().unwrap(), mode)
    }

    fn server_schema() -> SchemaSet {
        let old = FolderFragment::new("Server", PathSet::new("WP001", "/Server/%SERVER%"))
            .with_name_token("SERVER")
            .with_availability("[10,12)".parse().unwrap(), ModeScope::Both)
            .with_attribute(AttributeSchema::new("ListenPort", "WP001", TypeSpec::new(DataType::Integer)));
        let ssl = FolderSchema::new(
            "SSL",
            vec![FolderFragment::new("SSL", PathSet::new("WP001", "/Server/%SERVER%/SSL/%SERVER%"))],
        );
        let new = FolderFragment::new("Server", PathSet::new("WP001", "/Servers/%SERVER%"))
            .with_name_token("SERVER")
            .with_availability("[12,)".parse().unwrap(), ModeScope::Both)
            .with_child(ssl);
        let mut folders = IndexMap::new();
        folders.insert("Server".to_string(), FolderSchema::new("Server", vec![old, new]));
        SchemaSet::new(folders)
    }

    #[test]
    fn select_by_version() {
        let schema = server_schema();
        let fragment = schema.fragment_at(&["Server"], &target("11", AccessMode::Offline)).unwrap();
        assert_eq!(fragment.paths.template("WP001"), Some("/Server/%SERVER%"));
        let fragment = schema.fragment_at(&["Server"], &target("12.2.1", AccessMode::Online)).unwrap();
        assert_eq!(fragment.paths.template("WP001"), Some("/Servers/%SERVER%"));
    }

    #[test]
    fn nested_fragment_absent_in_old_version() {
        let schema = server_schema();
        assert!(schema.fragment_at(&["Server", "SSL"], &target("12.1", AccessMode::Offline)).is_some());
        assert!(schema.fragment_at(&["Server", "SSL"], &target("11", AccessMode::Offline)).is_none());
        assert!(schema.fragment_at(&["Cluster"], &target("12", AccessMode::Offline)).is_none());
        assert!(schema.fragment_at::<&str>(&[], &target("12", AccessMode::Offline)).is_none());
    }

    #[test]
    fn availability_merges_fragments() {
        let schema = server_schema();
        let ranges = schema.folders()["Server"].availability();
        assert_eq!(ranges.get(AccessMode::Offline).unwrap().to_string(), "[10,)");
    }

    #[test]
    fn attribute_lookup_respects_target() {
        let schema = server_schema();
        let t = target("11", AccessMode::Offline);
        let fragment = schema.fragment_at(&["Server"], &t).unwrap();
        assert!(fragment.attribute("ListenPort", &t).is_some());
        assert!(fragment.attribute("Missing", &t).is_none());
        assert_eq!(fragment.attributes_for(&t).count(), 1);
    }

    #[test]
    fn folder_count_includes_nested() {
        assert_eq!(server_schema().folder_count(), 2);
    }
}
