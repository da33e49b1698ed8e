//! Tree walker
//!
//! [`Discoverer`] walks the tree depth first. For every folder it selects
//! the schema fragment that applies to the target version and mode,
//! enumerates instances according to the folder's [`FolderKind`], copies
//! coerced attribute values into a [`ModelNode`] and then recurses into the
//! child folders the tree reports.

use indexmap::IndexMap;

use carto_coerce::{Coercer, ModelValue, RawValue};
use carto_path::{split_dual_variant, variant_for, Location, PathResolver, PathRole, ResolutionError};
use carto_schema::{AttributeSchema, FetchMethod, FolderFragment, FolderSchema, SchemaSet};
use carto_version::Target;

use crate::{DiscoverConfig, DiscoverError, HandlerRegistry, ModelNode, Result, Session, SourceError, TreeSource};

/// How instances of a folder are found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderKind {
    /// Exactly one instance with a fixed path; no name token
    Singleton,
    /// At most one instance whose name only the tree knows
    SingleUnknownName,
    /// Any number of named instances
    NamedCollection,
}

impl FolderKind {
    /// Classify a fragment
    #[must_use]
    pub fn of(fragment: &FolderFragment) -> Self {
        match (&fragment.name_token, fragment.single_unknown_name) {
            (None, _) => Self::Singleton,
            (Some(_), true) => Self::SingleUnknownName,
            (Some(_), false) => Self::NamedCollection,
        }
    }
}

/// Walks a management tree into a model document
///
/// One discoverer owns one [`Session`]; every operation takes `&mut self`,
/// so a pass cannot interleave navigations on the same source.
pub struct Discoverer<'a, S> {
    schema: &'a SchemaSet,
    session: Session<S>,
    target: Target,
    resolver: PathResolver,
    coercer: Coercer,
    handlers: HandlerRegistry,
}

impl<'a, S: TreeSource> Discoverer<'a, S> {
    /// Discoverer for `target` over `source`
    #[must_use]
    pub fn new(schema: &'a SchemaSet, source: S, target: Target) -> Self {
        Self {
            schema,
            session: Session::new(source),
            resolver: PathResolver::new(target.mode),
            target,
            coercer: Coercer::new(),
            handlers: HandlerRegistry::new(),
        }
    }

    /// Discoverer for the target and path separator of `config`
    ///
    /// # Errors
    /// See [`DiscoverConfig::target`].
    pub fn from_config(schema: &'a SchemaSet, source: S, config: &DiscoverConfig) -> Result<Self> {
        Ok(Self::new(schema, source, config.target()?).with_coercer(config.coercer()))
    }

    /// With attribute handlers
    #[must_use]
    pub fn with_handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    /// With coercer
    #[must_use]
    pub fn with_coercer(mut self, coercer: Coercer) -> Self {
        self.coercer = coercer;
        self
    }

    /// Version and mode being discovered
    #[inline]
    #[must_use]
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// End the pass, returning the tree source
    pub fn into_source(self) -> S {
        self.session.into_source()
    }

    /// Discover every folder below `base` into a new document
    ///
    /// # Errors
    /// The first fatal [`DiscoverError`] of the pass.
    pub fn discover(&mut self, base: &Location) -> Result<ModelNode> {
        let mut location = base.clone();
        let mut document = ModelNode::new();
        tracing::info!("discovering {} against {}", location, self.target);
        self.discover_subfolders(&mut document, &mut location)?;
        Ok(document)
    }

    /// Folders, separated by spaces, with each bound instance name after its folder
    ///
    /// `Server AdminServer SSL` for the SSL folder of server `AdminServer`.
    #[must_use]
    pub fn describe(&self, location: &Location) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(location.depth() * 2);
        for (depth, folder) in location.folders().iter().enumerate() {
            parts.push(folder);
            let token = self
                .schema
                .fragment_at(&location.folders()[..=depth], &self.target)
                .and_then(|fragment| fragment.name_token.as_deref());
            if let Some(name) = token.and_then(|token| location.token(token)) {
                parts.push(name);
            }
        }
        parts.join(" ")
    }

    fn fragment(&self, location: &Location) -> Option<&'a FolderFragment> {
        self.schema.fragment_at(location.folders(), &self.target)
    }

    fn folder_schema(&self, location: &Location) -> Option<&'a FolderSchema> {
        self.schema.folder_at(location.folders(), &self.target)
    }

    fn child_schemas(&self, location: &Location) -> Option<&'a IndexMap<String, FolderSchema>> {
        if location.is_root() {
            Some(self.schema.folders())
        } else {
            self.fragment(location).map(|fragment| &fragment.children)
        }
    }

    fn resolution_error(&self, location: &Location, source: ResolutionError) -> DiscoverError {
        DiscoverError::Resolution {
            context: self.describe(location),
            folder: location.folder_path(),
            source,
        }
    }

    fn source_error(&self, location: &Location, source: SourceError) -> DiscoverError {
        DiscoverError::Source {
            context: self.describe(location),
            folder: location.folder_path(),
            source,
        }
    }

    fn resolve(&self, fragment: &FolderFragment, role: PathRole, location: &Location) -> Result<String> {
        self.resolver
            .resolve_role(fragment, role, location)
            .map_err(|e| self.resolution_error(location, e))
    }

    fn subfolders_path(&self, location: &Location) -> Result<Option<String>> {
        if location.is_root() {
            return Ok(Some("/".to_string()));
        }
        match self.fragment(location) {
            Some(fragment) => self.resolve(fragment, PathRole::Subfolders, location).map(Some),
            None => Ok(None),
        }
    }

    /// Model folder whose wire type matches a live child name
    fn model_folder_name(&self, children: &'a IndexMap<String, FolderSchema>, wire_name: &str) -> Option<&'a str> {
        children.iter().find_map(|(name, folder)| {
            let fragment = folder.select(&self.target)?;
            (variant_for(&fragment.wire_type, self.target.mode) == wire_name).then_some(name.as_str())
        })
    }

    /// Names of the instances of the innermost folder of `location`
    ///
    /// `None` when the folder does not exist for the target or its list path
    /// is not in the tree.
    ///
    /// # Errors
    /// [`DiscoverError::Resolution`] or [`DiscoverError::Source`].
    pub fn find_names_in_folder(&mut self, location: &Location) -> Result<Option<Vec<String>>> {
        let Some(fragment) = self.fragment(location) else {
            tracing::debug!(
                "{} is not available in {}",
                location.current_folder().unwrap_or("/"),
                self.target
            );
            return Ok(None);
        };

        let list_path = self.resolve(fragment, PathRole::List, location)?;
        tracing::trace!("listing {} instances at {}", location.folder_path(), list_path);
        let exists = self
            .session
            .path_exists(&list_path)
            .map_err(|e| self.source_error(location, e))?;
        if !exists {
            return Ok(None);
        }
        let names = self
            .session
            .list_child_names(&list_path)
            .map_err(|e| self.source_error(location, e))?;
        Ok(Some(names))
    }

    /// Name of the single instance of the innermost folder of `location`
    ///
    /// # Errors
    /// [`DiscoverError::Cardinality`] if the tree lists more than one
    /// instance, otherwise as [`Discoverer::find_names_in_folder`].
    pub fn find_singleton_name_in_folder(&mut self, location: &Location) -> Result<Option<String>> {
        let Some(mut names) = self.find_names_in_folder(location)? else {
            return Ok(None);
        };
        if names.len() > 1 {
            return Err(DiscoverError::Cardinality {
                context: self.describe(location),
                folder: location.folder_path(),
                count: names.len(),
            });
        }
        Ok(names.pop())
    }

    /// Copy the attributes of the folder at `location` into `node`
    ///
    /// Returns the raw value of every mapped attribute, keyed by model name,
    /// including values that were left out of `node`. A value that cannot be
    /// converted is logged and left out.
    ///
    /// # Errors
    /// [`DiscoverError::Resolution`] or [`DiscoverError::Source`].
    pub fn populate_attributes(&mut self, node: &mut ModelNode, location: &Location) -> Result<IndexMap<String, RawValue>> {
        let mut raw_values = IndexMap::new();
        let Some(fragment) = self.fragment(location) else {
            return Ok(raw_values);
        };

        let attributes_path = self.resolve(fragment, PathRole::Attributes, location)?;
        let listing = self
            .session
            .list_attributes(&attributes_path)
            .map_err(|e| self.source_error(location, e))?;
        tracing::trace!("{} attributes at {}", listing.len(), attributes_path);

        let by_wire_name: IndexMap<String, &AttributeSchema> = fragment
            .attributes_for(&self.target)
            .map(|attribute| (variant_for(&attribute.wire_name, self.target.mode), attribute))
            .collect();

        for (wire_name, bulk_value) in listing {
            let Some(attribute) = by_wire_name.get(&wire_name).copied() else {
                self.log_unmapped_attribute(location, &wire_name);
                continue;
            };

            let raw = match attribute.fetch {
                FetchMethod::Bulk => bulk_value,
                FetchMethod::Explicit => {
                    let path = self
                        .resolver
                        .resolve_attribute_path(fragment, &attribute.path_key, location)
                        .map_err(|e| self.resolution_error(location, e))?;
                    tracing::trace!("fetching {} explicitly at {}", wire_name, path);
                    self.session
                        .get_attribute(&path, &wire_name)
                        .map_err(|e| self.source_error(location, e))?
                }
            };
            raw_values.insert(attribute.model_name.clone(), raw.clone());

            let converted = match self.coercer.coerce(&attribute.types, attribute.subtype.as_deref(), &raw) {
                Ok(converted) => converted,
                Err(e) => {
                    tracing::warn!(
                        "skipping attribute {} of {} for {}: {}",
                        attribute.model_name,
                        self.describe(location),
                        self.target,
                        e
                    );
                    continue;
                }
            };
            let Some(value) = converted else {
                continue;
            };
            if self.is_default(attribute, &value) {
                tracing::trace!("{} has its default value {}", attribute.model_name, value);
                continue;
            }

            match self.handlers.apply(&attribute.model_name, value, location) {
                Some(value) if !value.is_empty() => {
                    tracing::trace!("{} = {}", attribute.model_name, value);
                    node.insert_value(attribute.model_name.clone(), value);
                }
                _ => tracing::trace!("{} dropped from {}", attribute.model_name, location),
            }
        }
        Ok(raw_values)
    }

    /// Whether `value` equals the attribute's default once both are coerced
    fn is_default(&self, attribute: &AttributeSchema, value: &ModelValue) -> bool {
        let Some(default) = &attribute.default else {
            return false;
        };
        let raw = RawValue::String(default.clone());
        match self.coercer.coerce(&attribute.types, attribute.subtype.as_deref(), &raw) {
            Ok(Some(default)) => &default == value,
            Ok(None) => false,
            Err(e) => {
                tracing::debug!("default of {} is not convertible: {}", attribute.model_name, e);
                false
            }
        }
    }

    fn log_unmapped_attribute(&self, location: &Location, wire_name: &str) {
        let available = self.folder_schema(location).map(|folder| {
            folder.attribute_availability(|attribute| {
                let (offline, online) = split_dual_variant(&attribute.wire_name);
                offline == wire_name || online == wire_name
            })
        });
        match available {
            Some(ranges) if !ranges.is_empty() => tracing::debug!(
                "skipping attribute {} of {}: not in {} (available {})",
                wire_name,
                self.describe(location),
                self.target,
                ranges
            ),
            _ => tracing::debug!(
                "skipping attribute {} of {}: not in the schema",
                wire_name,
                self.describe(location)
            ),
        }
    }

    /// Attributes of the folder at `location`, without its child folders
    ///
    /// # Errors
    /// As [`Discoverer::populate_attributes`].
    pub fn discover_single_folder(&mut self, location: &Location) -> Result<ModelNode> {
        let mut node = ModelNode::new();
        self.populate_attributes(&mut node, location)?;
        Ok(node)
    }

    /// Check whether the tree has `model_folder` below `location`
    ///
    /// # Errors
    /// [`DiscoverError::Resolution`] or [`DiscoverError::Source`].
    pub fn subfolder_exists(&mut self, model_folder: &str, location: &Location) -> Result<bool> {
        let Some(path) = self.subfolders_path(location)? else {
            return Ok(false);
        };
        let Some(fragment) = self.fragment(&location.child(model_folder)) else {
            return Ok(false);
        };
        let wire_type = variant_for(&fragment.wire_type, self.target.mode);
        let names = self
            .session
            .list_child_names(&path)
            .map_err(|e| self.source_error(location, e))?;
        Ok(names.contains(&wire_type))
    }

    /// Discover every child folder the tree reports below `location` into `node`
    ///
    /// Children without a schema mapping for the target are skipped.
    ///
    /// # Errors
    /// The first fatal [`DiscoverError`] below `location`.
    pub fn discover_subfolders(&mut self, node: &mut ModelNode, location: &mut Location) -> Result<()> {
        let Some(children) = self.child_schemas(location) else {
            return Ok(());
        };
        let Some(path) = self.subfolders_path(location)? else {
            return Ok(());
        };
        let wire_names = self
            .session
            .list_child_names(&path)
            .map_err(|e| self.source_error(location, e))?;

        for wire_name in wire_names {
            match self.model_folder_name(children, &wire_name) {
                Some(model_name) => self.discover_subfolder(model_name, location, node)?,
                None => tracing::debug!(
                    "skipping folder {} of {}: no mapping in {}",
                    wire_name,
                    location.folder_path(),
                    self.target
                ),
            }
        }
        Ok(())
    }

    /// Discover `model_folder` below `location` into `node`
    ///
    /// `location` is restored before returning.
    ///
    /// # Errors
    /// The first fatal [`DiscoverError`] inside the folder.
    pub fn discover_subfolder(&mut self, model_folder: &str, location: &mut Location, node: &mut ModelNode) -> Result<()> {
        location.push_folder(model_folder);
        tracing::debug!("discovering {}", self.describe(location));
        let discovered = self.discover_folder(location);
        location.pop_folder();
        node.add_folder_if_not_empty(model_folder, discovered?);
        Ok(())
    }

    fn discover_folder(&mut self, location: &mut Location) -> Result<ModelNode> {
        let Some(fragment) = self.fragment(location) else {
            tracing::debug!("{} is not available in {}", location.folder_path(), self.target);
            return Ok(ModelNode::new());
        };

        match (FolderKind::of(fragment), fragment.name_token.as_deref()) {
            (FolderKind::SingleUnknownName, Some(token)) => match self.find_singleton_name_in_folder(location)? {
                Some(name) => self.discover_instance(location, token, &name),
                None => Ok(ModelNode::new()),
            },
            (FolderKind::NamedCollection, Some(token)) => {
                let names = self.find_names_in_folder(location)?.unwrap_or_default();
                let mut aggregate = ModelNode::new();
                for name in &names {
                    let instance = self.discover_instance(location, token, name)?;
                    aggregate.add_folder_if_not_empty(name.clone(), instance);
                }
                tracing::info!("discovered {} of {} {} instances", aggregate.len(), names.len(), location.folder_path());
                Ok(aggregate)
            }
            _ => self.discover_contents(location),
        }
    }

    fn discover_instance(&mut self, location: &mut Location, token: &str, name: &str) -> Result<ModelNode> {
        // nested folders may reuse the enclosing instance's token
        let outer = location.token(token).map(str::to_owned);
        location.bind(token, name);
        let discovered = self.discover_contents(location);
        match outer {
            Some(outer) => location.bind(token, outer),
            None => {
                location.unbind(token);
            }
        }
        discovered
    }

    fn discover_contents(&mut self, location: &mut Location) -> Result<ModelNode> {
        let mut node = ModelNode::new();
        self.populate_attributes(&mut node, location)?;
        self.discover_subfolders(&mut node, location)?;
        Ok(node)
    }
}

impl<S> std::fmt::Debug for Discoverer<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Discoverer")
            .field("target", &self.target)
            .field("handlers", &self.handlers)
            .finish_non_exhaustive()
    }
}
