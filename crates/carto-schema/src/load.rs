//! Schema loading and validation
//!
//! Parses YAML or JSON into the raw records and checks every reference
//! while converting them into typed records, so a loaded [`SchemaSet`] never
//! contains a dangling path key or an unparsable range.

use std::path::Path;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use carto_coerce::{DataType, TypeSpec};
use carto_version::{ModeScope, VersionRange};

use crate::raw::{OneOrMany, RawAttribute, RawFragment, RawSchemaSet};
use crate::{AttributeSchema, FetchMethod, FolderFragment, FolderSchema, PathSet, SchemaError, SchemaSet};

static NAME_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z_]+$").unwrap_or_else(|e| panic!("invalid name token pattern: {e}")));

impl SchemaSet {
    /// Load a schema from YAML text
    ///
    /// # Errors
    /// [`SchemaError::Yaml`] on malformed YAML, [`SchemaError::Invalid`] on a
    /// failed reference check.
    pub fn from_yaml_str(text: &str) -> Result<Self, SchemaError> {
        let raw: RawSchemaSet = serde_yaml::from_str(text)?;
        build_schema_set(raw)
    }

    /// Load a schema from JSON text
    ///
    /// # Errors
    /// [`SchemaError::Json`] on malformed JSON, [`SchemaError::Invalid`] on a
    /// failed reference check.
    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        let raw: RawSchemaSet = serde_json::from_str(text)?;
        build_schema_set(raw)
    }

    /// Load a schema file, choosing the format by extension
    ///
    /// `.yaml`/`.yml` are read as YAML and `.json` as JSON.
    ///
    /// # Errors
    /// [`SchemaError::Io`] if the file cannot be read,
    /// [`SchemaError::UnsupportedFormat`] for other extensions, otherwise as
    /// the string loaders.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !matches!(extension.as_str(), "yaml" | "yml" | "json") {
            return Err(SchemaError::UnsupportedFormat(path.display().to_string()));
        }

        let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let schema = if extension == "json" {
            Self::from_json_str(&text)?
        } else {
            Self::from_yaml_str(&text)?
        };
        tracing::debug!("loaded {} folder schemas from {}", schema.folder_count(), path.display());
        Ok(schema)
    }
}

fn invalid(folder: &str, reason: impl Into<String>) -> SchemaError {
    SchemaError::Invalid {
        folder: folder.to_string(),
        reason: reason.into(),
    }
}

fn build_schema_set(raw: RawSchemaSet) -> Result<SchemaSet, SchemaError> {
    Ok(SchemaSet::new(build_folders(raw.folders, "")?))
}

fn build_folders(
    raw: IndexMap<String, OneOrMany<RawFragment>>,
    parent: &str,
) -> Result<IndexMap<String, FolderSchema>, SchemaError> {
    let mut folders = IndexMap::with_capacity(raw.len());
    for (name, fragments) in raw {
        let folder_path = format!("{parent}/{name}");
        let fragments = fragments
            .into_vec()
            .into_iter()
            .map(|fragment| build_fragment(&name, &folder_path, fragment))
            .collect::<Result<Vec<_>, _>>()?;
        if fragments.is_empty() {
            return Err(invalid(&folder_path, "folder has no fragments"));
        }
        folders.insert(name.clone(), FolderSchema::new(name, fragments));
    }
    Ok(folders)
}

fn parse_range(folder: &str, text: Option<&str>) -> Result<VersionRange, SchemaError> {
    match text {
        None => Ok(VersionRange::all()),
        Some(text) => text.parse().map_err(|e| invalid(folder, format!("{e}"))),
    }
}

fn parse_scope(folder: &str, text: Option<&str>) -> Result<ModeScope, SchemaError> {
    match text {
        None => Ok(ModeScope::Both),
        Some(text) => text.parse().map_err(|e| invalid(folder, format!("{e}"))),
    }
}

fn parse_type(folder: &str, attribute: &str, text: &str) -> Result<DataType, SchemaError> {
    text.parse()
        .map_err(|e| invalid(folder, format!("attribute {attribute}: {e}")))
}

fn require_key(folder: &str, templates: &IndexMap<String, String>, role: &str, key: &str) -> Result<(), SchemaError> {
    if templates.contains_key(key) {
        Ok(())
    } else {
        Err(invalid(folder, format!("{role} path key '{key}' is not in the path table")))
    }
}

fn build_fragment(name: &str, folder: &str, raw: RawFragment) -> Result<FolderFragment, SchemaError> {
    let versions = parse_range(folder, raw.version.as_deref())?;
    let scope = parse_scope(folder, raw.wlst_mode.as_deref())?;

    if let Some(token) = &raw.name_token {
        if !NAME_TOKEN.is_match(token) {
            return Err(invalid(folder, format!("name token '{token}' must be uppercase letters and '_'")));
        }
    }
    if raw.single_unpredictable_name && raw.name_token.is_none() {
        return Err(invalid(folder, "a single instance with an unpredictable name needs a name token"));
    }

    let templates = raw.wlst_paths;
    require_key(folder, &templates, "attributes", &raw.wlst_attributes_path)?;
    for (role, key) in [
        ("subfolders", &raw.wlst_subfolders_path),
        ("list", &raw.wlst_list_path),
        ("create", &raw.wlst_create_path),
    ] {
        if let Some(key) = key {
            require_key(folder, &templates, role, key)?;
        }
    }

    let mut attributes = IndexMap::with_capacity(raw.attributes.len());
    for (model_name, schemas) in raw.attributes {
        let schemas = schemas
            .into_vec()
            .into_iter()
            .map(|attribute| build_attribute(folder, &model_name, &raw.wlst_attributes_path, &templates, attribute))
            .collect::<Result<Vec<_>, _>>()?;
        attributes.insert(model_name, schemas);
    }

    let children = build_folders(raw.folders, folder)?;

    Ok(FolderFragment {
        versions,
        scope,
        wire_type: raw.wlst_type.unwrap_or_else(|| name.to_string()),
        name_token: raw.name_token,
        single_unknown_name: raw.single_unpredictable_name,
        paths: PathSet {
            templates,
            attributes: raw.wlst_attributes_path,
            subfolders: raw.wlst_subfolders_path,
            list: raw.wlst_list_path,
            create: raw.wlst_create_path,
        },
        attributes,
        children,
    })
}

fn build_attribute(
    folder: &str,
    model_name: &str,
    attributes_key: &str,
    templates: &IndexMap<String, String>,
    raw: RawAttribute,
) -> Result<AttributeSchema, SchemaError> {
    let path_key = raw.wlst_path.unwrap_or_else(|| attributes_key.to_string());
    if !templates.contains_key(&path_key) {
        return Err(invalid(
            folder,
            format!("attribute {model_name}: path key '{path_key}' is not in the path table"),
        ));
    }

    let mut types = TypeSpec::new(parse_type(folder, model_name, &raw.wlst_type)?);
    if let Some(read) = &raw.wlst_read_type {
        types = types.with_read(parse_type(folder, model_name, read)?);
    }
    if let Some(preferred) = &raw.preferred_model_type {
        types = types.with_preferred(parse_type(folder, model_name, preferred)?);
    }

    let fetch = match raw.get_method.as_deref().map(str::to_ascii_uppercase).as_deref() {
        None | Some("LSA") => FetchMethod::Bulk,
        Some("GET") => FetchMethod::Explicit,
        Some(other) => {
            return Err(invalid(
                folder,
                format!("attribute {model_name}: unknown get method '{other}' (expected LSA or GET)"),
            ))
        }
    };

    let default = match raw.default_value {
        None => None,
        Some(value) if value.is_null() => None,
        Some(value) => Some(value.scalar_text().ok_or_else(|| {
            invalid(folder, format!("attribute {model_name}: default value must be a scalar"))
        })?),
    };

    Ok(AttributeSchema {
        model_name: model_name.to_string(),
        wire_name: raw.wlst_name.unwrap_or_else(|| model_name.to_string()),
        path_key,
        types,
        subtype: raw.subtype,
        versions: parse_range(folder, raw.version.as_deref())?,
        scope: parse_scope(folder, raw.wlst_mode.as_deref())?,
        fetch,
        default,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use carto_version::{AccessMode, Target};

    const SERVER: &str = r"
folders:
  Server:
    name_token: SERVER
    wlst_attributes_path: WP001
    wlst_paths:
      WP001: /Server/%SERVER%
    attributes:
      ListenPort:
        wlst_type: integer
        default_value: 7001
      Notes:
        - version: '[10,12)'
          wlst_type: string
        - version: '[12,)'
          wlst_type: string
          get_method: GET
";

    #[test]
    fn load_yaml_defaults() {
        let schema = SchemaSet::from_yaml_str(SERVER).unwrap();
        let server = &schema.folders()["Server"];
        assert_eq!(server.fragments.len(), 1);

        let fragment = &server.fragments[0];
        assert_eq!(fragment.wire_type, "Server");
        assert_eq!(fragment.versions, VersionRange::all());
        assert_eq!(fragment.scope, ModeScope::Both);

        let port = &fragment.attributes["ListenPort"][0];
        assert_eq!(port.wire_name, "ListenPort");
        assert_eq!(port.path_key, "WP001");
        assert_eq!(port.default.as_deref(), Some("7001"));
        assert_eq!(port.fetch, FetchMethod::Bulk);
    }

    #[test]
    fn load_versioned_attribute() {
        let schema = SchemaSet::from_yaml_str(SERVER).unwrap();
        let fragment = &schema.folders()["Server"].fragments[0];
        let old = Target::new("11".parse().unwrap(), AccessMode::Offline);
        let new = Target::new("12.2.1".parse().unwrap(), AccessMode::Offline);
        assert_eq!(fragment.attribute("Notes", &old).unwrap().fetch, FetchMethod::Bulk);
        assert_eq!(fragment.attribute("Notes", &new).unwrap().fetch, FetchMethod::Explicit);
    }

    #[test]
    fn dangling_attributes_key() {
        let err = SchemaSet::from_yaml_str(
            r"
folders:
  Server:
    wlst_attributes_path: WP002
    wlst_paths:
      WP001: /Server
",
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::Invalid { ref folder, .. } if folder == "/Server"));
    }

    #[test]
    fn dangling_nested_list_key() {
        let err = SchemaSet::from_yaml_str(
            r"
folders:
  Server:
    wlst_attributes_path: WP001
    wlst_paths:
      WP001: /Server
    folders:
      SSL:
        wlst_attributes_path: WP001
        wlst_list_path: WP009
        wlst_paths:
          WP001: /Server/SSL
",
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::Invalid { ref folder, .. } if folder == "/Server/SSL"));
    }

    #[test]
    fn lowercase_name_token_rejected() {
        let err = SchemaSet::from_yaml_str(
            r"
folders:
  Server:
    name_token: server
    wlst_attributes_path: WP001
    wlst_paths:
      WP001: /Server/%server%
",
        )
        .unwrap_err();
        assert!(err.to_string().contains("name token"));
    }

    #[test]
    fn unpredictable_name_needs_token() {
        let err = SchemaSet::from_yaml_str(
            r"
folders:
  Security:
    single_unpredictable_name: true
    wlst_attributes_path: WP001
    wlst_paths:
      WP001: /Security
",
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::Invalid { .. }));
    }

    #[test]
    fn unknown_type_rejected() {
        let err = SchemaSet::from_yaml_str(
            r"
folders:
  Server:
    wlst_attributes_path: WP001
    wlst_paths:
      WP001: /Server
    attributes:
      Weight:
        wlst_type: decimal
",
        )
        .unwrap_err();
        assert!(err.to_string().contains("decimal"));
    }

    #[test]
    fn bad_range_rejected() {
        let err = SchemaSet::from_yaml_str(
            r"
folders:
  Server:
    version: '12,13'
    wlst_attributes_path: WP001
    wlst_paths:
      WP001: /Server
",
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::Invalid { .. }));
    }

    #[test]
    fn load_json() {
        let schema = SchemaSet::from_json_str(
            r#"{"folders": {"Cluster": {"name_token": "CLUSTER", "wlst_attributes_path": "WP001",
                "wlst_paths": {"WP001": "/Cluster/%CLUSTER%"}}}}"#,
        )
        .unwrap();
        assert_eq!(schema.folders()["Cluster"].fragments[0].name_token.as_deref(), Some("CLUSTER"));
    }
}
