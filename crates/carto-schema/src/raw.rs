//! On-disk schema records
//!
//! Mirrors the document layout exactly; [`crate::load`] turns these into
//! the typed records of [`crate::model`].

use indexmap::IndexMap;
use serde::Deserialize;

use carto_coerce::RawValue;

/// A single value or a list of values
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawSchemaSet {
    #[serde(default)]
    pub(crate) folders: IndexMap<String, OneOrMany<RawFragment>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawFragment {
    #[serde(default)]
    pub(crate) version: Option<String>,
    #[serde(default)]
    pub(crate) wlst_mode: Option<String>,
    #[serde(default)]
    pub(crate) wlst_type: Option<String>,
    #[serde(default)]
    pub(crate) name_token: Option<String>,
    #[serde(default)]
    pub(crate) single_unpredictable_name: bool,
    pub(crate) wlst_attributes_path: String,
    #[serde(default)]
    pub(crate) wlst_subfolders_path: Option<String>,
    #[serde(default)]
    pub(crate) wlst_list_path: Option<String>,
    #[serde(default)]
    pub(crate) wlst_create_path: Option<String>,
    pub(crate) wlst_paths: IndexMap<String, String>,
    #[serde(default)]
    pub(crate) attributes: IndexMap<String, OneOrMany<RawAttribute>>,
    #[serde(default)]
    pub(crate) folders: IndexMap<String, OneOrMany<RawFragment>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawAttribute {
    #[serde(default)]
    pub(crate) version: Option<String>,
    #[serde(default)]
    pub(crate) wlst_mode: Option<String>,
    #[serde(default)]
    pub(crate) wlst_name: Option<String>,
    #[serde(default)]
    pub(crate) wlst_path: Option<String>,
    pub(crate) wlst_type: String,
    #[serde(default)]
    pub(crate) wlst_read_type: Option<String>,
    #[serde(default)]
    pub(crate) preferred_model_type: Option<String>,
    #[serde(default)]
    pub(crate) get_method: Option<String>,
    #[serde(default)]
    pub(crate) subtype: Option<String>,
    #[serde(default)]
    pub(crate) default_value: Option<RawValue>,
}
