//! Raw and canonical values
//!
//! [`RawValue`] is what a tree source hands back; [`ModelValue`] is what the
//! model document stores.

use std::fmt::{self, Display, Formatter};

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};

use crate::ElementKind;

/// Value as read from the management tree
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// No value
    Null,
    /// Boolean
    Bool(bool),
    /// Integer of any width
    Int(i64),
    /// Floating point
    Float(f64),
    /// Text
    String(String),
    /// Uninterpreted bytes, e.g. an encrypted secret
    #[serde(skip)]
    Bytes(Vec<u8>),
    /// Sequence of values
    List(Vec<RawValue>),
    /// Key/value pairs
    Map(IndexMap<String, RawValue>),
}

impl RawValue {
    /// Check for [`RawValue::Null`]
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the text of a [`RawValue::String`]
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Scalar rendered as text; `None` for null and collections
    #[must_use]
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::String(s) => Some(s.clone()),
            Self::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
            Self::Null | Self::List(_) | Self::Map(_) => None,
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for RawValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for RawValue {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for RawValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<RawValue>> for RawValue {
    fn from(items: Vec<RawValue>) -> Self {
        Self::List(items)
    }
}

/// Canonical value stored in a model document
#[derive(Debug, Clone, PartialEq)]
pub enum ModelValue {
    /// Boolean
    Bool(bool),
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer, kept distinct from [`ModelValue::Int`]
    Long(i64),
    /// Floating point
    Double(f64),
    /// Text
    String(String),
    /// Decoded secret text
    Password(String),
    /// Ordered key/value pairs
    Properties(IndexMap<String, String>),
    /// Ordered sequence
    List(Vec<ModelValue>),
    /// Fixed-size array of a single element kind
    Array {
        /// Kind of every element
        kind: ElementKind,
        /// Elements
        items: Box<[ModelValue]>,
    },
}

impl ModelValue {
    /// Check whether the value carries no content
    ///
    /// Empty text and empty collections are empty; numbers and booleans never are.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::String(s) | Self::Password(s) => s.is_empty(),
            Self::Properties(p) => p.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Array { items, .. } => items.is_empty(),
            Self::Bool(_) | Self::Int(_) | Self::Long(_) | Self::Double(_) => false,
        }
    }

    /// Borrow the text of a string or password value
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Password(s) => Some(s),
            _ => None,
        }
    }
}

impl Display for ModelValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Long(l) => write!(f, "{l}"),
            Self::Double(d) => write!(f, "{d}"),
            Self::String(s) | Self::Password(s) => f.write_str(s),
            Self::Properties(p) => {
                f.write_str(&crate::properties_to_string(p, crate::DEFAULT_PROPERTIES_DELIMITER))
            }
            Self::List(items) => write_joined(f, items.iter()),
            Self::Array { items, .. } => write_joined(f, items.iter()),
        }
    }
}

fn write_joined<'a>(f: &mut Formatter<'_>, items: impl Iterator<Item = &'a ModelValue>) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl Serialize for ModelValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i32(*i),
            Self::Long(l) => serializer.serialize_i64(*l),
            Self::Double(d) => serializer.serialize_f64(*d),
            Self::String(s) | Self::Password(s) => serializer.serialize_str(s),
            Self::Properties(p) => {
                let mut map = serializer.serialize_map(Some(p.len()))?;
                for (k, v) in p {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Self::List(items) => serialize_items(serializer, items),
            Self::Array { items, .. } => serialize_items(serializer, items),
        }
    }
}

fn serialize_items<S: Serializer>(serializer: S, items: &[ModelValue]) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(items.len()))?;
    for item in items {
        seq.serialize_element(item)?;
    }
    seq.end()
}
