//! Declared data types
//!
//! Provides [`DataType`], [`TypeSpec`] and [`ElementKind`].

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ConversionError;

static QUALIFIED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*(\.[A-Za-z_$][A-Za-z0-9_$]*)*$")
        .unwrap_or_else(|e| panic!("invalid element kind pattern: {e}"))
});

/// Data type of an attribute, as declared by the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// `boolean`
    Boolean,
    /// `integer` (32-bit)
    Integer,
    /// `long` (64-bit, kept distinct from `integer`)
    Long,
    /// `double`
    Double,
    /// `string`
    String,
    /// `password`, raw bytes decoded exactly
    Password,
    /// `properties`, ordered key/value pairs
    Properties,
    /// `list`, ordered sequence
    List,
    /// `jarray`, fixed-size typed array
    Array,
    /// `delimited_string` (comma)
    DelimitedString,
    /// `delimited_string[comma]`
    CommaDelimited,
    /// `delimited_string[semicolon]`
    SemicolonDelimited,
    /// `delimited_string[space]`
    SpaceDelimited,
    /// `delimited_string[path_separator]`
    PathSeparatorDelimited,
}

impl DataType {
    /// Schema name of the type
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Double => "double",
            Self::String => "string",
            Self::Password => "password",
            Self::Properties => "properties",
            Self::List => "list",
            Self::Array => "jarray",
            Self::DelimitedString => "delimited_string",
            Self::CommaDelimited => "delimited_string[comma]",
            Self::SemicolonDelimited => "delimited_string[semicolon]",
            Self::SpaceDelimited => "delimited_string[space]",
            Self::PathSeparatorDelimited => "delimited_string[path_separator]",
        }
    }

    /// Check whether the type is one of the delimited-string types
    #[inline]
    #[must_use]
    pub fn is_delimited(self) -> bool {
        matches!(
            self,
            Self::DelimitedString
                | Self::CommaDelimited
                | Self::SemicolonDelimited
                | Self::SpaceDelimited
                | Self::PathSeparatorDelimited
        )
    }

    /// Check whether values of this type are sequences
    #[inline]
    #[must_use]
    pub fn is_sequence(self) -> bool {
        matches!(self, Self::List | Self::Array) || self.is_delimited()
    }
}

impl FromStr for DataType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s.trim() {
            "boolean" => Self::Boolean,
            "integer" => Self::Integer,
            "long" => Self::Long,
            "double" => Self::Double,
            "string" => Self::String,
            "password" => Self::Password,
            "properties" => Self::Properties,
            "list" => Self::List,
            "jarray" => Self::Array,
            "delimited_string" => Self::DelimitedString,
            "delimited_string[comma]" => Self::CommaDelimited,
            "delimited_string[semicolon]" => Self::SemicolonDelimited,
            "delimited_string[space]" => Self::SpaceDelimited,
            "delimited_string[path_separator]" => Self::PathSeparatorDelimited,
            other => return Err(ConversionError::UnknownType(other.to_string())),
        };
        Ok(ty)
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three type declarations an attribute may carry
///
/// `declared` is the type of the value as it sits in the tree, `read` the
/// type used when the attribute is fetched explicitly, and `preferred` the
/// type the model document wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeSpec {
    /// Declared wire type
    pub declared: DataType,
    /// Distinct read type
    pub read: Option<DataType>,
    /// Preferred model type
    pub preferred: Option<DataType>,
}

impl TypeSpec {
    /// Type declaration with only a declared type
    #[inline]
    #[must_use]
    pub fn new(declared: DataType) -> Self {
        Self {
            declared,
            read: None,
            preferred: None,
        }
    }

    /// With read type
    #[inline]
    #[must_use]
    pub fn with_read(mut self, read: DataType) -> Self {
        self.read = Some(read);
        self
    }

    /// With preferred model type
    #[inline]
    #[must_use]
    pub fn with_preferred(mut self, preferred: DataType) -> Self {
        self.preferred = Some(preferred);
        self
    }

    /// The type the canonical value ends up with
    #[inline]
    #[must_use]
    pub fn effective(&self) -> DataType {
        self.preferred.or(self.read).unwrap_or(self.declared)
    }
}

/// Element kind of a fixed-size array
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Plain strings
    String,
    /// 32-bit integers
    Integer,
    /// 64-bit integers
    Long,
    /// Booleans
    Boolean,
    /// References to named tree objects of the given kind
    Reference(String),
}

impl ElementKind {
    /// Resolve an array subtype declaration
    ///
    /// `None` and the string class names resolve to [`ElementKind::String`].
    ///
    /// # Errors
    /// Returns [`ConversionError::MalformedElementKind`] if the subtype is
    /// not a dotted identifier.
    pub fn resolve(subtype: Option<&str>) -> Result<Self, ConversionError> {
        let Some(name) = subtype.map(str::trim) else {
            return Ok(Self::String);
        };
        match name {
            "" | "string" | "java.lang.String" => Ok(Self::String),
            "integer" | "int" | "java.lang.Integer" => Ok(Self::Integer),
            "long" | "java.lang.Long" => Ok(Self::Long),
            "boolean" | "java.lang.Boolean" => Ok(Self::Boolean),
            other if QUALIFIED_NAME.is_match(other) => Ok(Self::Reference(other.to_string())),
            other => Err(ConversionError::MalformedElementKind(other.to_string())),
        }
    }

    /// Name of the kind
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Boolean => "boolean",
            Self::Reference(name) => name,
        }
    }
}
