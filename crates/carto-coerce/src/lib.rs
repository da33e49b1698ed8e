//! Cartograph Type Coercion
//!
//! Converts values read from a management tree into the canonical values a
//! model document stores.
//!
//! # Core Concepts
//!
//! - [`DataType`]: the declared type of an attribute
//! - [`TypeSpec`]: declared, read and preferred types together
//! - [`RawValue`]: a value as the tree hands it back
//! - [`ModelValue`]: the canonical form written to the model
//! - [`Coercer`]: picks delimiters and performs the conversion
//!
//! # Example
//!
//! ```rust
//! use carto_coerce::{Coercer, DataType, ModelValue, RawValue, TypeSpec};
//!
//! let coercer = Coercer::new();
//! let spec = TypeSpec::new(DataType::CommaDelimited).with_preferred(DataType::SemicolonDelimited);
//! let value = coercer.coerce(&spec, None, &RawValue::from("a,b,c")).unwrap();
//! assert_eq!(value, Some(ModelValue::String("a;b;c".into())));
//! ```

#![warn(unreachable_pub)]

mod convert;
mod properties;
mod types;
mod value;

pub use convert::{convert_boolean, native_path_separator, Coercer};
pub use properties::{parse_properties, properties_to_string, DEFAULT_PROPERTIES_DELIMITER};
pub use types::{DataType, ElementKind, TypeSpec};
pub use value::{ModelValue, RawValue};

/// Errors converting a raw value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Type name not known to the coercer
    #[error("unknown data type '{0}'")]
    UnknownType(String),

    /// Array subtype is not a valid element kind
    #[error("malformed array element kind '{0}'")]
    MalformedElementKind(String),

    /// Properties string is not `key=value` pairs
    #[error("malformed properties '{0}'")]
    MalformedProperties(String),

    /// Value cannot be represented as the requested type
    #[error("cannot convert '{value}' to {ty}")]
    InvalidValue {
        /// Requested type
        ty: DataType,
        /// Offending value; secrets are masked
        value: String,
    },
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
