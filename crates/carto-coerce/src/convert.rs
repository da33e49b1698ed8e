//! Raw-to-model conversion
//!
//! Provides [`Coercer`], which picks delimiters and converts [`RawValue`]s
//! into [`ModelValue`]s according to a declared [`DataType`].

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    parse_properties, properties_to_string, ConversionError, DataType, ElementKind, ModelValue,
    RawValue, TypeSpec, DEFAULT_PROPERTIES_DELIMITER,
};

static DRIVE_LETTER_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z]:[\\/].*").unwrap_or_else(|e| panic!("invalid drive path pattern: {e}"))
});

/// Path-list separator of the platform this code runs on
#[must_use]
pub const fn native_path_separator() -> char {
    if cfg!(windows) {
        ';'
    } else {
        ':'
    }
}

/// Converts raw tree values into canonical model values
///
/// The only environment-dependent input is the separator used for
/// path-separator-delimited values whose text does not reveal one. It
/// defaults to [`native_path_separator`] and can be pinned with
/// [`Coercer::with_host_path_separator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coercer {
    host_path_separator: char,
}

impl Default for Coercer {
    fn default() -> Self {
        Self::new()
    }
}

impl Coercer {
    /// Coercer using the native path separator
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            host_path_separator: native_path_separator(),
        }
    }

    /// With explicit fallback path separator
    #[inline]
    #[must_use]
    pub fn with_host_path_separator(mut self, separator: char) -> Self {
        self.host_path_separator = separator;
        self
    }

    /// Fallback separator for path-separator-delimited values
    #[inline]
    #[must_use]
    pub fn host_path_separator(&self) -> char {
        self.host_path_separator
    }

    /// Delimiter for values of `ty`
    ///
    /// Fixed for the comma, semicolon and space types. For the
    /// path-separator type it is taken from `sample`: `;` if the sample
    /// contains one or starts with a drive letter, `:` if it contains one,
    /// else the host separator. Non-delimited types have no delimiter.
    #[must_use]
    pub fn delimiter_for(&self, ty: DataType, sample: Option<&str>) -> Option<char> {
        match ty {
            DataType::DelimitedString | DataType::CommaDelimited => Some(','),
            DataType::SemicolonDelimited => Some(';'),
            DataType::SpaceDelimited => Some(' '),
            DataType::PathSeparatorDelimited => Some(self.path_separator_for(sample)),
            _ => None,
        }
    }

    fn path_separator_for(&self, sample: Option<&str>) -> char {
        match sample {
            Some(text) if !text.is_empty() => {
                if text.contains(';') || DRIVE_LETTER_PATH.is_match(text) {
                    ';'
                } else if text.contains(':') {
                    ':'
                } else {
                    self.host_path_separator
                }
            }
            _ => self.host_path_separator,
        }
    }

    /// Pick the conversion type and wire delimiter for an attribute
    ///
    /// Starts from the declared type's delimiter; a read type's delimiter
    /// overrides it. The preferred type's delimiter is only used when none
    /// is known yet, so a wire value whose delimiter differs from the model
    /// delimiter is still split correctly.
    #[must_use]
    pub fn resolve_read_type_and_delimiter(&self, spec: &TypeSpec, value: &RawValue) -> (DataType, Option<char>) {
        let sample = value.as_str();
        let mut data_type = spec.declared;
        let mut delimiter = self.delimiter_for(data_type, sample);

        if let Some(read) = spec.read {
            data_type = read;
            if let Some(read_delimiter) = self.delimiter_for(read, sample) {
                delimiter = Some(read_delimiter);
            }
        }

        if let Some(preferred) = spec.preferred {
            data_type = preferred;
            if delimiter.is_none() {
                delimiter = self.delimiter_for(preferred, sample);
            }
        }

        (data_type, delimiter)
    }

    /// Resolve types for `spec` and convert `value`
    ///
    /// # Errors
    /// See [`Coercer::convert`].
    pub fn coerce(
        &self,
        spec: &TypeSpec,
        subtype: Option<&str>,
        value: &RawValue,
    ) -> Result<Option<ModelValue>, ConversionError> {
        let (data_type, delimiter) = self.resolve_read_type_and_delimiter(spec, value);
        self.convert(data_type, value, subtype, delimiter)
    }

    /// Convert `value` to the canonical form of `ty`
    ///
    /// `delimiter` is the wire delimiter used to split string values into
    /// sequences. Delimited-string results are re-joined with the delimiter
    /// of `ty` itself, not the wire delimiter. Null converts to `None`.
    ///
    /// # Errors
    /// - [`ConversionError::InvalidValue`] if the value cannot represent `ty`
    /// - [`ConversionError::MalformedElementKind`] for a bad array subtype
    /// - [`ConversionError::MalformedProperties`] for a bad properties string
    pub fn convert(
        &self,
        ty: DataType,
        value: &RawValue,
        subtype: Option<&str>,
        delimiter: Option<char>,
    ) -> Result<Option<ModelValue>, ConversionError> {
        if value.is_null() {
            return Ok(None);
        }

        let converted = match ty {
            DataType::Password => ModelValue::Password(decode_password(value)?),
            DataType::Boolean => ModelValue::Bool(convert_boolean(value)),
            DataType::Integer => {
                let wide = to_i64(ty, value)?;
                let narrow = i32::try_from(wide).map_err(|_| invalid(ty, value))?;
                ModelValue::Int(narrow)
            }
            DataType::Long => ModelValue::Long(to_i64(ty, value)?),
            DataType::Double => ModelValue::Double(to_f64(ty, value)?),
            DataType::String => ModelValue::String(to_text(ty, value, delimiter)?),
            DataType::Properties => ModelValue::Properties(to_properties(ty, value, delimiter)?),
            DataType::List => {
                let items = to_sequence(ty, value, delimiter)?;
                ModelValue::List(items.into_iter().map(ModelValue::String).collect())
            }
            DataType::Array => {
                let kind = ElementKind::resolve(subtype)?;
                let items = to_sequence(ty, value, delimiter)?
                    .into_iter()
                    .map(|item| convert_element(&kind, item))
                    .collect::<Result<Vec<_>, _>>()?;
                ModelValue::Array {
                    kind,
                    items: items.into_boxed_slice(),
                }
            }
            DataType::DelimitedString
            | DataType::CommaDelimited
            | DataType::SemicolonDelimited
            | DataType::SpaceDelimited
            | DataType::PathSeparatorDelimited => {
                let wire = delimiter.or_else(|| self.delimiter_for(ty, value.as_str()));
                let items = to_sequence(ty, value, wire)?;
                // The joined value is a sequence, so the path-separator type
                // falls back to the host separator here.
                let model = self.delimiter_for(ty, None).unwrap_or(',');
                ModelValue::String(items.join(&model.to_string()))
            }
        };

        tracing::trace!("converted {:?} to {} value {:?}", value, ty, converted);
        Ok(Some(converted))
    }
}

/// Interpret a raw value as a boolean
///
/// True only for `true`, `1` and the string `"true"` in any case; every other
/// input, including null, is false.
#[must_use]
pub fn convert_boolean(value: &RawValue) -> bool {
    match value {
        RawValue::Bool(b) => *b,
        RawValue::Int(i) => *i == 1,
        RawValue::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn invalid(ty: DataType, value: &RawValue) -> ConversionError {
    let shown = match ty {
        DataType::Password => "<secret>".to_string(),
        _ => value.scalar_text().unwrap_or_else(|| format!("{value:?}")),
    };
    ConversionError::InvalidValue { ty, value: shown }
}

fn decode_password(value: &RawValue) -> Result<String, ConversionError> {
    match value {
        RawValue::Bytes(bytes) => {
            String::from_utf8(bytes.clone()).map_err(|_| invalid(DataType::Password, value))
        }
        RawValue::String(s) => Ok(s.clone()),
        _ => Err(invalid(DataType::Password, value)),
    }
}

fn to_i64(ty: DataType, value: &RawValue) -> Result<i64, ConversionError> {
    match value {
        RawValue::Int(i) => Ok(*i),
        #[allow(clippy::cast_possible_truncation)]
        RawValue::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e18 => Ok(*f as i64),
        RawValue::String(s) => s.trim().parse().map_err(|_| invalid(ty, value)),
        _ => Err(invalid(ty, value)),
    }
}

fn to_f64(ty: DataType, value: &RawValue) -> Result<f64, ConversionError> {
    match value {
        #[allow(clippy::cast_precision_loss)]
        RawValue::Int(i) => Ok(*i as f64),
        RawValue::Float(f) => Ok(*f),
        RawValue::String(s) => s.trim().parse().map_err(|_| invalid(ty, value)),
        _ => Err(invalid(ty, value)),
    }
}

fn to_text(ty: DataType, value: &RawValue, delimiter: Option<char>) -> Result<String, ConversionError> {
    match value {
        RawValue::List(_) => Ok(to_sequence(ty, value, delimiter)?.join(&delimiter.unwrap_or(',').to_string())),
        RawValue::Map(_) => Ok(properties_to_string(
            &to_properties(ty, value, delimiter)?,
            delimiter.unwrap_or(DEFAULT_PROPERTIES_DELIMITER),
        )),
        other => other.scalar_text().ok_or_else(|| invalid(ty, value)),
    }
}

fn to_properties(
    ty: DataType,
    value: &RawValue,
    delimiter: Option<char>,
) -> Result<IndexMap<String, String>, ConversionError> {
    match value {
        RawValue::Map(map) => map
            .iter()
            .map(|(k, v)| {
                let text = v.scalar_text().ok_or_else(|| invalid(ty, value))?;
                Ok((k.clone(), text))
            })
            .collect(),
        RawValue::String(s) => parse_properties(s, delimiter.unwrap_or(DEFAULT_PROPERTIES_DELIMITER)),
        _ => Err(invalid(ty, value)),
    }
}

fn to_sequence(ty: DataType, value: &RawValue, delimiter: Option<char>) -> Result<Vec<String>, ConversionError> {
    match value {
        RawValue::String(s) => Ok(s
            .split(delimiter.unwrap_or(','))
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()),
        RawValue::List(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(|item| item.scalar_text().ok_or_else(|| invalid(ty, value)))
            .collect(),
        RawValue::Map(_) => Err(invalid(ty, value)),
        other => Ok(other.scalar_text().into_iter().collect()),
    }
}

fn convert_element(kind: &ElementKind, item: String) -> Result<ModelValue, ConversionError> {
    let element = match kind {
        ElementKind::String | ElementKind::Reference(_) => ModelValue::String(item),
        ElementKind::Boolean => ModelValue::Bool(item.eq_ignore_ascii_case("true")),
        ElementKind::Integer => ModelValue::Int(item.trim().parse().map_err(|_| ConversionError::InvalidValue {
            ty: DataType::Integer,
            value: item.clone(),
        })?),
        ElementKind::Long => ModelValue::Long(item.trim().parse().map_err(|_| ConversionError::InvalidValue {
            ty: DataType::Long,
            value: item.clone(),
        })?),
    };
    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn coercer() -> Coercer {
        Coercer::new().with_host_path_separator(':')
    }

    fn s(text: &str) -> RawValue {
        RawValue::String(text.to_string())
    }

    #[test]
    fn delimiter_fixed_types() {
        let c = coercer();
        assert_eq!(c.delimiter_for(DataType::CommaDelimited, None), Some(','));
        assert_eq!(c.delimiter_for(DataType::DelimitedString, None), Some(','));
        assert_eq!(c.delimiter_for(DataType::SemicolonDelimited, None), Some(';'));
        assert_eq!(c.delimiter_for(DataType::SpaceDelimited, None), Some(' '));
        assert_eq!(c.delimiter_for(DataType::String, Some("a,b")), None);
    }

    #[test]
    fn delimiter_path_separator_from_sample() {
        let c = coercer();
        let ty = DataType::PathSeparatorDelimited;
        assert_eq!(c.delimiter_for(ty, Some(r"C:\a;D:\b")), Some(';'));
        assert_eq!(c.delimiter_for(ty, Some(r"C:\only")), Some(';'));
        assert_eq!(c.delimiter_for(ty, Some("/a:/b")), Some(':'));
        assert_eq!(c.delimiter_for(ty, Some("/single")), Some(':'));
        assert_eq!(
            Coercer::new().with_host_path_separator(';').delimiter_for(ty, Some("/single")),
            Some(';')
        );
    }

    #[test]
    fn read_type_overrides_declared_delimiter() {
        let c = coercer();
        let spec = TypeSpec::new(DataType::CommaDelimited).with_read(DataType::SemicolonDelimited);
        assert_eq!(
            c.resolve_read_type_and_delimiter(&spec, &s("a;b")),
            (DataType::SemicolonDelimited, Some(';'))
        );
    }

    #[test]
    fn preferred_delimiter_ignored_when_wire_known() {
        let c = coercer();
        let spec = TypeSpec::new(DataType::CommaDelimited).with_preferred(DataType::SemicolonDelimited);
        assert_eq!(
            c.resolve_read_type_and_delimiter(&spec, &s("a,b,c")),
            (DataType::SemicolonDelimited, Some(','))
        );
    }

    #[test]
    fn preferred_delimiter_used_when_none_known() {
        let c = coercer();
        let spec = TypeSpec::new(DataType::String).with_preferred(DataType::SpaceDelimited);
        assert_eq!(
            c.resolve_read_type_and_delimiter(&spec, &s("a b")),
            (DataType::SpaceDelimited, Some(' '))
        );
    }

    #[test]
    fn comma_value_rejoined_with_preferred_semicolon() {
        let c = coercer();
        let spec = TypeSpec::new(DataType::CommaDelimited).with_preferred(DataType::SemicolonDelimited);
        let value = c.coerce(&spec, None, &s("a,b,c")).unwrap();
        assert_eq!(value, Some(ModelValue::String("a;b;c".into())));
    }

    #[test]
    fn convert_null_is_none() {
        let c = coercer();
        assert_eq!(c.convert(DataType::String, &RawValue::Null, None, None).unwrap(), None);
    }

    #[test]
    fn convert_long_is_distinct() {
        let c = coercer();
        assert_eq!(
            c.convert(DataType::Long, &s("9000000000"), None, None).unwrap(),
            Some(ModelValue::Long(9_000_000_000))
        );
        assert_eq!(
            c.convert(DataType::Integer, &RawValue::Int(7001), None, None).unwrap(),
            Some(ModelValue::Int(7001))
        );
        assert!(matches!(
            c.convert(DataType::Integer, &RawValue::Int(9_000_000_000), None, None),
            Err(ConversionError::InvalidValue { .. })
        ));
    }

    #[test]
    fn convert_double() {
        let c = coercer();
        assert_eq!(
            c.convert(DataType::Double, &s(" 2.5 "), None, None).unwrap(),
            Some(ModelValue::Double(2.5))
        );
        assert_eq!(
            c.convert(DataType::Double, &RawValue::Int(3), None, None).unwrap(),
            Some(ModelValue::Double(3.0))
        );
    }

    #[test]
    fn convert_password_bytes_exact() {
        let c = coercer();
        let secret = "{AES256}q+Z/é=".as_bytes().to_vec();
        assert_eq!(
            c.convert(DataType::Password, &RawValue::Bytes(secret), None, None).unwrap(),
            Some(ModelValue::Password("{AES256}q+Z/é=".into()))
        );
    }

    #[test]
    fn convert_password_rejects_invalid_bytes_without_leaking() {
        let c = coercer();
        let err = c
            .convert(DataType::Password, &RawValue::Bytes(vec![0xff, 0xfe]), None, None)
            .unwrap_err();
        assert_eq!(
            err,
            ConversionError::InvalidValue {
                ty: DataType::Password,
                value: "<secret>".into()
            }
        );
    }

    #[test]
    fn convert_list_from_string_and_list() {
        let c = coercer();
        let expected = Some(ModelValue::List(vec![
            ModelValue::String("a".into()),
            ModelValue::String("b".into()),
        ]));
        assert_eq!(c.convert(DataType::List, &s("a, b,"), None, Some(',')).unwrap(), expected);
        assert_eq!(
            c.convert(DataType::List, &RawValue::List(vec![s("a"), RawValue::Null, s("b")]), None, None)
                .unwrap(),
            expected
        );
    }

    #[test]
    fn convert_array_of_strings() {
        let c = coercer();
        let value = c
            .convert(DataType::Array, &RawValue::List(vec![s("x"), s("y")]), None, None)
            .unwrap()
            .unwrap();
        let ModelValue::Array { kind, items } = value else {
            panic!("expected array");
        };
        assert_eq!(kind, ElementKind::String);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn convert_array_named_kind() {
        let c = coercer();
        let value = c
            .convert(DataType::Array, &s("ms1,ms2"), Some("weblogic.ServerMBean"), Some(','))
            .unwrap()
            .unwrap();
        assert!(matches!(value, ModelValue::Array { kind: ElementKind::Reference(_), .. }));
    }

    #[test]
    fn convert_array_bad_kind() {
        let c = coercer();
        assert!(matches!(
            c.convert(DataType::Array, &s("a"), Some("not a kind!"), None),
            Err(ConversionError::MalformedElementKind(_))
        ));
    }

    #[test]
    fn convert_path_separator_rejoins_with_host() {
        let c = coercer();
        let value = c
            .coerce(&TypeSpec::new(DataType::PathSeparatorDelimited), None, &s(r"C:\a;D:\b"))
            .unwrap();
        assert_eq!(value, Some(ModelValue::String(r"C:\a:D:\b".into())));
    }

    #[test]
    fn convert_space_delimited() {
        let c = coercer();
        let value = c
            .coerce(&TypeSpec::new(DataType::SpaceDelimited), None, &s("-Xms512m  -Xmx1g"))
            .unwrap();
        assert_eq!(value, Some(ModelValue::String("-Xms512m -Xmx1g".into())));
    }

    #[test]
    fn convert_properties_from_string_and_map() {
        let c = coercer();
        let value = c.convert(DataType::Properties, &s("a=1,b=2"), None, None).unwrap().unwrap();
        assert_eq!(value.to_string(), "a=1,b=2");

        let mut map = IndexMap::new();
        map.insert("user".to_string(), RawValue::String("scott".into()));
        map.insert("port".to_string(), RawValue::Int(1521));
        let value = c.convert(DataType::Properties, &RawValue::Map(map), None, None).unwrap().unwrap();
        assert_eq!(value.to_string(), "user=scott,port=1521");
    }

    #[test]
    fn convert_string_from_number() {
        let c = coercer();
        assert_eq!(
            c.convert(DataType::String, &RawValue::Int(5), None, None).unwrap(),
            Some(ModelValue::String("5".into()))
        );
    }

    #[test]
    fn boolean_conversion_rules() {
        assert!(convert_boolean(&RawValue::Bool(true)));
        assert!(convert_boolean(&RawValue::Int(1)));
        assert!(convert_boolean(&s("TRUE")));
        assert!(!convert_boolean(&RawValue::Bool(false)));
        assert!(!convert_boolean(&RawValue::Int(0)));
        assert!(!convert_boolean(&s("False")));
        assert!(!convert_boolean(&RawValue::Int(2)));
        assert!(!convert_boolean(&s("yes")));
        assert!(!convert_boolean(&RawValue::Null));
    }
}
