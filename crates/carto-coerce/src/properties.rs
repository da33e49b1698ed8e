//! `key=value` property strings

use indexmap::IndexMap;

use crate::ConversionError;

/// Delimiter between properties when none is declared
pub const DEFAULT_PROPERTIES_DELIMITER: char = ',';

/// Parse `a=1,b=2` into ordered properties
///
/// Keys and values are trimmed. An empty string yields no properties.
///
/// # Errors
/// Returns [`ConversionError::MalformedProperties`] if an element is not a
/// single `key=value` pair.
pub fn parse_properties(text: &str, delimiter: char) -> Result<IndexMap<String, String>, ConversionError> {
    let mut props = IndexMap::new();
    if text.trim().is_empty() {
        return Ok(props);
    }

    for element in text.split(delimiter) {
        let pair: Vec<&str> = element.trim().split('=').collect();
        match pair.as_slice() {
            [key, value] => {
                props.insert(key.trim().to_string(), value.trim().to_string());
            }
            _ => return Err(ConversionError::MalformedProperties(text.to_string())),
        }
    }
    Ok(props)
}

/// Render properties as `a=1,b=2`
#[must_use]
pub fn properties_to_string(props: &IndexMap<String, String>, delimiter: char) -> String {
    let mut out = String::new();
    for (key, value) in props {
        if !out.is_empty() {
            out.push(delimiter);
        }
        out.push_str(key);
        out.push('=');
        out.push_str(value);
    }
    out
}
