//! Product versions
//!
//! Provides [`Version`], a dotted numeric version with zero-padded comparison.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::VersionRangeError;

/// Dotted numeric product version
///
/// Comparison is component-wise and numeric. Missing trailing components
/// compare as zero, so `12.2` and `12.2.0` are equal.
///
/// # Examples
/// - `10.3.6` < `12.1.2`
/// - `12.2.1` == `12.2.1.0`
#[derive(Debug, Clone)]
pub struct Version {
    text: String,
    parts: Vec<u64>,
}

impl Version {
    /// Create version from numeric components
    #[must_use]
    pub fn from_parts(parts: &[u64]) -> Self {
        let text = parts
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(".");
        Self {
            text,
            parts: parts.to_vec(),
        }
    }

    /// Numeric components as written
    #[inline]
    #[must_use]
    pub fn parts(&self) -> &[u64] {
        &self.parts
    }

    /// Original textual form
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Components with trailing zeros removed
    fn significant(&self) -> &[u64] {
        let end = self
            .parts
            .iter()
            .rposition(|p| *p != 0)
            .map_or(0, |i| i + 1);
        &self.parts[..end]
    }
}

impl FromStr for Version {
    type Err = VersionRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Err(VersionRangeError::InvalidVersion(s.to_string()));
        }

        let parts = text
            .split('.')
            .map(|seg| {
                if seg.is_empty() || !seg.bytes().all(|b| b.is_ascii_digit()) {
                    Err(VersionRangeError::InvalidVersion(text.to_string()))
                } else {
                    seg.parse::<u64>()
                        .map_err(|_| VersionRangeError::InvalidVersion(text.to_string()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            text: text.to_string(),
            parts,
        })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        for i in 0..len {
            let a = self.parts.get(i).copied().unwrap_or(0);
            let b = other.parts.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant().hash(state);
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn version_parse_parts() {
        assert_eq!(v("12.2.1.3").parts(), &[12, 2, 1, 3]);
        assert_eq!(v(" 10 ").as_str(), "10");
    }

    #[test]
    fn version_parse_rejects_garbage() {
        assert!("".parse::<Version>().is_err());
        assert!("12..1".parse::<Version>().is_err());
        assert!("12.x".parse::<Version>().is_err());
        assert!("12.1-beta".parse::<Version>().is_err());
    }

    #[test]
    fn version_ordering() {
        assert!(v("10.3.6") < v("12.1.2"));
        assert!(v("12.2.1.3") > v("12.2.1"));
        assert!(v("9") < v("10"));
    }

    #[test]
    fn version_trailing_zeros_equal() {
        assert_eq!(v("12.2"), v("12.2.0.0"));
        assert_eq!(v("12.2").cmp(&v("12.2.0")), Ordering::Equal);
    }

    #[test]
    fn version_display_keeps_text() {
        assert_eq!(v("12.2.1.0").to_string(), "12.2.1.0");
        assert_eq!(Version::from_parts(&[14, 1]).to_string(), "14.1");
    }
}
