//! Version ranges
//!
//! Provides [`VersionRange`], an interval of product versions written as
//! `[low,high)` with inclusive (`[`/`]`) or exclusive (`(`/`)`) bounds.
//! An empty high end (`[12.1.2,)`) is unbounded.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::{Version, VersionRangeError};

/// One end of a range
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bound {
    /// Version at this end
    pub version: Version,
    /// Whether the version itself is included
    pub inclusive: bool,
}

impl Bound {
    /// Inclusive bound
    #[inline]
    #[must_use]
    pub fn inclusive(version: Version) -> Self {
        Self {
            version,
            inclusive: true,
        }
    }

    /// Exclusive bound
    #[inline]
    #[must_use]
    pub fn exclusive(version: Version) -> Self {
        Self {
            version,
            inclusive: false,
        }
    }
}

/// Interval of applicable product versions
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionRange {
    low: Bound,
    high: Option<Bound>,
}

impl VersionRange {
    /// Create range from explicit bounds; `None` high means unbounded
    #[inline]
    #[must_use]
    pub fn new(low: Bound, high: Option<Bound>) -> Self {
        Self { low, high }
    }

    /// Range covering every version from `low` (inclusive) upward
    #[inline]
    #[must_use]
    pub fn at_least(low: Version) -> Self {
        Self::new(Bound::inclusive(low), None)
    }

    /// Range covering every version
    #[must_use]
    pub fn all() -> Self {
        Self::at_least(Version::from_parts(&[0]))
    }

    /// Lower bound
    #[inline]
    #[must_use]
    pub fn low(&self) -> &Bound {
        &self.low
    }

    /// Upper bound, `None` when unbounded
    #[inline]
    #[must_use]
    pub fn high(&self) -> Option<&Bound> {
        self.high.as_ref()
    }

    /// Check whether the upper end is unbounded
    #[inline]
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.high.is_none()
    }

    /// Check whether `version` lies within the range
    #[must_use]
    pub fn contains(&self, version: &Version) -> bool {
        let above_low = match version.cmp(&self.low.version) {
            Ordering::Greater => true,
            Ordering::Equal => self.low.inclusive,
            Ordering::Less => false,
        };
        let below_high = match &self.high {
            None => true,
            Some(high) => match version.cmp(&high.version) {
                Ordering::Less => true,
                Ordering::Equal => high.inclusive,
                Ordering::Greater => false,
            },
        };
        above_low && below_high
    }

    /// Envelope of two ranges
    ///
    /// The lower bound is the smaller of the two lows and the upper bound the
    /// larger of the two highs; an unbounded high on either side makes the
    /// result unbounded. When the compared versions are equal the inclusive
    /// bound wins.
    ///
    /// The inputs are not required to overlap: merging `[10,11)` with
    /// `[12,13)` yields `[10,13)`, which also covers the gap between them.
    /// Use [`VersionRange::merge_contiguous`] to reject that case.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let low = match self.low.version.cmp(&other.low.version) {
            Ordering::Greater => other.low.clone(),
            Ordering::Less => self.low.clone(),
            Ordering::Equal => Bound {
                version: self.low.version.clone(),
                inclusive: self.low.inclusive || other.low.inclusive,
            },
        };

        let high = match (&self.high, &other.high) {
            (Some(a), Some(b)) => Some(match a.version.cmp(&b.version) {
                Ordering::Greater => a.clone(),
                Ordering::Less => b.clone(),
                Ordering::Equal => Bound {
                    version: a.version.clone(),
                    inclusive: a.inclusive || b.inclusive,
                },
            }),
            _ => None,
        };

        Self { low, high }
    }

    /// Envelope of two ranges that must overlap or touch
    ///
    /// # Errors
    /// Returns [`VersionRangeError::Disjoint`] if the envelope would cover
    /// versions contained in neither input.
    pub fn merge_contiguous(&self, other: &Self) -> Result<Self, VersionRangeError> {
        if self.leaves_gap_with(other) {
            return Err(VersionRangeError::Disjoint {
                first: self.to_string(),
                second: other.to_string(),
            });
        }
        Ok(self.merge(other))
    }

    /// Check whether the envelope of `self` and `other` would contain
    /// versions that belong to neither range
    #[must_use]
    pub fn leaves_gap_with(&self, other: &Self) -> bool {
        let (first, second) = if self.low.version <= other.low.version {
            (self, other)
        } else {
            (other, self)
        };

        match &first.high {
            None => false,
            Some(high) => match high.version.cmp(&second.low.version) {
                Ordering::Greater => false,
                Ordering::Less => true,
                Ordering::Equal => !high.inclusive && !second.low.inclusive,
            },
        }
    }
}

impl FromStr for VersionRange {
    type Err = VersionRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let low_inclusive = match text.chars().next() {
            Some('[') => true,
            Some('(') => false,
            _ => return Err(VersionRangeError::MissingBracket(s.to_string())),
        };
        let high_inclusive = match text.chars().last() {
            Some(']') if text.len() > 1 => true,
            Some(')') if text.len() > 1 => false,
            _ => return Err(VersionRangeError::MissingBracket(s.to_string())),
        };

        let inner = &text[1..text.len() - 1];
        let mut pieces = inner.split(',');
        let low_text = pieces.next().unwrap_or_default();
        let high_text = pieces.next();
        if pieces.next().is_some() {
            return Err(VersionRangeError::Malformed(s.to_string()));
        }

        let low = Bound {
            version: low_text.parse()?,
            inclusive: low_inclusive,
        };

        let high = match high_text {
            // `[12.1.2]` names a single version
            None => Some(Bound {
                version: low.version.clone(),
                inclusive: high_inclusive,
            }),
            Some(h) if h.trim().is_empty() => None,
            Some(h) => Some(Bound {
                version: h.parse()?,
                inclusive: high_inclusive,
            }),
        };

        Ok(Self { low, high })
    }
}

impl Display for VersionRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let open = if self.low.inclusive { '[' } else { '(' };
        write!(f, "{open}{},", self.low.version)?;
        match &self.high {
            Some(high) => {
                let close = if high.inclusive { ']' } else { ')' };
                write!(f, "{}{close}", high.version)
            }
            None => f.write_str(")"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(s: &str) -> VersionRange {
        s.parse().unwrap()
    }

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn range_parse_bounds() {
        let range = r("[10,12)");
        assert!(range.low().inclusive);
        assert_eq!(range.low().version, v("10"));
        let high = range.high().unwrap();
        assert!(!high.inclusive);
        assert_eq!(high.version, v("12"));
    }

    #[test]
    fn range_parse_unbounded() {
        let range = r("[12.1.2,)");
        assert!(range.is_unbounded());
        assert_eq!(range.to_string(), "[12.1.2,)");
    }

    #[test]
    fn range_parse_single_version() {
        let range = r("[12.2.1]");
        assert_eq!(range.high().unwrap().version, v("12.2.1"));
        assert!(range.contains(&v("12.2.1")));
        assert!(!range.contains(&v("12.2.1.1")));
    }

    #[test]
    fn range_parse_missing_bracket() {
        assert!(matches!(
            "10,12)".parse::<VersionRange>(),
            Err(VersionRangeError::MissingBracket(_))
        ));
        assert!(matches!(
            "[10,12".parse::<VersionRange>(),
            Err(VersionRangeError::MissingBracket(_))
        ));
        assert!(matches!(
            "[".parse::<VersionRange>(),
            Err(VersionRangeError::MissingBracket(_))
        ));
    }

    #[test]
    fn range_parse_bad_version() {
        assert!(matches!(
            "[ten,12)".parse::<VersionRange>(),
            Err(VersionRangeError::InvalidVersion(_))
        ));
        assert!(matches!(
            "[10,11,12]".parse::<VersionRange>(),
            Err(VersionRangeError::Malformed(_))
        ));
    }

    #[test]
    fn range_contains() {
        let range = r("(10.3,12.2.1]");
        assert!(!range.contains(&v("10.3")));
        assert!(range.contains(&v("10.3.6")));
        assert!(range.contains(&v("12.2.1")));
        assert!(!range.contains(&v("12.2.1.3")));
    }

    #[test]
    fn merge_overlapping() {
        assert_eq!(r("[10,12)").merge(&r("[11,13]")).to_string(), "[10,13]");
    }

    #[test]
    fn merge_disjoint_covers_gap() {
        let merged = r("[10,11)").merge(&r("[12,13)"));
        assert_eq!(merged.to_string(), "[10,13)");
        assert!(merged.contains(&v("11.5")));
    }

    #[test]
    fn merge_ties_prefer_inclusive() {
        assert_eq!(r("(10,12)").merge(&r("[10,12]")).to_string(), "[10,12]");
        assert_eq!(r("(10,12)").merge(&r("(10,12)")).to_string(), "(10,12)");
    }

    #[test]
    fn merge_unbounded_wins() {
        assert_eq!(r("[10,12)").merge(&r("[11,)")).to_string(), "[10,)");
        assert_eq!(r("[11,)").merge(&r("[10,12)")).to_string(), "[10,)");
    }

    #[test]
    fn gap_detection() {
        assert!(r("[10,11)").leaves_gap_with(&r("[12,13)")));
        assert!(r("[12,13)").leaves_gap_with(&r("[10,11)")));
        assert!(!r("[10,11)").leaves_gap_with(&r("[11,13)")));
        assert!(r("[10,11)").leaves_gap_with(&r("(11,13)")));
        assert!(!r("[10,)").leaves_gap_with(&r("[12,13)")));
    }

    #[test]
    fn merge_contiguous_rejects_disjoint() {
        let result = r("[10,11)").merge_contiguous(&r("[12,13)"));
        assert!(matches!(result, Err(VersionRangeError::Disjoint { .. })));
        assert_eq!(
            r("[10,11)").merge_contiguous(&r("[11,13)")).unwrap().to_string(),
            "[10,13)"
        );
    }
}
