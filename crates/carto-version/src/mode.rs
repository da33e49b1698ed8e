//! Access modes and per-mode range bookkeeping

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::{Version, VersionRange, VersionRangeError};

/// How the management tree is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AccessMode {
    /// Reading persisted configuration without a running server
    #[default]
    Offline,
    /// Connected to a running server
    Online,
}

impl AccessMode {
    /// Lowercase name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::Online => "online",
        }
    }
}

impl FromStr for AccessMode {
    type Err = VersionRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "offline" => Ok(Self::Offline),
            "online" => Ok(Self::Online),
            _ => Err(VersionRangeError::InvalidMode(s.to_string())),
        }
    }
}

impl Display for AccessMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Modes a schema entry applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModeScope {
    /// Offline only
    Offline,
    /// Online only
    Online,
    /// Both modes
    #[default]
    Both,
}

impl ModeScope {
    /// Check whether the scope covers `mode`
    #[inline]
    #[must_use]
    pub fn includes(self, mode: AccessMode) -> bool {
        matches!(
            (self, mode),
            (Self::Both, _)
                | (Self::Offline, AccessMode::Offline)
                | (Self::Online, AccessMode::Online)
        )
    }
}

impl FromStr for ModeScope {
    type Err = VersionRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "offline" => Ok(Self::Offline),
            "online" => Ok(Self::Online),
            "both" => Ok(Self::Both),
            _ => Err(VersionRangeError::InvalidMode(s.to_string())),
        }
    }
}

impl From<AccessMode> for ModeScope {
    fn from(mode: AccessMode) -> Self {
        match mode {
            AccessMode::Offline => Self::Offline,
            AccessMode::Online => Self::Online,
        }
    }
}

/// The product version and access mode a discovery pass runs against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Connected product version
    pub version: Version,
    /// Connection mode
    pub mode: AccessMode,
}

impl Target {
    /// Create target
    #[inline]
    #[must_use]
    pub fn new(version: Version, mode: AccessMode) -> Self {
        Self { version, mode }
    }

    /// Check whether an entry scoped by `range` and `scope` applies
    #[inline]
    #[must_use]
    pub fn admits(&self, range: &VersionRange, scope: ModeScope) -> bool {
        scope.includes(self.mode) && range.contains(&self.version)
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.mode, self.version)
    }
}

/// Accumulated version coverage per access mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeByMode {
    offline: Option<VersionRange>,
    online: Option<VersionRange>,
}

impl RangeByMode {
    /// Create empty coverage
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Coverage for a single mode
    #[inline]
    #[must_use]
    pub fn get(&self, mode: AccessMode) -> Option<&VersionRange> {
        match mode {
            AccessMode::Offline => self.offline.as_ref(),
            AccessMode::Online => self.online.as_ref(),
        }
    }

    /// Check whether no range has been recorded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offline.is_none() && self.online.is_none()
    }

    /// Fold `range` into the entries selected by `scope`
    ///
    /// `Both` updates the offline and online entries independently. Each
    /// entry is widened with [`VersionRange::merge`].
    pub fn update(&mut self, scope: ModeScope, range: &VersionRange) {
        match scope {
            ModeScope::Both => {
                Self::update_slot(&mut self.offline, AccessMode::Offline, range);
                Self::update_slot(&mut self.online, AccessMode::Online, range);
            }
            ModeScope::Offline => Self::update_slot(&mut self.offline, AccessMode::Offline, range),
            ModeScope::Online => Self::update_slot(&mut self.online, AccessMode::Online, range),
        }
    }

    fn update_slot(slot: &mut Option<VersionRange>, mode: AccessMode, range: &VersionRange) {
        *slot = Some(match slot.take() {
            None => range.clone(),
            Some(current) => {
                if current.leaves_gap_with(range) {
                    tracing::warn!(
                        "merging disjoint {} ranges {} and {} also covers the versions between them",
                        mode,
                        current,
                        range
                    );
                }
                current.merge(range)
            }
        });
    }
}

impl Display for RangeByMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let show = |r: &Option<VersionRange>| r.as_ref().map_or_else(|| "none".to_string(), ToString::to_string);
        write!(f, "offline {}, online {}", show(&self.offline), show(&self.online))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(s: &str) -> VersionRange {
        s.parse().unwrap()
    }

    #[test]
    fn mode_parse() {
        assert_eq!("Offline".parse::<AccessMode>().unwrap(), AccessMode::Offline);
        assert_eq!("both".parse::<ModeScope>().unwrap(), ModeScope::Both);
        assert!("sideways".parse::<ModeScope>().is_err());
    }

    #[test]
    fn scope_includes() {
        assert!(ModeScope::Both.includes(AccessMode::Online));
        assert!(ModeScope::Offline.includes(AccessMode::Offline));
        assert!(!ModeScope::Offline.includes(AccessMode::Online));
    }

    #[test]
    fn target_admits() {
        let target = Target::new("12.2.1".parse().unwrap(), AccessMode::Online);
        assert!(target.admits(&r("[12,)"), ModeScope::Both));
        assert!(!target.admits(&r("[12,)"), ModeScope::Offline));
        assert!(!target.admits(&r("[10,12)"), ModeScope::Online));
    }

    #[test]
    fn update_both_updates_each_mode() {
        let mut ranges = RangeByMode::new();
        ranges.update(ModeScope::Offline, &r("[10,12)"));
        ranges.update(ModeScope::Both, &r("[11,13]"));

        assert_eq!(ranges.get(AccessMode::Offline).unwrap().to_string(), "[10,13]");
        assert_eq!(ranges.get(AccessMode::Online).unwrap().to_string(), "[11,13]");
    }

    #[test]
    fn update_single_mode_leaves_other() {
        let mut ranges = RangeByMode::new();
        ranges.update(ModeScope::Online, &r("[12,)"));
        assert!(ranges.get(AccessMode::Offline).is_none());
        assert!(!ranges.is_empty());
    }

    #[test]
    fn update_disjoint_still_merges() {
        let mut ranges = RangeByMode::new();
        ranges.update(ModeScope::Offline, &r("[10,11)"));
        ranges.update(ModeScope::Offline, &r("[12,13)"));
        assert_eq!(ranges.get(AccessMode::Offline).unwrap().to_string(), "[10,13)");
    }
}
