//! Discovery configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use carto_coerce::Coercer;
use carto_version::{AccessMode, Target, Version};

use crate::DiscoverError;

/// Settings of one discovery pass
///
/// Loadable from TOML:
///
/// ```toml
/// product_version = "12.2.1.4"
/// mode = "online"
/// host_path_separator = ";"
/// archive_attributes = ["KeyStore", "SourcePath"]
/// domain_home = "/u01/domains/base"
/// excluded_roots = ["/u01/oracle"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoverConfig {
    /// Version of the product being discovered
    pub product_version: Option<String>,
    /// `offline` or `online`
    pub mode: String,
    /// Separator for ambiguous path lists; the platform's own when unset
    pub host_path_separator: Option<char>,
    /// Model attributes whose file values are archived
    pub archive_attributes: Vec<String>,
    /// Directory relative file values are resolved against
    pub domain_home: Option<PathBuf>,
    /// Roots whose files are never archived
    pub excluded_roots: Vec<PathBuf>,
}

impl Default for DiscoverConfig {
    fn default() -> Self {
        Self {
            product_version: None,
            mode: AccessMode::Offline.as_str().to_string(),
            host_path_separator: None,
            archive_attributes: Vec::new(),
            domain_home: None,
            excluded_roots: Vec::new(),
        }
    }
}

impl DiscoverConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML configuration
    ///
    /// # Errors
    /// [`DiscoverError::Config`] on malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, DiscoverError> {
        toml::from_str(text).map_err(|e| DiscoverError::Config(e.to_string()))
    }

    /// Read a TOML configuration file
    ///
    /// # Errors
    /// [`DiscoverError::Config`] if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DiscoverError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| DiscoverError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// With product version
    #[inline]
    #[must_use]
    pub fn with_product_version(mut self, version: impl Into<String>) -> Self {
        self.product_version = Some(version.into());
        self
    }

    /// With access mode
    #[inline]
    #[must_use]
    pub fn with_mode(mut self, mode: AccessMode) -> Self {
        self.mode = mode.as_str().to_string();
        self
    }

    /// With fallback path separator
    #[inline]
    #[must_use]
    pub fn with_host_path_separator(mut self, separator: char) -> Self {
        self.host_path_separator = Some(separator);
        self
    }

    /// With an archived attribute
    #[inline]
    #[must_use]
    pub fn with_archive_attribute(mut self, name: impl Into<String>) -> Self {
        self.archive_attributes.push(name.into());
        self
    }

    /// With domain home
    #[inline]
    #[must_use]
    pub fn with_domain_home(mut self, domain_home: impl Into<PathBuf>) -> Self {
        self.domain_home = Some(domain_home.into());
        self
    }

    /// Version and mode to discover against
    ///
    /// # Errors
    /// [`DiscoverError::Config`] without a product version,
    /// [`DiscoverError::VersionRange`] if the version or mode does not parse.
    pub fn target(&self) -> Result<Target, DiscoverError> {
        let version: Version = self
            .product_version
            .as_deref()
            .ok_or_else(|| DiscoverError::Config("product_version is required".to_string()))?
            .parse()?;
        let mode: AccessMode = self.mode.parse()?;
        Ok(Target::new(version, mode))
    }

    /// Coercer honouring the configured path separator
    #[must_use]
    pub fn coercer(&self) -> Coercer {
        match self.host_path_separator {
            Some(separator) => Coercer::new().with_host_path_separator(separator),
            None => Coercer::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = DiscoverConfig::new();
        assert_eq!(config.mode, "offline");
        assert!(matches!(config.target(), Err(DiscoverError::Config(_))));
    }

    #[test]
    fn config_from_toml() {
        let config = DiscoverConfig::from_toml_str(
            r#"
product_version = "12.2.1.4"
mode = "online"
host_path_separator = ";"
archive_attributes = ["KeyStore"]
"#,
        )
        .unwrap();
        let target = config.target().unwrap();
        assert_eq!(target.mode, AccessMode::Online);
        assert_eq!(target.version, "12.2.1.4".parse().unwrap());
        assert_eq!(config.coercer().host_path_separator(), ';');
        assert_eq!(config.archive_attributes, vec!["KeyStore"]);
    }

    #[test]
    fn config_rejects_unknown_key() {
        assert!(matches!(
            DiscoverConfig::from_toml_str("verbose = true"),
            Err(DiscoverError::Config(_))
        ));
    }

    #[test]
    fn config_bad_mode() {
        let config = DiscoverConfig::new().with_product_version("12.2.1");
        let config = DiscoverConfig {
            mode: "sideways".into(),
            ..config
        };
        assert!(matches!(config.target(), Err(DiscoverError::VersionRange(_))));
    }

    #[test]
    fn config_builders() {
        let config = DiscoverConfig::new()
            .with_product_version("14.1.1")
            .with_mode(AccessMode::Online)
            .with_host_path_separator(':')
            .with_archive_attribute("SourcePath")
            .with_domain_home("/u01/domains/base");
        assert_eq!(config.target().unwrap().to_string(), "online 14.1.1");
        assert_eq!(config.domain_home, Some(PathBuf::from("/u01/domains/base")));
    }
}
