//! Typed site configuration for the engine and synchronizer. Values are
//! passed in explicitly at construction rather than read from process-wide
//! state, and can be loaded from a YAML file.

use std::{fs, path};

use misdirect_urls::join_links;
use serde::{Deserialize, Serialize};

use crate::error::MisdirectionError;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Site-wide settings the resolution engine and mapping synchronizer run
/// against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base path internal redirect targets are joined onto.
    pub base_path: String,
    /// The site's own hostname; absolute URLs on it are treated as local.
    pub site_host: Option<String>,
    /// URL segment the site root is reachable under.
    pub home_segment: String,
    /// Whether derived mappings replace the default URL handling on page
    /// moves and removal.
    pub replace_default: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_path: "/".to_string(),
            site_host: None,
            home_segment: "home".to_string(),
            replace_default: false,
        }
    }
}

impl SiteConfig {
    pub fn from_yaml_file(
        config_file_path: impl AsRef<path::Path>,
    ) -> Result<Self, ConfigError> {
        let content: String = fs::read_to_string(config_file_path)?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Boundary validation for values a configuration file may carry out of
    /// range.
    pub fn validate(&self) -> Result<(), MisdirectionError> {
        if self.base_path.is_empty() || !self.base_path.starts_with('/') {
            return Err(MisdirectionError::InvalidConfiguration(format!(
                "base path must start with a slash, got {:?}",
                self.base_path
            )));
        }
        if self.home_segment.is_empty() || self.home_segment.contains('/') {
            return Err(MisdirectionError::InvalidConfiguration(format!(
                "home segment must be a single URL segment, got {:?}",
                self.home_segment
            )));
        }
        Ok(())
    }

    /// Rewrite the site root's link to the explicit home segment, so the
    /// home page never redirects to the ambiguous bare base path.
    pub fn home_normalized(&self, link: &str) -> String {
        if link == self.base_path {
            let home = format!("{}/", self.home_segment);
            join_links([self.base_path.as_str(), home.as_str()])
        } else {
            link.to_string()
        }
    }
}
