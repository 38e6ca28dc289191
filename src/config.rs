use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ProfileError;
use crate::profile::{Profile, ProfileTree};
use crate::scalar::ScalarString;

/// Contents of ~/.config/envp/config.yaml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Qualified name of the profile used when none is given
    #[serde(skip_serializing_if = "String::is_empty")]
    pub default: String,

    /// All profiles, keyed by their first name segment
    #[serde(skip_serializing_if = "ProfileTree::is_empty")]
    pub profiles: ProfileTree,
}

#[derive(Deserialize)]
struct RawConfig {
    #[serde(default)]
    default: Option<ScalarString>,
    #[serde(default)]
    profiles: serde_yaml::Value,
}

impl Config {
    /// Build a config from an already parsed YAML document.
    pub fn from_value(value: serde_yaml::Value) -> Result<Self, ProfileError> {
        if value.is_null() {
            return Ok(Self::default());
        }

        let raw: RawConfig = serde_yaml::from_value(value)
            .map_err(|e| ProfileError::MalformedProfileData(e.to_string()))?;

        Ok(Self {
            default: raw.default.map(|d| d.0).unwrap_or_default(),
            profiles: ProfileTree::from_value(raw.profiles)?,
        })
    }

    pub fn to_value(&self) -> Result<serde_yaml::Value, ProfileError> {
        serde_yaml::to_value(self).map_err(|e| ProfileError::MalformedProfileData(e.to_string()))
    }

    /// Read config from file, returning an empty config if the file doesn't exist
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file missing, starting empty");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let value: serde_yaml::Value = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        let config = Self::from_value(value)
            .with_context(|| format!("Invalid config file: {:?}", path))?;
        tracing::debug!(path = %path.display(), default = %config.default, "loaded config");
        Ok(config)
    }

    /// Write config to file atomically.
    ///
    /// Writes to a temp file next to the target and renames it into place, so
    /// the config is never left half written.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let value = self.to_value().context("Failed to serialize config")?;
        let content = serde_yaml::to_string(&value).context("Failed to serialize config")?;

        let temp_path = path.with_extension("yaml.tmp");
        std::fs::write(&temp_path, &content)
            .with_context(|| format!("Failed to write temp config file: {:?}", temp_path))?;

        if let Err(e) = std::fs::rename(&temp_path, path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e).with_context(|| {
                format!("Failed to rename config file: {:?} -> {:?}", temp_path, path)
            });
        }
        tracing::debug!(path = %path.display(), "saved config");
        Ok(())
    }

    /// The profile to use: `explicit` if given, otherwise the default.
    pub fn resolve(&self, explicit: Option<&str>) -> Result<&Profile, ProfileError> {
        resolve(&self.profiles, &self.default, explicit)
    }

    pub fn default_profile(&self) -> Result<&Profile, ProfileError> {
        self.resolve(None)
    }

    /// Whether deleting `name` would remove the default profile.
    pub fn covers_default(&self, name: &str) -> bool {
        !self.default.is_empty()
            && (self.default == name || self.default.starts_with(&format!("{name}.")))
    }
}

/// Pick the profile named `explicit`, falling back to `default_name`.
pub fn resolve<'a>(
    tree: &'a ProfileTree,
    default_name: &str,
    explicit: Option<&str>,
) -> Result<&'a Profile, ProfileError> {
    match explicit {
        Some(name) => tree.find(name),
        None if default_name.is_empty() => Err(ProfileError::NoDefaultConfigured),
        None => tree.find(default_name),
    }
}
