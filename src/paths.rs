use anyhow::{Context, Result};
use directories::BaseDirs;
use std::path::PathBuf;

/// Environment variable that overrides the config file location
pub const CONFIG_ENV_VAR: &str = "ENVP_CONFIG";

/// All computed paths used by envp
#[derive(Debug, Clone)]
pub struct Paths {
    /// ~/.config/envp/config.yaml, or the `ENVP_CONFIG` override
    pub config_file: PathBuf,
}

impl Paths {
    pub fn new() -> Result<Self> {
        if let Some(path) = std::env::var(CONFIG_ENV_VAR)
            .ok()
            .filter(|p| !p.trim().is_empty())
        {
            return Ok(Self {
                config_file: PathBuf::from(path),
            });
        }

        let base_dirs = BaseDirs::new().context("Failed to determine home directory")?;
        let config_file = base_dirs
            .home_dir()
            .join(".config")
            .join("envp")
            .join("config.yaml");

        Ok(Self { config_file })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_default_config_path() {
        unsafe { std::env::remove_var(CONFIG_ENV_VAR) };
        let paths = Paths::new().unwrap();
        assert!(paths.config_file.ends_with(".config/envp/config.yaml"));
        assert!(paths.config_file.is_absolute());
    }

    #[test]
    #[serial]
    fn test_config_path_override() {
        unsafe { std::env::set_var(CONFIG_ENV_VAR, "/tmp/envp-test/custom.yaml") };
        let paths = Paths::new().unwrap();
        unsafe { std::env::remove_var(CONFIG_ENV_VAR) };

        assert_eq!(paths.config_file, PathBuf::from("/tmp/envp-test/custom.yaml"));
    }

    #[test]
    #[serial]
    fn test_blank_override_is_ignored() {
        unsafe { std::env::set_var(CONFIG_ENV_VAR, "  ") };
        let paths = Paths::new().unwrap();
        unsafe { std::env::remove_var(CONFIG_ENV_VAR) };

        assert!(paths.config_file.ends_with(".config/envp/config.yaml"));
    }
}
