use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::upgrade::InstallerSettings;

const TAGS_URL: &str = "https://api.github.com/repos/srl-labs/containerlab/tags";
const INSTALLER_URL: &str = "https://github.com/srl-labs/containerlab/raw/main/get.sh";

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Tag listing endpoint, only the first page is read
    pub tags_url: String,

    pub installer_url: String,

    /// Variable the installer reads the target version from
    pub version_env: String,

    /// Program used to run the installer as root; empty to run it directly
    pub elevate: String,

    pub shell: String,

    /// File mode applied to the staged installer
    pub script_mode: u32,

    /// Where the installer is staged, system temp dir when unset
    pub staging_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let installer = InstallerSettings::default();
        Self {
            tags_url: TAGS_URL.to_string(),
            installer_url: INSTALLER_URL.to_string(),
            version_env: installer.version_env,
            elevate: installer.elevate,
            shell: installer.shell,
            script_mode: installer.script_mode,
            staging_dir: installer.staging_dir,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", config_path.display()))?;
        Ok(config)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("clab")
            .join("config.toml")
    }

    pub fn installer_settings(&self) -> InstallerSettings {
        InstallerSettings {
            version_env: self.version_env.clone(),
            elevate: self.elevate.clone(),
            shell: self.shell.clone(),
            script_mode: self.script_mode,
            staging_dir: self.staging_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.installer_settings(), InstallerSettings::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "elevate = \"doas\"\nscript_mode = 0o700\nstaging_dir = \"/var/tmp\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.elevate, "doas");
        assert_eq!(config.script_mode, 0o700);
        assert_eq!(config.staging_dir, Some(PathBuf::from("/var/tmp")));
        assert_eq!(config.tags_url, TAGS_URL);
        assert_eq!(config.version_env, "CLAB_VERSION");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "script_mode = \"rwx\"\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
