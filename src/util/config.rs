//! Configuration file support for vcmatrix.
//!
//! Machine-specific settings (where MSBuild and the quality tools live, where
//! output goes) are kept out of the checked-in manifest and read from:
//! - Global: `~/.vcmatrix/config.toml` - User-wide defaults
//! - Project: `.vcmatrix/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Values set in
//! `vcmatrix.toml` take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// vcmatrix configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External tool locations
    pub tools: ToolsConfig,

    /// Output settings
    pub output: OutputConfig,
}

/// Locations of external tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Path to MSBuild.exe
    pub msbuild: Option<PathBuf>,

    /// Path to the cppcheck executable
    pub cppcheck: Option<PathBuf>,

    /// Vera++ installation directory
    pub vera_home: Option<PathBuf>,

    /// CxxTest installation directory
    pub cxxtest_home: Option<PathBuf>,
}

/// Output-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for generated files (defaults to `target` next to the manifest)
    pub dir: Option<PathBuf>,

    /// Default message format (`human` or `json`)
    pub message_format: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.tools.msbuild.is_some() {
            self.tools.msbuild = other.tools.msbuild;
        }
        if other.tools.cppcheck.is_some() {
            self.tools.cppcheck = other.tools.cppcheck;
        }
        if other.tools.vera_home.is_some() {
            self.tools.vera_home = other.tools.vera_home;
        }
        if other.tools.cxxtest_home.is_some() {
            self.tools.cxxtest_home = other.tools.cxxtest_home;
        }

        if other.output.dir.is_some() {
            self.output.dir = other.output.dir;
        }
        if other.output.message_format.is_some() {
            self.output.message_format = other.output.message_format;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.vcmatrix/config.toml)
/// 2. Global config (~/.vcmatrix/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    // Project config overrides global
    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global vcmatrix config directory (~/.vcmatrix).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".vcmatrix"))
}

/// Get the project config path (.vcmatrix/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".vcmatrix").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.tools.msbuild.is_none());
        assert!(config.tools.cppcheck.is_none());
        assert!(config.output.dir.is_none());
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[tools]
msbuild = "C:/BuildTools/MSBuild/Current/Bin/MSBuild.exe"
vera_home = "C:/vera"

[output]
message_format = "json"
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(
            config.tools.msbuild,
            Some(PathBuf::from("C:/BuildTools/MSBuild/Current/Bin/MSBuild.exe"))
        );
        assert_eq!(config.tools.vera_home, Some(PathBuf::from("C:/vera")));
        assert_eq!(config.output.message_format, Some("json".to_string()));
    }

    #[test]
    fn test_config_load_rejects_bad_toml() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(&config_path, "[tools\nmsbuild = ").unwrap();

        assert!(Config::load(&config_path).is_err());
        assert!(Config::load_or_default(&config_path).tools.msbuild.is_none());
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.tools.msbuild = Some(PathBuf::from("/global/msbuild"));
        base.tools.cppcheck = Some(PathBuf::from("/global/cppcheck"));

        let mut override_cfg = Config::default();
        override_cfg.tools.msbuild = Some(PathBuf::from("/project/msbuild"));

        base.merge(override_cfg);

        assert_eq!(base.tools.msbuild, Some(PathBuf::from("/project/msbuild")));
        assert_eq!(base.tools.cppcheck, Some(PathBuf::from("/global/cppcheck")));
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let project_path = tmp.path().join("project.toml");

        std::fs::write(
            &global_path,
            r#"
[tools]
msbuild = "/global/msbuild"
cppcheck = "/global/cppcheck"
"#,
        )
        .unwrap();
        std::fs::write(
            &project_path,
            r#"
[tools]
msbuild = "/project/msbuild"
"#,
        )
        .unwrap();

        let config = load_config(Some(&global_path), &project_path);
        assert_eq!(config.tools.msbuild, Some(PathBuf::from("/project/msbuild")));
        assert_eq!(config.tools.cppcheck, Some(PathBuf::from("/global/cppcheck")));
    }
}
