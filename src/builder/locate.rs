//! External tool location.
//!
//! A configured path is authoritative: it must be a regular file, and no
//! other source is consulted. Without one, the tool is looked up in an
//! environment variable, then on `PATH`. When none is usable the error
//! names every source that was tried.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Where to look for one external tool.
#[derive(Debug, Clone)]
pub struct ToolLocator {
    tool: String,
    setting: String,
    configured: Option<PathBuf>,
    env_var: Option<String>,
    path_name: Option<String>,
}

impl ToolLocator {
    /// `setting` names the manifest key that configures the location; it
    /// appears in the error's suggestion.
    pub fn new(tool: impl Into<String>, setting: impl Into<String>) -> Self {
        ToolLocator {
            tool: tool.into(),
            setting: setting.into(),
            configured: None,
            env_var: None,
            path_name: None,
        }
    }

    pub fn configured(mut self, path: Option<PathBuf>) -> Self {
        self.configured = path;
        self
    }

    /// Fall back to the named environment variable.
    pub fn env_var(mut self, name: impl Into<String>) -> Self {
        self.env_var = Some(name.into());
        self
    }

    /// Fall back to searching `PATH` for `name`.
    pub fn search_path(mut self, name: impl Into<String>) -> Self {
        self.path_name = Some(name.into());
        self
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// The configured path, without validation.
    pub fn configured_path(&self) -> Option<&Path> {
        self.configured.as_deref()
    }

    /// Find a usable executable.
    pub fn locate(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.configured {
            if path.is_file() {
                tracing::debug!("{} from configuration: {}", self.tool, path.display());
                return Ok(path.clone());
            }
            return Err(ConfigError::ToolNotFound {
                tool: self.tool.clone(),
                setting: self.setting.clone(),
                configured: Some(path.clone()),
                env_var: None,
                env_value: None,
                searched_path: None,
            });
        }

        let env_value = self
            .env_var
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|v| !v.trim().is_empty());
        if let Some(value) = &env_value {
            let path = PathBuf::from(value.trim());
            if path.is_file() {
                tracing::debug!("{} from environment: {}", self.tool, path.display());
                return Ok(path);
            }
        }

        if let Some(name) = &self.path_name {
            if let Some(path) = crate::util::process::find_executable(name) {
                tracing::debug!("{} from PATH: {}", self.tool, path.display());
                return Ok(path);
            }
        }

        Err(ConfigError::ToolNotFound {
            tool: self.tool.clone(),
            setting: self.setting.clone(),
            configured: self.configured.clone(),
            env_var: self.env_var.clone(),
            env_value,
            searched_path: self.path_name.clone(),
        })
    }
}

/// Locate `<home>/<relative>`, where `home` is an installation directory.
pub fn locate_in_home(
    tool: &str,
    setting: &str,
    home: Option<&Path>,
    relative: &Path,
) -> Result<PathBuf, ConfigError> {
    ToolLocator::new(tool, setting)
        .configured(home.map(|h| h.join(relative)))
        .locate()
}
