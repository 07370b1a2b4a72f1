//! Platform / configuration matrix types.
//!
//! A matrix is an ordered list of [`BuildPlatform`]s, each owning an ordered
//! list of [`BuildConfiguration`]s. Every (platform, configuration)
//! combination is a [`BuildPair`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Platform used when the manifest declares none.
pub const DEFAULT_PLATFORM: &str = "Win32";

/// Configuration used when a platform declares none.
pub const DEFAULT_CONFIGURATION: &str = "Release";

/// A build variant such as `Debug` or `Release`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildConfiguration {
    name: String,
}

impl BuildConfiguration {
    pub fn new(name: impl Into<String>) -> Self {
        BuildConfiguration { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for BuildConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A target architecture such as `Win32` or `x64`, with the configurations
/// to build for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlatform {
    name: String,
    #[serde(default)]
    configurations: Vec<BuildConfiguration>,
}

impl BuildPlatform {
    pub fn new(name: impl Into<String>, configurations: Vec<BuildConfiguration>) -> Self {
        BuildPlatform {
            name: name.into(),
            configurations,
        }
    }

    /// Convenience constructor from configuration names.
    pub fn with_configurations<I, S>(name: impl Into<String>, configurations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        BuildPlatform::new(
            name,
            configurations
                .into_iter()
                .map(|c| BuildConfiguration::new(c))
                .collect(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn configurations(&self) -> &[BuildConfiguration] {
        &self.configurations
    }

    /// The pairs this platform contributes, in configuration order.
    pub fn pairs(&self) -> impl Iterator<Item = BuildPair> + '_ {
        self.configurations
            .iter()
            .map(move |c| BuildPair::new(&self.name, c.name()))
    }
}

impl fmt::Display for BuildPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let configurations: Vec<&str> = self.configurations.iter().map(|c| c.name()).collect();
        write!(f, "{} [{}]", self.name, configurations.join(", "))
    }
}

/// All pairs of a matrix in iteration order (platform-major).
pub fn matrix_pairs(matrix: &[BuildPlatform]) -> Vec<BuildPair> {
    matrix.iter().flat_map(|p| p.pairs()).collect()
}

/// One (platform, configuration) combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BuildPair {
    pub platform: String,
    pub configuration: String,
}

impl BuildPair {
    pub fn new(platform: impl Into<String>, configuration: impl Into<String>) -> Self {
        BuildPair {
            platform: platform.into(),
            configuration: configuration.into(),
        }
    }

    /// The `Configuration|Platform` key MSBuild uses in conditions and
    /// solution files.
    pub fn msbuild_key(&self) -> String {
        format!("{}|{}", self.configuration, self.platform)
    }

    /// `platform-configuration`, used in generated file names.
    pub fn slug(&self) -> String {
        format!("{}-{}", self.platform, self.configuration)
    }
}

impl fmt::Display for BuildPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "platform={}, configuration={}",
            self.platform, self.configuration
        )
    }
}

/// Values substituted for an empty matrix or an empty platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixDefaults {
    pub platform: String,
    pub configuration: String,
}

impl Default for MatrixDefaults {
    fn default() -> Self {
        MatrixDefaults {
            platform: DEFAULT_PLATFORM.to_string(),
            configuration: DEFAULT_CONFIGURATION.to_string(),
        }
    }
}
