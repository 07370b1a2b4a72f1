//! `vcmatrix.toml` - the checked-in description of what to build.
//!
//! ```toml
//! [project]
//! name = "widgets"
//! group = "org.example"
//! version = "1.2.0"
//! packaging = "sln"
//! file = "Widgets.sln"
//!
//! [[platforms]]
//! name = "Win32"
//! configurations = ["Debug", "Release"]
//!
//! [msbuild]
//! targets = ["Build"]
//!
//! [cppcheck]
//! exclude_project_regex = "^ThirdParty"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::platform::BuildPlatform;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// File name of the manifest.
pub const MANIFEST_NAME: &str = "vcmatrix.toml";

/// Errors locating the manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("could not find `{MANIFEST_NAME}` in `{}` or any parent directory", dir.display())]
    NotFound { dir: PathBuf },
}

impl ManifestError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ManifestError::NotFound { .. } => {
                Diagnostic::error(self.to_string()).with_suggestion(suggestions::NO_MANIFEST)
            }
        }
    }
}

/// The parsed manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub project: ProjectSection,

    #[serde(default)]
    pub platforms: Vec<BuildPlatform>,

    #[serde(default)]
    pub msbuild: MsBuildSection,

    #[serde(default)]
    pub cxxtest: CxxTestSection,

    #[serde(default)]
    pub cppcheck: CppCheckSection,

    #[serde(default)]
    pub vera: VeraSection,

    #[serde(default)]
    pub sonar: SonarSection,

    /// Directory containing the manifest
    #[serde(skip)]
    root: PathBuf,
}

/// `[project]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSection {
    /// Project name, used for the Sonar project key and name
    pub name: String,

    /// Organisation / group identifier for the Sonar project key
    #[serde(default)]
    pub group: Option<String>,

    #[serde(default = "default_version")]
    pub version: String,

    /// What the project produces: `exe`, `dll`, `lib` or `sln`
    #[serde(default = "default_packaging")]
    pub packaging: String,

    /// The `.sln` or `.vcxproj` to build, relative to the manifest
    pub file: PathBuf,
}

/// `[msbuild]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MsBuildSection {
    /// Path to MSBuild.exe
    pub path: Option<PathBuf>,

    /// Targets passed with `/t:` on build
    pub targets: Vec<String>,
}

/// `[cxxtest]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CxxTestSection {
    pub skip: bool,

    /// CxxTest installation directory
    pub home: Option<PathBuf>,

    /// Projects (and MSBuild targets) holding unit tests
    pub test_targets: Vec<String>,

    /// File-name patterns selecting test suite headers
    pub test_headers: Vec<String>,

    pub report_name: String,

    /// Stem of the generated runner source
    pub runner_name: String,
}

impl Default for CxxTestSection {
    fn default() -> Self {
        CxxTestSection {
            skip: false,
            home: None,
            test_targets: Vec::new(),
            test_headers: vec!["*Test.h".to_string(), "*Tests.h".to_string()],
            report_name: "cxxtest-report".to_string(),
            runner_name: "cxxtest-runner".to_string(),
        }
    }
}

/// `[cppcheck]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CppCheckSection {
    pub skip: bool,

    /// Path to the cppcheck executable
    pub path: Option<PathBuf>,

    pub report_name: String,

    /// Projects whose name matches are not analysed
    pub exclude_project_regex: Option<String>,

    /// Checks passed with `--enable=`
    pub enable: Vec<String>,

    /// Exit code cppcheck uses to report findings
    pub error_exitcode: i32,
}

impl Default for CppCheckSection {
    fn default() -> Self {
        CppCheckSection {
            skip: false,
            path: None,
            report_name: "cppcheck-report".to_string(),
            exclude_project_regex: None,
            enable: vec!["style".to_string()],
            error_exitcode: 1,
        }
    }
}

/// `[vera]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VeraSection {
    pub skip: bool,

    /// Vera++ installation directory
    pub home: Option<PathBuf>,

    pub profile: String,

    pub report_name: String,

    /// Projects whose name matches are not checked
    pub exclude_project_regex: Option<String>,
}

impl Default for VeraSection {
    fn default() -> Self {
        VeraSection {
            skip: false,
            home: None,
            profile: "full".to_string(),
            report_name: "vera-report".to_string(),
            exclude_project_regex: None,
        }
    }
}

/// `[sonar]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SonarSection {
    pub skip: bool,

    /// Definitions appended to every project's list
    pub preprocessor_defs: Vec<String>,

    /// Sonar exclusion patterns
    pub excludes: Vec<String>,

    /// System include directories; taken from `INCLUDE` when unset
    pub system_include_dirs: Option<Vec<PathBuf>>,
}

fn default_version() -> String {
    "0.0.0".to_string()
}

fn default_packaging() -> String {
    "sln".to_string()
}

impl Manifest {
    /// Load a manifest from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;

        Self::parse(&content, path)
    }

    /// Parse manifest content.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let mut manifest: Manifest = toml::from_str(content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        manifest.root = crate::util::fs::absolute_path(path.parent().unwrap_or(Path::new(".")));
        Ok(manifest)
    }

    /// Directory containing the manifest.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a manifest-relative path.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        crate::util::fs::resolve_against(&self.root, path)
    }

    /// Absolute path of the project or solution file.
    pub fn project_file(&self) -> PathBuf {
        self.resolve_path(&self.project.file)
    }
}
