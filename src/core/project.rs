//! Parsed Visual C++ project properties.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::platform::BuildPair;

/// Properties of one Visual C++ project as parsed for one specific
/// (platform, configuration) pair.
///
/// The same `.vcxproj` yields a distinct `VCProject` per pair. Instances are
/// produced by [`crate::parser`] and are read-only afterwards; base and
/// output directories are always absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VCProject {
    pub(crate) name: String,
    pub(crate) project_file: PathBuf,
    pub(crate) guid: Option<String>,
    pub(crate) solution_guid: Option<String>,
    pub(crate) target_name: Option<String>,
    pub(crate) base_directory: PathBuf,
    pub(crate) output_directory: PathBuf,
    pub(crate) include_directories: Vec<PathBuf>,
    pub(crate) preprocessor_defs: Vec<String>,
    pub(crate) sources: Vec<PathBuf>,
    pub(crate) headers: Vec<PathBuf>,
    pub(crate) pair: BuildPair,
}

impl VCProject {
    /// Project name (the solution entry name, or the file stem for a
    /// standalone project).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute path of the `.vcxproj` file.
    pub fn project_file(&self) -> &Path {
        &self.project_file
    }

    /// Directory containing the project file.
    pub fn project_directory(&self) -> &Path {
        self.project_file.parent().unwrap_or(&self.base_directory)
    }

    /// The `ProjectGuid` declared by the project file.
    pub fn guid(&self) -> Option<&str> {
        self.guid.as_deref()
    }

    /// The GUID under which the enclosing solution lists this project.
    pub fn solution_guid(&self) -> Option<&str> {
        self.solution_guid.as_deref()
    }

    /// MSBuild target name for this project within its solution. `None` for
    /// projects that are not part of a solution.
    pub fn target_name(&self) -> Option<&str> {
        self.target_name.as_deref()
    }

    /// Solution directory for solution members, project directory otherwise.
    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// The configured `OutDir`.
    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Additional include directories, in declaration order.
    pub fn include_directories(&self) -> &[PathBuf] {
        &self.include_directories
    }

    /// Preprocessor definitions, in declaration order.
    pub fn preprocessor_defs(&self) -> &[String] {
        &self.preprocessor_defs
    }

    /// `ClCompile` items built for this pair.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// `ClInclude` items.
    pub fn headers(&self) -> &[PathBuf] {
        &self.headers
    }

    pub fn pair(&self) -> &BuildPair {
        &self.pair
    }

    pub fn platform(&self) -> &str {
        &self.pair.platform
    }

    pub fn configuration(&self) -> &str {
        &self.pair.configuration
    }
}

impl fmt::Display for VCProject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.name, self.pair.platform, self.pair.configuration
        )
    }
}
