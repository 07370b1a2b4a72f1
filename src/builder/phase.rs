//! Phases, their inputs and their aggregated results.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::builder::locate::ToolLocator;
use crate::core::platform::{BuildPair, BuildPlatform, MatrixDefaults};
use crate::error::Error;
use crate::tools::QualityTool;

/// What the orchestrator does for every pair of the matrix.
#[derive(Clone, Copy)]
pub enum Phase<'t> {
    /// MSBuild with the configured extra targets.
    Build,
    /// MSBuild with the `Clean` target.
    Clean,
    /// MSBuild with the CxxTest targets.
    TestBuild,
    /// One tool run per project, fail-soft.
    QualityCheck(&'t dyn QualityTool),
}

impl Phase<'_> {
    pub fn name(&self) -> &str {
        match self {
            Phase::Build => "build",
            Phase::Clean => "clean",
            Phase::TestBuild => "testbuild",
            Phase::QualityCheck(tool) => tool.name(),
        }
    }
}

impl fmt::Debug for Phase<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::QualityCheck(tool) => f.debug_tuple("QualityCheck").field(&tool.name()).finish(),
            _ => f.write_str(self.name()),
        }
    }
}

/// Everything a phase needs, assembled from the manifest and configuration.
#[derive(Debug, Clone)]
pub struct PhaseRequest {
    pub packaging: String,
    pub project_file: PathBuf,
    /// The matrix as declared, before resolution.
    pub platforms: Vec<BuildPlatform>,
    pub defaults: MatrixDefaults,
    pub msbuild: ToolLocator,
    /// Extra `/t:` targets for [`Phase::Build`].
    pub targets: Vec<String>,
    /// `/t:` targets for [`Phase::TestBuild`].
    pub test_targets: Vec<String>,
}

impl PhaseRequest {
    pub fn new(project_file: impl AsRef<Path>, msbuild: ToolLocator) -> Self {
        PhaseRequest {
            packaging: "sln".to_string(),
            project_file: project_file.as_ref().to_path_buf(),
            platforms: Vec::new(),
            defaults: MatrixDefaults::default(),
            msbuild,
            targets: Vec::new(),
            test_targets: Vec::new(),
        }
    }

    pub fn with_platforms(mut self, platforms: Vec<BuildPlatform>) -> Self {
        self.platforms = platforms;
        self
    }

    pub fn with_packaging(mut self, packaging: impl Into<String>) -> Self {
        self.packaging = packaging.into();
        self
    }

    pub fn with_targets(mut self, targets: Vec<String>) -> Self {
        self.targets = targets;
        self
    }

    pub fn with_test_targets(mut self, test_targets: Vec<String>) -> Self {
        self.test_targets = test_targets;
        self
    }

    /// Whether the project file is a solution.
    pub fn is_solution(&self) -> bool {
        has_extension(&self.project_file, "sln")
    }
}

pub(crate) fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
}

/// Status of one project within one pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectStatus {
    Passed,
    /// The tool does not apply to the project.
    Skipped,
    Violations { exit_code: i32 },
    ToolFailure { exit_code: i32 },
    /// The project could not be parsed, the tool could not be run, or its
    /// report could not be written.
    Error { message: String },
}

impl ProjectStatus {
    pub fn passed(&self) -> bool {
        matches!(self, ProjectStatus::Passed | ProjectStatus::Skipped)
    }

    /// Short machine-friendly label.
    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::Passed => "passed",
            ProjectStatus::Skipped => "skipped",
            ProjectStatus::Violations { .. } => "violations",
            ProjectStatus::ToolFailure { .. } => "tool-failure",
            ProjectStatus::Error { .. } => "error",
        }
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ProjectStatus::Violations { exit_code } | ProjectStatus::ToolFailure { exit_code } => {
                Some(*exit_code)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectStatus::Passed => f.write_str("passed"),
            ProjectStatus::Skipped => f.write_str("skipped"),
            ProjectStatus::Violations { exit_code } => {
                write!(f, "violations found (exit code {})", exit_code)
            }
            ProjectStatus::ToolFailure { exit_code } => {
                write!(f, "tool failed (exit code {})", exit_code)
            }
            ProjectStatus::Error { message } => f.write_str(message),
        }
    }
}

/// One project's outcome within a pair.
#[derive(Debug, Clone)]
pub struct ProjectResult {
    pub project: String,
    pub report: Option<PathBuf>,
    pub status: ProjectStatus,
}

/// One pair's outcome: an MSBuild exit code, or the per-project results of
/// a quality check.
#[derive(Debug, Clone)]
pub struct PairResult {
    pub pair: BuildPair,
    pub exit_code: Option<i32>,
    pub projects: Vec<ProjectResult>,
}

impl PairResult {
    pub fn passed(&self) -> bool {
        self.exit_code.map_or(true, |code| code == 0)
            && self.projects.iter().all(|p| p.status.passed())
    }
}

/// Aggregated outcome of a phase over the whole matrix.
#[derive(Debug, Clone)]
pub struct PhaseResult {
    pub phase: String,
    pub pairs: Vec<PairResult>,
}

impl PhaseResult {
    pub fn new(phase: impl Into<String>) -> Self {
        PhaseResult {
            phase: phase.into(),
            pairs: Vec::new(),
        }
    }

    pub fn passed(&self) -> bool {
        self.pairs.iter().all(PairResult::passed)
    }

    /// One line per failing pair or project.
    pub fn failures(&self) -> Vec<String> {
        let mut failures = Vec::new();
        for pair in &self.pairs {
            if let Some(code) = pair.exit_code.filter(|code| *code != 0) {
                failures.push(format!("{}: exit code {}", pair.pair, code));
            }
            for project in pair.projects.iter().filter(|p| !p.status.passed()) {
                failures.push(format!(
                    "{}-{}: {}",
                    project.project,
                    pair.pair.slug(),
                    project.status
                ));
            }
        }
        failures
    }

    /// `Ok(self)` when everything passed, else [`Error::ChecksFailed`].
    pub fn into_verdict(self) -> Result<Self, Error> {
        if self.passed() {
            Ok(self)
        } else {
            Err(Error::ChecksFailed {
                failures: self.failures(),
                phase: self.phase,
            })
        }
    }
}
