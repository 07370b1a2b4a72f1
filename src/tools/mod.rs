//! Quality tool adapters.
//!
//! Each adapter turns one parsed [`VCProject`] into an external command and
//! interprets its exit code. Adapters never spawn anything themselves; the
//! orchestrator runs what they describe through a
//! [`CommandRunner`](crate::util::process::CommandRunner).

pub mod cppcheck;
pub mod cxxtest;
pub mod sonar;
pub mod vera;

pub use cppcheck::CppCheck;
pub use cxxtest::{CxxTestGenerator, CxxTestRunner};
pub use sonar::SonarConfigEmitter;
pub use vera::Vera;

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::core::platform::BuildPair;
use crate::core::project::VCProject;
use crate::error::ConfigError;

/// Outcome of one tool run over one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Passed,
    /// The tool ran and found problems.
    Violations(i32),
    /// The tool itself failed.
    ToolFailure(i32),
}

impl CheckOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, CheckOutcome::Passed)
    }

    /// 0 passes, codes in `violations` are violations, anything else is a
    /// tool failure.
    pub fn from_exit_code(exit_code: i32, violations: impl Fn(i32) -> bool) -> Self {
        if exit_code == 0 {
            CheckOutcome::Passed
        } else if violations(exit_code) {
            CheckOutcome::Violations(exit_code)
        } else {
            CheckOutcome::ToolFailure(exit_code)
        }
    }
}

/// Which child stream carries the tool's report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStream {
    Stdout,
    Stderr,
    /// The tool writes the report file itself.
    None,
}

/// A quality tool that runs once per project per pair.
///
/// Everything except [`locate`](QualityTool::locate) is pure.
pub trait QualityTool {
    /// Name used in logs, events and failure summaries.
    fn name(&self) -> &str;

    /// Pre-flight check that the tool is installed. Returns the located
    /// executable (or installation entry point).
    fn locate(&self) -> Result<PathBuf, ConfigError>;

    /// Projects excluded by name are neither parsed nor reported.
    fn excludes(&self, _project_name: &str) -> bool {
        false
    }

    /// Parsed projects for which this returns false are reported as skipped.
    fn applies_to(&self, _project: &VCProject) -> bool {
        true
    }

    /// The program to run for `project`, given what `locate` found.
    fn executable(&self, located: &Path, _project: &VCProject) -> PathBuf {
        located.to_path_buf()
    }

    fn build_arguments(&self, project: &VCProject) -> Vec<String>;

    fn report_path_for(&self, project: &VCProject) -> PathBuf;

    fn report_stream(&self) -> ReportStream {
        ReportStream::None
    }

    fn standard_input(&self, _project: &VCProject) -> Option<String> {
        None
    }

    fn working_directory(&self, project: &VCProject) -> PathBuf {
        project.project_directory().to_path_buf()
    }

    fn interpret_result(&self, exit_code: i32) -> CheckOutcome;
}

/// `<project dir>/<report dir>/<report name>-<project>-<platform>-<configuration>.xml`
pub fn report_path(project: &VCProject, report_dir: &str, report_name: &str) -> PathBuf {
    project
        .project_directory()
        .join(report_dir)
        .join(format!("{}-{}.xml", report_name, project))
}

/// Glob matching every project's report for `pair`.
pub fn report_glob(report_dir: &str, report_name: &str, pair: &BuildPair) -> String {
    format!(
        "**/{}/{}-*-{}-{}.xml",
        report_dir, report_name, pair.platform, pair.configuration
    )
}

/// Optional project-name exclusion pattern.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    exclude: Option<Regex>,
}

impl ProjectFilter {
    /// Compile `pattern`; `setting` names its manifest key for errors.
    pub fn new(setting: &str, pattern: Option<&str>) -> Result<Self, ConfigError> {
        let exclude = match pattern.filter(|p| !p.is_empty()) {
            Some(pattern) => {
                // The whole name must match.
                let anchored = format!("^(?:{})$", pattern);
                Some(Regex::new(&anchored).map_err(|source| ConfigError::InvalidRegex {
                    setting: setting.to_string(),
                    pattern: pattern.to_string(),
                    source,
                })?)
            }
            None => None,
        };
        Ok(ProjectFilter { exclude })
    }

    pub fn excludes(&self, project_name: &str) -> bool {
        self.exclude
            .as_ref()
            .is_some_and(|re| re.is_match(project_name))
    }
}
