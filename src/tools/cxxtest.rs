//! CxxTest runner generation and execution.
//!
//! The generator writes `<project dir>/<runner name>.cpp` from the project's
//! test suite headers. That source is compiled by the test build, and the
//! resulting `<output dir>/<project>` executable is run by [`CxxTestRunner`].
//! The xUnit report path is baked into the generated source, so generation,
//! test build and execution go pair by pair.

use std::path::{Path, PathBuf};

use glob::Pattern;

use crate::builder::locate::locate_in_home;
use crate::core::manifest::CxxTestSection;
use crate::core::project::VCProject;
use crate::error::ConfigError;
use crate::tools::{report_path, CheckOutcome, QualityTool};

/// Directory, under each project, receiving xUnit reports.
pub const REPORT_DIR: &str = "cxxtest-reports";

/// The generator script relative to the CxxTest installation directory.
pub fn generator_in_home() -> PathBuf {
    Path::new("bin").join("cxxtestgen")
}

/// Settings shared by the generator and the runner.
#[derive(Debug, Clone)]
struct CxxTestSettings {
    home: Option<PathBuf>,
    test_targets: Vec<String>,
    test_headers: Vec<Pattern>,
    report_name: String,
    runner_name: String,
}

impl CxxTestSettings {
    fn new(home: Option<PathBuf>, section: &CxxTestSection) -> Result<Self, ConfigError> {
        let test_headers = section
            .test_headers
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|source| ConfigError::InvalidGlob {
                    setting: "[cxxtest] test_headers".to_string(),
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CxxTestSettings {
            home,
            test_targets: section.test_targets.clone(),
            test_headers,
            report_name: section.report_name.clone(),
            runner_name: section.runner_name.clone(),
        })
    }

    fn locate(&self) -> Result<PathBuf, ConfigError> {
        locate_in_home("cxxtestgen", "[cxxtest] home", self.home.as_deref(), &generator_in_home())
    }

    /// A project is a test target when its name or solution target name is
    /// listed.
    fn is_test_target(&self, project: &VCProject) -> bool {
        self.test_targets.iter().any(|target| {
            target.eq_ignore_ascii_case(project.name())
                || project
                    .target_name()
                    .is_some_and(|name| target.eq_ignore_ascii_case(name))
        })
    }

    fn report_path(&self, project: &VCProject) -> PathBuf {
        report_path(project, REPORT_DIR, &self.report_name)
    }
}

/// Runs `cxxtestgen` to produce a project's test runner source.
#[derive(Debug, Clone)]
pub struct CxxTestGenerator {
    settings: CxxTestSettings,
}

impl CxxTestGenerator {
    pub fn new(home: Option<PathBuf>, section: &CxxTestSection) -> Result<Self, ConfigError> {
        Ok(CxxTestGenerator {
            settings: CxxTestSettings::new(home, section)?,
        })
    }

    /// Path of the generated runner source.
    pub fn runner_source(&self, project: &VCProject) -> PathBuf {
        project
            .project_directory()
            .join(format!("{}.cpp", self.settings.runner_name))
    }

    /// Headers whose file name matches one of the test header patterns.
    pub fn test_headers<'p>(&self, project: &'p VCProject) -> Vec<&'p Path> {
        project
            .headers()
            .iter()
            .filter(|header| {
                header
                    .file_name()
                    .map(|name| name.to_string_lossy())
                    .is_some_and(|name| self.settings.test_headers.iter().any(|p| p.matches(&name)))
            })
            .map(PathBuf::as_path)
            .collect()
    }
}

impl QualityTool for CxxTestGenerator {
    fn name(&self) -> &str {
        "cxxtestgen"
    }

    fn locate(&self) -> Result<PathBuf, ConfigError> {
        self.settings.locate()
    }

    fn applies_to(&self, project: &VCProject) -> bool {
        self.settings.is_test_target(project)
    }

    fn build_arguments(&self, project: &VCProject) -> Vec<String> {
        let mut args = vec![
            "--xunit-printer".to_string(),
            format!("--xunit-file={}", self.report_path_for(project).display()),
            format!("--world={}", project.name()),
            "-o".to_string(),
            self.runner_source(project).display().to_string(),
        ];
        args.extend(
            self.test_headers(project)
                .into_iter()
                .map(|header| header.display().to_string()),
        );
        args
    }

    fn report_path_for(&self, project: &VCProject) -> PathBuf {
        self.settings.report_path(project)
    }

    fn interpret_result(&self, exit_code: i32) -> CheckOutcome {
        CheckOutcome::from_exit_code(exit_code, |_| false)
    }
}

/// Runs a project's compiled test runner.
#[derive(Debug, Clone)]
pub struct CxxTestRunner {
    settings: CxxTestSettings,
}

impl CxxTestRunner {
    pub fn new(home: Option<PathBuf>, section: &CxxTestSection) -> Result<Self, ConfigError> {
        Ok(CxxTestRunner {
            settings: CxxTestSettings::new(home, section)?,
        })
    }
}

impl QualityTool for CxxTestRunner {
    fn name(&self) -> &str {
        "cxxtest"
    }

    /// The runner needs the installation that generated it.
    fn locate(&self) -> Result<PathBuf, ConfigError> {
        self.settings.locate()
    }

    fn applies_to(&self, project: &VCProject) -> bool {
        self.settings.is_test_target(project)
    }

    fn executable(&self, _located: &Path, project: &VCProject) -> PathBuf {
        project
            .output_directory()
            .join(format!("{}{}", project.name(), std::env::consts::EXE_SUFFIX))
    }

    fn build_arguments(&self, _project: &VCProject) -> Vec<String> {
        Vec::new()
    }

    fn report_path_for(&self, project: &VCProject) -> PathBuf {
        self.settings.report_path(project)
    }

    fn interpret_result(&self, exit_code: i32) -> CheckOutcome {
        CheckOutcome::from_exit_code(exit_code, |code| (1..=125).contains(&code))
    }
}
