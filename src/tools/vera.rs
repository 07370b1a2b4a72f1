//! Vera++ coding style checks.

use std::path::{Path, PathBuf};

use crate::builder::locate::locate_in_home;
use crate::core::manifest::VeraSection;
use crate::core::project::VCProject;
use crate::error::ConfigError;
use crate::tools::{report_path, CheckOutcome, ProjectFilter, QualityTool, ReportStream};
use crate::util::fs::{display_slash, relative_path};

/// Directory, under each project, receiving checkstyle reports.
pub const REPORT_DIR: &str = "vera-reports";

/// The vera++ executable relative to its installation directory.
pub fn executable_in_home() -> PathBuf {
    Path::new("bin").join(format!("vera++{}", std::env::consts::EXE_SUFFIX))
}

/// Runs vera++ with a checkstyle report on stdout. The files to check are
/// fed on stdin, one per line, relative to the project's base directory.
#[derive(Debug, Clone)]
pub struct Vera {
    home: Option<PathBuf>,
    profile: String,
    report_name: String,
    filter: ProjectFilter,
}

impl Vera {
    pub fn new(home: Option<PathBuf>, section: &VeraSection) -> Result<Self, ConfigError> {
        Ok(Vera {
            home,
            profile: section.profile.clone(),
            report_name: section.report_name.clone(),
            filter: ProjectFilter::new(
                "[vera] exclude_project_regex",
                section.exclude_project_regex.as_deref(),
            )?,
        })
    }

    pub fn report_name(&self) -> &str {
        &self.report_name
    }

    fn root(&self) -> PathBuf {
        self.home
            .as_deref()
            .unwrap_or(Path::new(""))
            .join("lib")
            .join("vera++")
    }
}

impl QualityTool for Vera {
    fn name(&self) -> &str {
        "vera++"
    }

    fn locate(&self) -> Result<PathBuf, ConfigError> {
        locate_in_home("vera++", "[vera] home", self.home.as_deref(), &executable_in_home())
    }

    fn excludes(&self, project_name: &str) -> bool {
        self.filter.excludes(project_name)
    }

    fn build_arguments(&self, _project: &VCProject) -> Vec<String> {
        vec![
            "--root".to_string(),
            self.root().display().to_string(),
            "--profile".to_string(),
            self.profile.clone(),
            "--checkstyle-report".to_string(),
            "-".to_string(),
            "--error".to_string(),
            "--quiet".to_string(),
        ]
    }

    fn report_path_for(&self, project: &VCProject) -> PathBuf {
        report_path(project, REPORT_DIR, &self.report_name)
    }

    fn report_stream(&self) -> ReportStream {
        ReportStream::Stdout
    }

    fn standard_input(&self, project: &VCProject) -> Option<String> {
        let base = project.base_directory();
        let mut input = String::new();
        for file in project.sources().iter().chain(project.headers()) {
            input.push_str(&display_slash(&relative_path(base, file)));
            input.push('\n');
        }
        Some(input)
    }

    fn working_directory(&self, project: &VCProject) -> PathBuf {
        project.base_directory().to_path_buf()
    }

    fn interpret_result(&self, exit_code: i32) -> CheckOutcome {
        CheckOutcome::from_exit_code(exit_code, |code| (1..=125).contains(&code))
    }
}
