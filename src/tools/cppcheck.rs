//! CppCheck static analysis.

use std::path::PathBuf;

use crate::builder::locate::ToolLocator;
use crate::core::manifest::CppCheckSection;
use crate::core::project::VCProject;
use crate::error::ConfigError;
use crate::tools::{report_path, CheckOutcome, ProjectFilter, QualityTool, ReportStream};

/// Directory, under each project, receiving CppCheck reports.
pub const REPORT_DIR: &str = "cppcheck-reports";

/// Locator for cppcheck: the configured path, then `PATH`.
pub fn locator(configured: Option<PathBuf>) -> ToolLocator {
    ToolLocator::new("cppcheck", "[cppcheck] path")
        .configured(configured)
        .search_path("cppcheck")
}

/// Runs `cppcheck --xml` over a project's sources. The XML report arrives
/// on stderr.
#[derive(Debug, Clone)]
pub struct CppCheck {
    locator: ToolLocator,
    report_name: String,
    enable: Vec<String>,
    error_exitcode: i32,
    filter: ProjectFilter,
}

impl CppCheck {
    pub fn new(locator: ToolLocator, section: &CppCheckSection) -> Result<Self, ConfigError> {
        Ok(CppCheck {
            locator,
            report_name: section.report_name.clone(),
            enable: section.enable.clone(),
            error_exitcode: section.error_exitcode,
            filter: ProjectFilter::new(
                "[cppcheck] exclude_project_regex",
                section.exclude_project_regex.as_deref(),
            )?,
        })
    }

    pub fn report_name(&self) -> &str {
        &self.report_name
    }
}

/// CppCheck's `--platform` value for an MSBuild platform.
fn cppcheck_platform(platform: &str) -> &'static str {
    if platform.eq_ignore_ascii_case("win32") {
        "win32A"
    } else if platform.eq_ignore_ascii_case("x64") {
        "win64"
    } else {
        "native"
    }
}

impl QualityTool for CppCheck {
    fn name(&self) -> &str {
        "cppcheck"
    }

    fn locate(&self) -> Result<PathBuf, ConfigError> {
        self.locator.locate()
    }

    fn excludes(&self, project_name: &str) -> bool {
        self.filter.excludes(project_name)
    }

    fn build_arguments(&self, project: &VCProject) -> Vec<String> {
        let mut args = vec![
            "--quiet".to_string(),
            "--xml".to_string(),
            "--xml-version=2".to_string(),
            format!("--error-exitcode={}", self.error_exitcode),
        ];
        if !self.enable.is_empty() {
            args.push(format!("--enable={}", self.enable.join(",")));
        }
        args.push(format!("--platform={}", cppcheck_platform(project.platform())));

        args.extend(
            project
                .include_directories()
                .iter()
                .map(|dir| format!("-I{}", dir.display())),
        );
        args.extend(project.preprocessor_defs().iter().map(|def| format!("-D{}", def)));
        args.extend(project.sources().iter().map(|src| src.display().to_string()));
        args
    }

    fn report_path_for(&self, project: &VCProject) -> PathBuf {
        report_path(project, REPORT_DIR, &self.report_name)
    }

    fn report_stream(&self) -> ReportStream {
        ReportStream::Stderr
    }

    fn working_directory(&self, project: &VCProject) -> PathBuf {
        project.base_directory().to_path_buf()
    }

    fn interpret_result(&self, exit_code: i32) -> CheckOutcome {
        let violations = self.error_exitcode;
        CheckOutcome::from_exit_code(exit_code, |code| code == violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixtures::sample_project;

    fn cppcheck() -> CppCheck {
        CppCheck::new(locator(None), &CppCheckSection::default()).unwrap()
    }

    #[test]
    fn test_arguments() {
        let args = cppcheck().build_arguments(&sample_project());
        assert_eq!(
            args,
            [
                "--quiet",
                "--xml",
                "--xml-version=2",
                "--error-exitcode=1",
                "--enable=style",
                "--platform=win64",
                "-I/work/Core/include",
                "-I/work/Core/include",
                "-DCORE_API",
                "-DWIN32",
                "/work/Core/core.cpp",
                "/work/Core/util.cpp",
            ]
        );
    }

    #[test]
    fn test_platform_mapping() {
        assert_eq!(cppcheck_platform("Win32"), "win32A");
        assert_eq!(cppcheck_platform("X64"), "win64");
        assert_eq!(cppcheck_platform("ARM64"), "native");
    }

    #[test]
    fn test_interpret_result() {
        let tool = cppcheck();
        assert_eq!(tool.interpret_result(0), CheckOutcome::Passed);
        assert_eq!(tool.interpret_result(1), CheckOutcome::Violations(1));
        assert_eq!(tool.interpret_result(2), CheckOutcome::ToolFailure(2));
    }

    #[test]
    fn test_report_on_stderr() {
        let tool = cppcheck();
        assert_eq!(tool.report_stream(), ReportStream::Stderr);
        assert_eq!(
            tool.report_path_for(&sample_project()),
            PathBuf::from("/work/Core/cppcheck-reports/cppcheck-report-Core-x64-Debug.xml")
        );
    }

    #[test]
    fn test_exclusion() {
        let section = CppCheckSection {
            exclude_project_regex: Some("Third.*".into()),
            ..CppCheckSection::default()
        };
        let tool = CppCheck::new(locator(None), &section).unwrap();
        assert!(tool.excludes("ThirdParty"));
        assert!(!tool.excludes("Core"));
    }
}
