//! Sonar analysis configuration.
//!
//! One properties file per pair, describing every project's base
//! directory, include directories and definitions, and where the quality
//! reports for that pair can be found.

use std::path::{Path, PathBuf};

use crate::core::manifest::Manifest;
use crate::core::platform::BuildPair;
use crate::core::project::VCProject;
use crate::tools::{cppcheck, cxxtest, report_glob, vera};
use crate::util::fs::{display_slash, relative_path};

/// Environment variable listing the compiler's system include directories.
pub const ENV_INCLUDE: &str = "INCLUDE";

/// System include directories from `INCLUDE`, split on `;`.
pub fn system_include_dirs_from_env() -> Vec<PathBuf> {
    std::env::var(ENV_INCLUDE)
        .map(|value| split_include_list(&value))
        .unwrap_or_default()
}

fn split_include_list(value: &str) -> Vec<PathBuf> {
    value
        .split(';')
        .map(str::trim)
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Renders and places Sonar configuration files.
#[derive(Debug, Clone)]
pub struct SonarConfigEmitter {
    project_key: String,
    project_name: String,
    project_version: String,
    root: PathBuf,
    output_dir: PathBuf,
    preprocessor_defs: Vec<String>,
    excludes: Vec<String>,
    system_include_dirs: Vec<PathBuf>,
    cppcheck_report: String,
    vera_report: String,
    cxxtest_report: String,
}

impl SonarConfigEmitter {
    pub fn new(manifest: &Manifest, output_dir: PathBuf, system_include_dirs: Vec<PathBuf>) -> Self {
        let project = &manifest.project;
        let project_key = match &project.group {
            Some(group) => format!("{}:{}", group, project.name),
            None => project.name.clone(),
        };

        SonarConfigEmitter {
            project_key,
            project_name: project.name.clone(),
            project_version: project.version.clone(),
            root: manifest.root().to_path_buf(),
            output_dir,
            preprocessor_defs: manifest.sonar.preprocessor_defs.clone(),
            excludes: manifest.sonar.excludes.clone(),
            system_include_dirs,
            cppcheck_report: manifest.cppcheck.report_name.clone(),
            vera_report: manifest.vera.report_name.clone(),
            cxxtest_report: manifest.cxxtest.report_name.clone(),
        }
    }

    /// `<output dir>/sonar-configuration-<platform>-<configuration>.properties`
    pub fn config_path_for(&self, pair: &BuildPair) -> PathBuf {
        self.output_dir.join(format!(
            "sonar-configuration-{}-{}.properties",
            pair.platform, pair.configuration
        ))
    }

    /// The properties file for `projects`, all parsed for `pair`.
    pub fn render(&self, projects: &[VCProject], pair: &BuildPair) -> String {
        let mut out = String::new();
        let mut line = |key: &str, value: &str| {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        };

        let modules: Vec<&str> = projects.iter().map(VCProject::name).collect();

        line("sonar.projectKey", &self.project_key);
        line("sonar.projectName", &self.project_name);
        line("sonar.projectVersion", &self.project_version);
        line("sonar.sources", ".");
        line("sonar.language", "c++");
        line("sonar.modules", &modules.join(","));
        line(
            "sonar.cxx.cppcheck.reportPath",
            &report_glob(cppcheck::REPORT_DIR, &self.cppcheck_report, pair),
        );
        line(
            "sonar.cxx.vera.reportPath",
            &report_glob(vera::REPORT_DIR, &self.vera_report, pair),
        );
        line(
            "sonar.cxx.xunit.reportPath",
            &report_glob(cxxtest::REPORT_DIR, &self.cxxtest_report, pair),
        );

        for project in projects {
            let name = project.name();

            line(
                &format!("{}.sonar.projectBaseDir", name),
                &self.base_dir_of(project.base_directory()),
            );

            let includes: Vec<String> = project
                .include_directories()
                .iter()
                .chain(&self.system_include_dirs)
                .map(|dir| display_slash(dir))
                .collect();
            if !includes.is_empty() {
                line(&format!("{}.sonar.cxx.include_directories", name), &includes.join(","));
            }

            let defines: Vec<&str> = project
                .preprocessor_defs()
                .iter()
                .chain(&self.preprocessor_defs)
                .map(String::as_str)
                .collect();
            if !defines.is_empty() {
                line(&format!("{}.sonar.cxx.defines", name), &defines.join(","));
            }

            if !self.excludes.is_empty() {
                line(&format!("{}.sonar.exclusions", name), &self.excludes.join(","));
            }
        }

        out
    }

    fn base_dir_of(&self, base: &Path) -> String {
        let relative = display_slash(&relative_path(&self.root, base));
        if relative.is_empty() {
            ".".to_string()
        } else {
            relative
        }
    }
}
