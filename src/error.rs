//! Top-level error taxonomy.
//!
//! Configuration errors are detected before any process is spawned.
//! Everything else happens while the matrix runs and carries the pair (and
//! project, where there is one) it happened for.

use std::io;
use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::parser::ParseError;
use crate::resolver::MatrixError;
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::process::ProcessError;

/// Result alias for orchestrator operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Packaging values accepted in `[project] packaging`.
pub const VALID_PACKAGING: &[&str] = &["exe", "dll", "lib", "sln"];

/// Invalid setup, reported before anything runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid packaging `{packaging}` (expected one of: {})", VALID_PACKAGING.join(", "))]
    InvalidPackaging { packaging: String },

    #[error("{tool} not found ({})", describe_attempts(.configured, .env_var, .env_value, .searched_path))]
    ToolNotFound {
        tool: String,
        /// Manifest or config key that sets the location
        setting: String,
        configured: Option<PathBuf>,
        env_var: Option<String>,
        env_value: Option<String>,
        searched_path: Option<String>,
    },

    #[error("invalid project file `{}`: {reason}", path.display())]
    InvalidProjectFile { path: PathBuf, reason: String },

    #[error("unsupported project file `{}` (expected a .sln or .vcxproj file)", path.display())]
    UnsupportedProjectFile { path: PathBuf },

    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error("invalid regular expression in `{setting}`: `{pattern}`")]
    InvalidRegex {
        setting: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid pattern in `{setting}`: `{pattern}`")]
    InvalidGlob {
        setting: String,
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

fn describe_attempts(
    configured: &Option<PathBuf>,
    env_var: &Option<String>,
    env_value: &Option<String>,
    searched_path: &Option<String>,
) -> String {
    let mut attempts = Vec::new();
    match configured {
        Some(path) => attempts.push(format!("configured path `{}` is not a file", path.display())),
        None => attempts.push("no path configured".to_string()),
    }
    if let Some(var) = env_var {
        match env_value {
            Some(value) => attempts.push(format!("${} = `{}` is not a file", var, value)),
            None => attempts.push(format!("${} is not set", var)),
        }
    }
    if let Some(name) = searched_path {
        attempts.push(format!("`{}` is not on PATH", name));
    }
    attempts.join("; ")
}

impl ConfigError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ConfigError::InvalidPackaging { .. } => Diagnostic::error(self.to_string())
                .with_suggestion("Set [project] packaging to one of exe, dll, lib or sln"),

            ConfigError::ToolNotFound {
                tool,
                setting,
                env_var,
                ..
            } => {
                let diag = Diagnostic::error(format!("could not locate {}", tool))
                    .with_context(self.to_string());
                if tool == "MSBuild" {
                    diag.with_suggestion(suggestions::CONFIGURE_MSBUILD)
                } else {
                    let mut hint = format!("Set {} in vcmatrix.toml or .vcmatrix/config.toml", setting);
                    if let Some(var) = env_var {
                        hint.push_str(&format!(", or the {} environment variable", var));
                    }
                    diag.with_suggestion(hint)
                }
            }

            ConfigError::InvalidProjectFile { path, .. }
            | ConfigError::UnsupportedProjectFile { path } => Diagnostic::error(self.to_string())
                .with_location(path)
                .with_suggestion(suggestions::CHECK_PROJECT_FILE),

            ConfigError::Matrix(e) => e.to_diagnostic(),

            ConfigError::InvalidRegex { source, .. } => {
                Diagnostic::error(self.to_string()).with_context(source.to_string())
            }

            ConfigError::InvalidGlob { source, .. } => {
                Diagnostic::error(self.to_string()).with_context(source.to_string())
            }
        }
    }
}

/// Every failure an orchestrator phase can report.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(code(vcmatrix::config))]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(code(vcmatrix::parse))]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(code(vcmatrix::process))]
    Process(#[from] ProcessError),

    #[error("failed to parse project `{project}` for platform={platform}, configuration={configuration}")]
    #[diagnostic(code(vcmatrix::parse::project))]
    ProjectParse {
        project: String,
        platform: String,
        configuration: String,
        #[source]
        source: ParseError,
    },

    #[error("could not run {tool} for platform={platform}, configuration={configuration}")]
    #[diagnostic(code(vcmatrix::process::invocation))]
    Invocation {
        tool: String,
        platform: String,
        configuration: String,
        #[source]
        source: ProcessError,
    },

    #[error("MSBuild failed for platform={platform}, configuration={configuration} (exit code {exit_code})")]
    #[diagnostic(
        code(vcmatrix::build::failed),
        help("Run with --verbose to see the full MSBuild output")
    )]
    BuildFailed {
        platform: String,
        configuration: String,
        exit_code: i32,
    },

    #[error("{phase} failed for {} project(s)", failures.len())]
    #[diagnostic(code(vcmatrix::checks::failed), help("Inspect the per-project reports for details"))]
    ChecksFailed { phase: String, failures: Vec<String> },

    #[error("failed to write report `{}`", path.display())]
    #[diagnostic(code(vcmatrix::report))]
    Report {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Whether the error was detected during pre-flight validation.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Error::Config(e) => e.to_diagnostic(),
            Error::Parse(e) => e.to_diagnostic(),

            Error::Process(e) => Diagnostic::error(e.to_string()).with_context(source_chain(e)),

            Error::ProjectParse { source, .. } => {
                let inner = source.to_diagnostic();
                let mut diag = Diagnostic::error(self.to_string()).with_context(inner.message);
                diag.location = inner.location;
                diag.context.extend(inner.context);
                diag.suggestions.extend(inner.suggestions);
                diag
            }

            Error::Invocation { source, .. } => Diagnostic::error(self.to_string())
                .with_context(source.to_string())
                .with_context(source_chain(source)),

            Error::BuildFailed { .. } => {
                Diagnostic::error(self.to_string()).with_suggestion(suggestions::BUILD_FAILED)
            }

            Error::ChecksFailed { failures, .. } => {
                let mut diag = Diagnostic::error(self.to_string());
                for failure in failures {
                    diag = diag.with_context(failure.clone());
                }
                diag.with_suggestion(suggestions::CHECKS_FAILED)
            }

            Error::Report { path, source } => Diagnostic::error(self.to_string())
                .with_location(path)
                .with_context(source.to_string()),
        }
    }
}

fn source_chain(error: &dyn std::error::Error) -> String {
    let mut causes = Vec::new();
    let mut current = error.source();
    while let Some(cause) = current {
        causes.push(cause.to_string());
        current = cause.source();
    }
    if causes.is_empty() {
        "no further detail".to_string()
    } else {
        causes.join(": ")
    }
}
