//! Parse error types and diagnostics.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error reading a solution or project file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("`{}` is not well-formed XML", path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("`{}` is not a Visual C++ project (root element `{root}`)", path.display())]
    NotAProject { path: PathBuf, root: String },

    #[error("{}:{line}: {message}", path.display())]
    MalformedSolution {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("project `{project}` does not define configuration `{configuration}|{platform}`")]
    ProjectConfigurationNotFound {
        project: String,
        path: PathBuf,
        platform: String,
        configuration: String,
    },

    #[error("solution `{}` references missing project file `{}`", solution.display(), path.display())]
    MissingProjectFile { solution: PathBuf, path: PathBuf },
}

impl ParseError {
    /// The file the error is about.
    pub fn path(&self) -> &std::path::Path {
        match self {
            ParseError::Io { path, .. }
            | ParseError::Xml { path, .. }
            | ParseError::NotAProject { path, .. }
            | ParseError::MalformedSolution { path, .. }
            | ParseError::ProjectConfigurationNotFound { path, .. }
            | ParseError::MissingProjectFile { path, .. } => path,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ParseError::Io { path, source } => Diagnostic::error(self.to_string())
                .with_location(path)
                .with_context(source.to_string()),

            ParseError::Xml { path, source } => Diagnostic::error(self.to_string())
                .with_location(path)
                .with_context(source.to_string()),

            ParseError::NotAProject { path, .. } => Diagnostic::error(self.to_string())
                .with_location(path)
                .with_suggestion(suggestions::CHECK_PROJECT_FILE),

            ParseError::MalformedSolution { path, .. } => {
                Diagnostic::error(self.to_string()).with_location(path)
            }

            ParseError::ProjectConfigurationNotFound {
                path,
                platform,
                configuration,
                ..
            } => Diagnostic::error(self.to_string())
                .with_location(path)
                .with_context(format!(
                    "no `ProjectConfiguration` item with Include=\"{}|{}\"",
                    configuration, platform
                ))
                .with_suggestion(suggestions::CHECK_PLATFORMS),

            ParseError::MissingProjectFile { solution, path } => {
                Diagnostic::error(self.to_string())
                    .with_location(solution)
                    .with_context(format!("expected at {}", path.display()))
            }
        }
    }
}
