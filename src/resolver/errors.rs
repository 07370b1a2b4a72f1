//! Matrix resolution error types and diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error validating the declared platform/configuration matrix.
#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("platform #{index} has an empty name")]
    EmptyPlatformName { index: usize },

    #[error("platform `{platform}` is declared more than once")]
    DuplicatePlatform { platform: String },

    #[error("platform `{platform}` has a configuration with an empty name")]
    EmptyConfigurationName { platform: String },

    #[error("configuration `{configuration}` is declared more than once for platform `{platform}`")]
    DuplicateConfiguration {
        platform: String,
        configuration: String,
    },

    #[error("solution `{}` does not declare configuration `{configuration}|{platform}`", solution.display())]
    PairNotInSolution {
        platform: String,
        configuration: String,
        solution: PathBuf,
        declared: Vec<String>,
    },
}

impl MatrixError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            MatrixError::PairNotInSolution {
                solution, declared, ..
            } => {
                let mut diag = Diagnostic::error(self.to_string()).with_location(solution);

                if !declared.is_empty() {
                    diag = diag.with_context(format!(
                        "the solution declares: {}",
                        declared.join(", ")
                    ));
                }

                diag.with_suggestion(suggestions::CHECK_PLATFORMS)
            }

            _ => Diagnostic::error(self.to_string()).with_suggestion(suggestions::CHECK_PLATFORMS),
        }
    }
}
