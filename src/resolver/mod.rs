//! Platform/configuration matrix resolution.
//!
//! The resolver is pure: it normalizes the declared matrix, substituting
//! the caller's defaults where nothing is declared, and validates names.

pub mod errors;

pub use errors::MatrixError;

use std::collections::HashSet;

use crate::core::platform::{BuildConfiguration, BuildPlatform, MatrixDefaults};
use crate::parser::Solution;

/// Normalizes and validates a declared matrix.
#[derive(Debug, Clone, Default)]
pub struct MatrixResolver {
    defaults: MatrixDefaults,
}

impl MatrixResolver {
    pub fn new(defaults: MatrixDefaults) -> Self {
        MatrixResolver { defaults }
    }

    pub fn defaults(&self) -> &MatrixDefaults {
        &self.defaults
    }

    /// Resolve the declared platforms into a matrix in which every platform
    /// has at least one configuration.
    ///
    /// No platforms yields the default platform with the default
    /// configuration. A platform without configurations gets the default
    /// configuration. Names must be non-empty and unique (platforms across
    /// the matrix, configurations within their platform), compared without
    /// regard to ASCII case as MSBuild does.
    pub fn resolve(&self, declared: &[BuildPlatform]) -> Result<Vec<BuildPlatform>, MatrixError> {
        if declared.is_empty() {
            return Ok(vec![BuildPlatform::with_configurations(
                &self.defaults.platform,
                [&self.defaults.configuration],
            )]);
        }

        let mut seen_platforms = HashSet::new();
        let mut matrix = Vec::with_capacity(declared.len());

        for (index, platform) in declared.iter().enumerate() {
            let name = platform.name().trim();
            if name.is_empty() {
                return Err(MatrixError::EmptyPlatformName { index });
            }
            if !seen_platforms.insert(name.to_ascii_lowercase()) {
                return Err(MatrixError::DuplicatePlatform {
                    platform: name.to_string(),
                });
            }

            let mut seen_configurations = HashSet::new();
            let mut configurations = Vec::with_capacity(platform.configurations().len());
            for configuration in platform.configurations() {
                let configuration_name = configuration.name().trim();
                if configuration_name.is_empty() {
                    return Err(MatrixError::EmptyConfigurationName {
                        platform: name.to_string(),
                    });
                }
                if !seen_configurations.insert(configuration_name.to_ascii_lowercase()) {
                    return Err(MatrixError::DuplicateConfiguration {
                        platform: name.to_string(),
                        configuration: configuration_name.to_string(),
                    });
                }
                configurations.push(BuildConfiguration::new(configuration_name));
            }

            if configurations.is_empty() {
                configurations.push(BuildConfiguration::new(&self.defaults.configuration));
            }

            matrix.push(BuildPlatform::new(name, configurations));
        }

        Ok(matrix)
    }

    /// Verify that the solution declares every pair of the matrix.
    pub fn cross_check(&self, matrix: &[BuildPlatform], solution: &Solution) -> Result<(), MatrixError> {
        for pair in matrix.iter().flat_map(|p| p.pairs()) {
            if !solution.declares(&pair) {
                return Err(MatrixError::PairNotInSolution {
                    platform: pair.platform,
                    configuration: pair.configuration,
                    solution: solution.path.clone(),
                    declared: solution.pairs.iter().map(|p| p.msbuild_key()).collect(),
                });
            }
        }
        Ok(())
    }
}
