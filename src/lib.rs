//! vcmatrix - drive MSBuild across a platform/configuration matrix
//!
//! This crate provides the core library functionality for vcmatrix:
//! reading Visual Studio solutions and projects, resolving the build
//! matrix, and running MSBuild and the C++ quality tools over every pair.

pub mod builder;
pub mod core;
pub mod error;
pub mod ops;
pub mod parser;
pub mod resolver;
pub mod tools;
pub mod util;

/// Test utilities and mocks for vcmatrix unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a scripted process runner and fixture
/// builders for solutions and projects.
#[cfg(test)]
pub mod test_support;

pub use core::{
    manifest::Manifest, platform::BuildPair, platform::BuildPlatform, project::VCProject,
    workspace::Workspace,
};

pub use error::{ConfigError, Error, Result};
pub use util::context::GlobalContext;
