//! Core data structures for vcmatrix.
//!
//! This module contains the foundational types used throughout vcmatrix:
//! - The build matrix (platforms, configurations and their pairs)
//! - The per-pair project model
//! - Manifests and workspace management

pub mod manifest;
pub mod platform;
pub mod project;
pub mod workspace;

pub use manifest::{Manifest, ManifestError, MANIFEST_NAME};
pub use platform::{BuildConfiguration, BuildPair, BuildPlatform, MatrixDefaults};
pub use project::VCProject;
pub use workspace::Workspace;
