//! Matrix build orchestration.
//!
//! This module drives MSBuild and the quality tools across the
//! platform/configuration matrix.

pub mod events;
pub mod locate;
pub mod msbuild;
pub mod orchestrator;
pub mod phase;

pub use events::{JsonObserver, NoopObserver, PhaseEvent, PhaseObserver, ProgressObserver};
pub use locate::ToolLocator;
pub use orchestrator::{BuildOrchestrator, Plan};
pub use phase::{PairResult, Phase, PhaseRequest, PhaseResult, ProjectResult, ProjectStatus};
