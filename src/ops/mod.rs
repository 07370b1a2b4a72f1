//! High-level operations.
//!
//! This module contains the implementation of vcmatrix commands. Each
//! operation turns a [`Workspace`](crate::core::Workspace) into a phase
//! request, runs it through the orchestrator and returns the typed result;
//! the CLI only decides how to print it.

pub mod build;
pub mod quality;
pub mod sonar;

pub use build::{build, clean, test_build};
pub use quality::{check, cppcheck, testgen, vera};
pub use sonar::sonar;
pub use test::test;

use crate::builder::events::{NoopObserver, PhaseObserver};
use crate::builder::BuildOrchestrator;
use crate::util::process::CommandRunner;

/// Collaborators shared by every operation.
#[derive(Clone, Copy)]
pub struct OpContext<'a> {
    pub runner: &'a dyn CommandRunner,
    pub observer: &'a dyn PhaseObserver,
}

static NOOP: NoopObserver = NoopObserver;

impl<'a> OpContext<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        OpContext {
            runner,
            observer: &NOOP,
        }
    }

    pub fn with_observer(mut self, observer: &'a dyn PhaseObserver) -> Self {
        self.observer = observer;
        self
    }

    pub(crate) fn orchestrator(&self) -> BuildOrchestrator<'a> {
        BuildOrchestrator::new(self.runner).with_observer(self.observer)
    }
}

/// Log that a tool is switched off in the manifest.
pub(crate) fn log_skip(tool: &str, section: &str) {
    tracing::info!("{} is skipped (skip = true in [{}])", tool, section);
}
