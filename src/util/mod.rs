//! Shared utilities

pub mod config;
pub mod consumer;
pub mod context;
pub mod diagnostic;
pub mod fs;
pub mod process;
pub mod shell;

pub use config::Config;
pub use consumer::{CaptureConsumer, LineConsumer, LogConsumer, ReportWriter};
pub use context::GlobalContext;
pub use diagnostic::Diagnostic;
pub use process::{CommandRunner, Invocation, ProcessError, ProcessRunner};
pub use shell::{ColorChoice, Shell, Status};
