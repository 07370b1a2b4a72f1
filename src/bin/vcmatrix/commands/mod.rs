//! Command implementations

pub mod build;
pub mod check;
pub mod completions;
pub mod sonar;

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::{Cli, MessageFormat};
use vcmatrix::builder::{PhaseObserver, PhaseResult, ProjectStatus};
use vcmatrix::core::Workspace;
use vcmatrix::util::{GlobalContext, Shell, Status};

/// Per-invocation state shared by every command.
pub struct Session {
    pub shell: Shell,
    quiet: bool,
    verbose: bool,
    color: vcmatrix::util::ColorChoice,
    message_format: Option<MessageFormat>,
    manifest_path: Option<PathBuf>,
}

impl Session {
    pub fn from_cli(cli: &Cli) -> Self {
        Session {
            shell: Shell::from_flags(
                cli.quiet,
                cli.verbose,
                cli.color,
                cli.message_format == Some(MessageFormat::Json),
            ),
            quiet: cli.quiet,
            verbose: cli.verbose,
            color: cli.color,
            message_format: cli.message_format,
            manifest_path: cli.manifest_path.clone(),
        }
    }

    /// Load the workspace from `--manifest-path` or the nearest manifest.
    /// A configured message format applies unless the flag was given.
    pub fn workspace(&mut self) -> Result<Workspace> {
        let mut ctx = GlobalContext::new()?;
        ctx.set_verbose(self.verbose);

        let manifest_path = match &self.manifest_path {
            Some(path) => path.clone(),
            None => ctx.find_manifest()?,
        };
        let ws = Workspace::new(&manifest_path, &ctx)?;

        if self.message_format.is_none() {
            match ws.config().output.message_format.as_deref() {
                Some(format) if format.eq_ignore_ascii_case("json") => {
                    self.shell = Shell::from_flags(self.quiet, self.verbose, self.color, true);
                }
                Some(format) if !format.eq_ignore_ascii_case("human") => {
                    self.shell.warn(format!(
                        "ignoring unknown message format `{}` in [output]",
                        format
                    ));
                }
                _ => {}
            }
        }

        Ok(ws)
    }

    pub fn observer(&self) -> Box<dyn PhaseObserver> {
        self.shell.observer()
    }

    /// Summarize a finished phase.
    pub fn finished(&self, result: &PhaseResult) {
        let projects = result
            .pairs
            .iter()
            .flat_map(|pair| &pair.projects)
            .filter(|project| !matches!(project.status, ProjectStatus::Skipped))
            .count();
        if projects == 0 {
            self.shell.status(
                Status::Finished,
                format!("{} for {} pair(s)", result.phase, result.pairs.len()),
            );
        } else {
            self.shell.status(
                Status::Finished,
                format!(
                    "{} for {} project run(s) across {} pair(s)",
                    result.phase,
                    projects,
                    result.pairs.len()
                ),
            );
        }
    }

    /// Report that a tool is switched off in the manifest.
    pub fn skipped(&self, tool: &str) {
        self.shell
            .status(Status::Skipped, format!("{} (skip = true in vcmatrix.toml)", tool));
    }
}
