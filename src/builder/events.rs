//! Phase events for progress display and JSON output.
//!
//! With `--message-format=json` every event is written to stdout as one
//! JSON object per line, tagged by `reason`:
//!
//! - `pair-started`: a pair of the matrix is about to run
//! - `project-checked`: a quality tool finished with one project
//! - `pair-finished`: a pair completed (success or failure)
//! - `phase-finished`: the whole phase completed
//!
//! New fields may be added; existing fields are not renamed or removed.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::builder::phase::ProjectStatus;
use crate::core::platform::BuildPair;

/// An event emitted while a phase runs.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "reason")]
pub enum PhaseEvent {
    #[serde(rename = "pair-started")]
    PairStarted {
        phase: String,
        platform: String,
        configuration: String,
        /// 1-based position in the matrix
        index: usize,
        total: usize,
    },

    #[serde(rename = "project-checked")]
    ProjectChecked {
        phase: String,
        project: String,
        platform: String,
        configuration: String,
        /// `passed`, `skipped`, `violations`, `tool-failure` or `error`
        status: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        exit_code: Option<i32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        report: Option<PathBuf>,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    #[serde(rename = "pair-finished")]
    PairFinished {
        phase: String,
        platform: String,
        configuration: String,
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        exit_code: Option<i32>,
    },

    #[serde(rename = "phase-finished")]
    PhaseFinished {
        phase: String,
        success: bool,
        duration_ms: u64,
        /// Number of failing pairs or projects
        failures: usize,
    },
}

impl PhaseEvent {
    pub fn pair_started(phase: &str, pair: &BuildPair, index: usize, total: usize) -> Self {
        PhaseEvent::PairStarted {
            phase: phase.to_string(),
            platform: pair.platform.clone(),
            configuration: pair.configuration.clone(),
            index,
            total,
        }
    }

    pub fn project_checked(
        phase: &str,
        project: &str,
        pair: &BuildPair,
        status: &ProjectStatus,
        report: Option<PathBuf>,
    ) -> Self {
        let message = match status {
            ProjectStatus::Error { message } => Some(message.clone()),
            _ => None,
        };
        PhaseEvent::ProjectChecked {
            phase: phase.to_string(),
            project: project.to_string(),
            platform: pair.platform.clone(),
            configuration: pair.configuration.clone(),
            status: status.label().to_string(),
            exit_code: status.exit_code(),
            report,
            message,
        }
    }

    pub fn pair_finished(phase: &str, pair: &BuildPair, success: bool, exit_code: Option<i32>) -> Self {
        PhaseEvent::PairFinished {
            phase: phase.to_string(),
            platform: pair.platform.clone(),
            configuration: pair.configuration.clone(),
            success,
            exit_code,
        }
    }

    pub fn phase_finished(phase: &str, success: bool, duration_ms: u64, failures: usize) -> Self {
        PhaseEvent::PhaseFinished {
            phase: phase.to_string(),
            success,
            duration_ms,
            failures,
        }
    }

    /// Serialize this event to a JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Receives phase events as they happen.
pub trait PhaseObserver {
    fn on_event(&self, event: &PhaseEvent);
}

/// Ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PhaseObserver for NoopObserver {
    fn on_event(&self, _event: &PhaseEvent) {}
}

/// Writes one JSON line per event.
pub struct JsonObserver<W: Write> {
    out: Mutex<W>,
}

impl JsonObserver<std::io::Stdout> {
    pub fn stdout() -> Self {
        JsonObserver::new(std::io::stdout())
    }
}

impl<W: Write> JsonObserver<W> {
    pub fn new(out: W) -> Self {
        JsonObserver {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write> PhaseObserver for JsonObserver<W> {
    fn on_event(&self, event: &PhaseEvent) {
        if let Ok(mut out) = self.out.lock() {
            if let Err(e) = writeln!(out, "{}", event.to_json()).and_then(|_| out.flush()) {
                tracing::debug!("failed to write event: {}", e);
            }
        }
    }
}

/// A progress bar over the pairs of the matrix.
#[derive(Default)]
pub struct ProgressObserver {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressObserver {
    pub fn new() -> Self {
        ProgressObserver::default()
    }

    fn start(total: usize) -> ProgressBar {
        let pb = ProgressBar::new(total as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}

impl PhaseObserver for ProgressObserver {
    fn on_event(&self, event: &PhaseEvent) {
        let Ok(mut bar) = self.bar.lock() else {
            return;
        };

        match event {
            PhaseEvent::PairStarted {
                phase,
                platform,
                configuration,
                total,
                ..
            } => {
                let pb = bar.get_or_insert_with(|| Self::start(*total));
                pb.set_message(format!("{} {}|{}", phase, configuration, platform));
            }
            PhaseEvent::PairFinished { .. } => {
                if let Some(pb) = bar.as_ref() {
                    pb.inc(1);
                }
            }
            PhaseEvent::PhaseFinished { .. } => {
                if let Some(pb) = bar.take() {
                    pb.finish_and_clear();
                }
            }
            PhaseEvent::ProjectChecked { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_started_serialization() {
        let event = PhaseEvent::pair_started("build", &BuildPair::new("x64", "Debug"), 2, 4);
        let json = event.to_json();
        assert!(json.contains("\"reason\":\"pair-started\""));
        assert!(json.contains("\"platform\":\"x64\""));
        assert!(json.contains("\"index\":2"));
        assert!(json.contains("\"total\":4"));
    }

    #[test]
    fn test_project_checked_serialization() {
        let event = PhaseEvent::project_checked(
            "cppcheck",
            "Core",
            &BuildPair::new("Win32", "Release"),
            &ProjectStatus::Violations { exit_code: 1 },
            Some(PathBuf::from("Core/cppcheck-reports/r.xml")),
        );
        let json = event.to_json();
        assert!(json.contains("\"reason\":\"project-checked\""));
        assert!(json.contains("\"status\":\"violations\""));
        assert!(json.contains("\"exit_code\":1"));
        assert!(json.contains("r.xml"));
        assert!(!json.contains("\"message\""));
    }

    #[test]
    fn test_phase_finished_serialization() {
        let json = PhaseEvent::phase_finished("vera++", false, 1200, 2).to_json();
        assert!(json.contains("\"reason\":\"phase-finished\""));
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("\"duration_ms\":1200"));
        assert!(json.contains("\"failures\":2"));
    }

    #[test]
    fn test_json_observer_writes_lines() {
        let observer = JsonObserver::new(Vec::new());
        let pair = BuildPair::new("Win32", "Debug");
        observer.on_event(&PhaseEvent::pair_started("clean", &pair, 1, 1));
        observer.on_event(&PhaseEvent::pair_finished("clean", &pair, true, Some(0)));

        let text = String::from_utf8(observer.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("\"reason\":\"pair-finished\""));
    }
}
