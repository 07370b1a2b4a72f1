//! Test utilities and mocks for vcmatrix unit tests.
//!
//! [`MockRunner`] stands in for the real process runner: it records every
//! invocation and answers with scripted exit codes and output lines.
//!
//! # Example
//!
//! ```rust,ignore
//! use vcmatrix::test_support::{MockRunner, MockOutput};
//!
//! #[test]
//! fn test_example() {
//!     let mut runner = MockRunner::new();
//!     runner.expect_contains("/p:Platform=x64", MockOutput::failure(3, "error C2065"));
//!     runner.set_default(MockOutput::success(""));
//!
//!     // Hand `&runner` to the orchestrator...
//! }
//! ```

pub mod fixtures;

use std::io;
use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::util::consumer::LineConsumer;
use crate::util::process::{CommandRunner, Invocation, ProcessError};

pub use fixtures::*;

/// Scripted result of one invocation.
#[derive(Debug, Clone)]
pub struct MockOutput {
    /// Exit status code (0 = success).
    pub status: i32,
    /// Standard output, split into lines when relayed.
    pub stdout: String,
    /// Standard error, split into lines when relayed.
    pub stderr: String,
    /// Fail with [`ProcessError::Launch`] instead of running.
    pub launch_failure: bool,
}

impl MockOutput {
    /// Create a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        MockOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
            launch_failure: false,
        }
    }

    /// Create a failure output with the given stderr and status code.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
            launch_failure: false,
        }
    }

    /// Create an output with both stdout and stderr.
    pub fn with_output(status: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        MockOutput {
            status,
            stdout: stdout.into(),
            stderr: stderr.into(),
            launch_failure: false,
        }
    }

    /// The program cannot be started.
    pub fn launch_failure() -> Self {
        MockOutput {
            launch_failure: true,
            ..MockOutput::success("")
        }
    }
}

impl Default for MockOutput {
    fn default() -> Self {
        MockOutput::success("")
    }
}

/// Pattern for matching commands in [`MockRunner`].
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match if command contains substring.
    Contains(String),
    /// Match using a regex pattern.
    Regex(String),
    /// Match any command.
    Any,
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
            CommandPattern::Regex(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(cmd))
                .unwrap_or(false),
            CommandPattern::Any => true,
        }
    }
}

/// Expectation for a command execution.
#[derive(Debug, Clone)]
pub struct CommandExpectation {
    /// Pattern to match against commands.
    pub pattern: CommandPattern,
    /// Output to return when matched.
    pub output: MockOutput,
    /// Number of times this expectation can be used (None = unlimited).
    pub times: Option<usize>,
    /// Number of times this expectation has been used.
    pub used: usize,
}

impl CommandExpectation {
    pub fn new(pattern: CommandPattern, output: MockOutput) -> Self {
        CommandExpectation {
            pattern,
            output,
            times: None,
            used: 0,
        }
    }

    /// Set the number of times this expectation can be used.
    pub fn times(mut self, n: usize) -> Self {
        self.times = Some(n);
        self
    }

    /// Check if this expectation can still be used.
    pub fn available(&self) -> bool {
        match self.times {
            Some(n) => self.used < n,
            None => true,
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    expectations: Vec<CommandExpectation>,
    calls: Vec<Invocation>,
    default_output: Option<MockOutput>,
}

/// Scripted [`CommandRunner`].
///
/// Expectations are tried in insertion order; the first available match
/// wins. Unmatched commands fall back to the default output, or fail to
/// launch when there is none.
#[derive(Debug, Default)]
pub struct MockRunner {
    state: Mutex<MockState>,
}

impl MockRunner {
    pub fn new() -> Self {
        MockRunner::default()
    }

    fn state(&mut self) -> &mut MockState {
        self.state.get_mut().expect("mock state poisoned")
    }

    /// Add an expectation for an exact command match.
    pub fn expect(&mut self, cmd: &str, output: MockOutput) -> &mut Self {
        self.expect_pattern(CommandExpectation::new(
            CommandPattern::Exact(cmd.to_string()),
            output,
        ))
    }

    /// Add an expectation for a command starting with a prefix.
    pub fn expect_prefix(&mut self, prefix: &str, output: MockOutput) -> &mut Self {
        self.expect_pattern(CommandExpectation::new(
            CommandPattern::StartsWith(prefix.to_string()),
            output,
        ))
    }

    /// Add an expectation for a command containing a substring.
    pub fn expect_contains(&mut self, substring: &str, output: MockOutput) -> &mut Self {
        self.expect_pattern(CommandExpectation::new(
            CommandPattern::Contains(substring.to_string()),
            output,
        ))
    }

    /// Add a custom expectation.
    pub fn expect_pattern(&mut self, expectation: CommandExpectation) -> &mut Self {
        self.state().expectations.push(expectation);
        self
    }

    /// Set a default output for commands that don't match any expectation.
    pub fn set_default(&mut self, output: MockOutput) -> &mut Self {
        self.state().default_output = Some(output);
        self
    }

    /// All invocations made so far.
    pub fn calls(&self) -> Vec<Invocation> {
        self.state
            .lock()
            .expect("mock state poisoned")
            .calls
            .clone()
    }

    /// All invocations rendered as command lines.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(Invocation::display_command).collect()
    }

    /// Verify that all expectations with a specific count were satisfied.
    pub fn verify(&self) -> Result<()> {
        let state = self.state.lock().expect("mock state poisoned");
        for (i, exp) in state.expectations.iter().enumerate() {
            if let Some(expected) = exp.times {
                if exp.used != expected {
                    bail!(
                        "expectation {} was used {} times, expected {}",
                        i,
                        exp.used,
                        expected
                    );
                }
            }
        }
        Ok(())
    }
}

fn relay(text: &str, consumer: &mut dyn LineConsumer) -> io::Result<()> {
    for line in text.lines() {
        consumer.consume(line)?;
    }
    Ok(())
}

impl CommandRunner for MockRunner {
    fn run(
        &self,
        invocation: &Invocation,
        stdout: &mut dyn LineConsumer,
        stderr: &mut dyn LineConsumer,
    ) -> Result<i32, ProcessError> {
        let full_cmd = invocation.display_command();
        let output = {
            let mut state = self.state.lock().expect("mock state poisoned");
            state.calls.push(invocation.clone());

            let matched = state
                .expectations
                .iter_mut()
                .find(|exp| exp.pattern.matches(&full_cmd) && exp.available())
                .map(|exp| {
                    exp.used += 1;
                    exp.output.clone()
                });
            matched.or_else(|| state.default_output.clone())
        };

        let program = invocation.program().to_path_buf();
        let output = match output {
            Some(output) if !output.launch_failure => output,
            _ => {
                return Err(ProcessError::Launch {
                    program,
                    source: io::Error::new(io::ErrorKind::NotFound, format!("unexpected command: {}", full_cmd)),
                })
            }
        };

        relay(&output.stdout, stdout).map_err(|source| ProcessError::Output {
            program: program.clone(),
            source,
        })?;
        relay(&output.stderr, stderr).map_err(|source| ProcessError::Output { program, source })?;

        Ok(output.status)
    }
}

/// Assertion helpers for testing.
pub mod assertions {
    /// Assert that a result is Ok and return the value.
    pub fn assert_ok<T, E: std::fmt::Debug>(result: Result<T, E>) -> T {
        match result {
            Ok(v) => v,
            Err(e) => panic!("expected Ok, got Err: {:?}", e),
        }
    }

    /// Assert that a result is Err and return the error.
    pub fn assert_err<T: std::fmt::Debug, E>(result: Result<T, E>) -> E {
        match result {
            Ok(v) => panic!("expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    }

    /// Assert that a file contains specific content.
    pub fn assert_file_contains(path: impl AsRef<std::path::Path>, content: &str) {
        let path = path.as_ref();
        let actual = std::fs::read_to_string(path)
            .unwrap_or_else(|_| panic!("file not found: {}", path.display()));
        assert!(
            actual.contains(content),
            "file {} does not contain '{}'\nactual content:\n{}",
            path.display(),
            content,
            actual
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::consumer::CaptureConsumer;

    #[test]
    fn test_mock_runner_matches_in_order() {
        let mut runner = MockRunner::new();
        runner.expect_contains("x64", MockOutput::failure(3, "boom"));
        runner.set_default(MockOutput::success("ok\nfine"));

        let mut out = CaptureConsumer::new();
        let mut err = CaptureConsumer::new();

        let win32 = Invocation::new("msbuild").arg("/p:Platform=Win32");
        assert_eq!(runner.run(&win32, &mut out, &mut err).unwrap(), 0);
        assert_eq!(out.lines(), ["ok", "fine"]);

        let x64 = Invocation::new("msbuild").arg("/p:Platform=x64");
        assert_eq!(runner.run(&x64, &mut out, &mut err).unwrap(), 3);
        assert_eq!(err.lines(), ["boom"]);

        assert_eq!(
            runner.command_lines(),
            ["msbuild /p:Platform=Win32", "msbuild /p:Platform=x64"]
        );
    }

    #[test]
    fn test_mock_runner_unexpected_command() {
        let runner = MockRunner::new();
        let result = runner.run(
            &Invocation::new("unknown"),
            &mut CaptureConsumer::new(),
            &mut CaptureConsumer::new(),
        );
        assert!(matches!(result, Err(ProcessError::Launch { .. })));
    }

    #[test]
    fn test_expectation_times() {
        let mut runner = MockRunner::new();
        runner.expect_pattern(
            CommandExpectation::new(CommandPattern::Any, MockOutput::success("")).times(2),
        );
        let inv = Invocation::new("tool");
        let mut sink = CaptureConsumer::new();
        let mut sink2 = CaptureConsumer::new();

        runner.run(&inv, &mut sink, &mut sink2).unwrap();
        assert!(runner.verify().is_err());
        runner.run(&inv, &mut sink, &mut sink2).unwrap();
        assert!(runner.verify().is_ok());
        assert!(runner.run(&inv, &mut sink, &mut sink2).is_err());
    }

    #[test]
    fn test_assertions() {
        use assertions::*;

        let ok_result: Result<i32, &str> = Ok(42);
        assert_eq!(assert_ok(ok_result), 42);

        let err_result: Result<i32, &str> = Err("error");
        assert_eq!(assert_err(err_result), "error");
    }
}
