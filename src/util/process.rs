//! Subprocess execution utilities.
//!
//! [`Invocation`] describes one external command; [`ProcessRunner`] spawns
//! it, relays its output line by line to a pair of [`LineConsumer`]s and
//! returns the exit code. Orchestration code talks to the [`CommandRunner`]
//! trait so tests can substitute a scripted runner.

use std::fmt;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::util::consumer::LineConsumer;

/// How often the supervising thread checks for interruption.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Errors raised while launching or supervising a child process.
///
/// All of these are fatal for the invocation that produced them; the runner
/// never retries.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to launch `{}`", program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("working directory `{}` for `{}` does not exist", cwd.display(), program.display())]
    WorkingDirectory { program: PathBuf, cwd: PathBuf },

    #[error("interrupted while waiting for `{}` ({reason})", program.display())]
    Interrupted { program: PathBuf, reason: String },

    #[error("`{}` was terminated without an exit code", program.display())]
    Terminated { program: PathBuf },

    #[error("failed to relay output of `{}`", program.display())]
    Output {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error while waiting for `{}`", program.display())]
    Wait {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One external command: program, arguments, working directory and
/// optional literal standard input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    stdin: Option<String>,
}

impl Invocation {
    /// Create a new invocation of the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        Invocation {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
            stdin: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Feed the given text to the process's standard input.
    pub fn stdin(mut self, data: impl Into<String>) -> Self {
        self.stdin = Some(data.into());
        self
    }

    /// Get the program path.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get the working directory, if set.
    pub fn get_cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Get the standard input text, if any.
    pub fn get_stdin(&self) -> Option<&str> {
        self.stdin.as_deref()
    }

    /// Display the command for logs and error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_command())
    }
}

/// Something that can execute an [`Invocation`].
pub trait CommandRunner {
    /// Run the invocation to completion, relaying stdout and stderr line by
    /// line, and return the exit code.
    fn run(
        &self,
        invocation: &Invocation,
        stdout: &mut dyn LineConsumer,
        stderr: &mut dyn LineConsumer,
    ) -> Result<i32, ProcessError>;
}

/// The concrete [`CommandRunner`] backed by `std::process`.
///
/// By default it waits indefinitely. An interrupt flag and a timeout can be
/// attached; either one kills the child and yields
/// [`ProcessError::Interrupted`].
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    interrupt: Option<Arc<AtomicBool>>,
    timeout: Option<Duration>,
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

impl ProcessRunner {
    /// Create a runner with no timeout and no interrupt flag.
    pub fn new() -> Self {
        ProcessRunner::default()
    }

    /// Attach a flag that, once set, interrupts the current wait.
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    /// Bound each invocation to the given duration.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn interruption(&self, started: Instant) -> Option<String> {
        if let Some(flag) = &self.interrupt {
            if flag.load(Ordering::SeqCst) {
                return Some("interrupt requested".to_string());
            }
        }
        match self.timeout {
            Some(timeout) if started.elapsed() >= timeout => {
                Some(format!("timed out after {:.1}s", timeout.as_secs_f64()))
            }
            _ => None,
        }
    }

    fn build_command(invocation: &Invocation) -> Command {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);

        if let Some(ref cwd) = invocation.cwd {
            cmd.current_dir(cwd);
        }

        if invocation.stdin.is_some() {
            cmd.stdin(Stdio::piped());
        } else {
            cmd.stdin(Stdio::null());
        }
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        cmd
    }
}

/// Pipe helpers run detached: a grandchild that inherited the pipes can
/// keep them open after the child is killed, and an interrupted run must not
/// wait for it.
fn spawn_reader<R>(pipe: R, stream: Stream, tx: Sender<(Stream, String)>)
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(pipe);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim_end_matches(['\n', '\r']).to_string();
                    if tx.send((stream, line)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!("stopped reading {:?}: {}", stream, e);
                    break;
                }
            }
        }
    });
}

fn spawn_writer(mut pipe: ChildStdin, data: String) {
    thread::spawn(move || {
        // A child that exits without reading its input closes the pipe early.
        if let Err(e) = pipe.write_all(data.as_bytes()) {
            tracing::debug!("stdin not fully consumed: {}", e);
        }
    });
}

fn kill(child: &mut Child) {
    // The child may already have exited; both calls are best effort.
    let _ = child.kill();
    let _ = child.wait();
}

impl CommandRunner for ProcessRunner {
    fn run(
        &self,
        invocation: &Invocation,
        stdout: &mut dyn LineConsumer,
        stderr: &mut dyn LineConsumer,
    ) -> Result<i32, ProcessError> {
        let program = invocation.program.clone();

        if let Some(cwd) = &invocation.cwd {
            if !cwd.is_dir() {
                return Err(ProcessError::WorkingDirectory {
                    program,
                    cwd: cwd.clone(),
                });
            }
        }

        tracing::debug!("running `{}`", invocation.display_command());

        let mut child = Self::build_command(invocation)
            .spawn()
            .map_err(|source| ProcessError::Launch {
                program: program.clone(),
                source,
            })?;

        let child_stdin = child.stdin.take();
        let child_stdout = child.stdout.take();
        let child_stderr = child.stderr.take();
        let started = Instant::now();

        if let (Some(pipe), Some(data)) = (child_stdin, invocation.stdin.as_deref()) {
            spawn_writer(pipe, data.to_string());
        }

        let (tx, rx) = mpsc::channel();
        if let Some(pipe) = child_stdout {
            spawn_reader(pipe, Stream::Stdout, tx.clone());
        }
        if let Some(pipe) = child_stderr {
            spawn_reader(pipe, Stream::Stderr, tx.clone());
        }
        drop(tx);

        let mut relay_error: Option<io::Error> = None;
        loop {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok((stream, line)) => {
                    let relayed = match stream {
                        Stream::Stdout => stdout.consume(&line),
                        Stream::Stderr => stderr.consume(&line),
                    };
                    if let Err(e) = relayed {
                        relay_error.get_or_insert(e);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            if let Some(reason) = self.interruption(started) {
                kill(&mut child);
                return Err(ProcessError::Interrupted { program, reason });
            }
        }

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if let Some(reason) = self.interruption(started) {
                        kill(&mut child);
                        return Err(ProcessError::Interrupted { program, reason });
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(source) => return Err(ProcessError::Wait { program, source }),
            }
        };

        if let Some(source) = relay_error {
            return Err(ProcessError::Output { program, source });
        }

        let code = status.code().ok_or_else(|| ProcessError::Terminated {
            program: program.clone(),
        })?;
        tracing::debug!("`{}` exited with {}", program.display(), code);
        Ok(code)
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}
