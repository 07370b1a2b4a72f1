//! Line consumers for relaying child-process output.
//!
//! A consumer is passed to each [`CommandRunner::run`] call, so there is no
//! process-wide relay state: the same tool can log to `tracing` in one call
//! and stream into a report file in the next.
//!
//! [`CommandRunner::run`]: crate::util::process::CommandRunner::run

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Receives output one line at a time, without the trailing newline.
pub trait LineConsumer {
    fn consume(&mut self, line: &str) -> io::Result<()>;
}

/// Severity used by [`LogConsumer`] when relaying lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayLevel {
    Info,
    Warn,
}

/// Relays every line as a `tracing` event tagged with the tool name.
#[derive(Debug, Clone)]
pub struct LogConsumer {
    tool: String,
    level: RelayLevel,
}

impl LogConsumer {
    /// Relay at `info` level.
    pub fn info(tool: impl Into<String>) -> Self {
        LogConsumer {
            tool: tool.into(),
            level: RelayLevel::Info,
        }
    }

    /// Relay at `warn` level, for diagnostic streams.
    pub fn warn(tool: impl Into<String>) -> Self {
        LogConsumer {
            tool: tool.into(),
            level: RelayLevel::Warn,
        }
    }
}

impl LineConsumer for LogConsumer {
    fn consume(&mut self, line: &str) -> io::Result<()> {
        match self.level {
            RelayLevel::Info => tracing::info!(tool = %self.tool, "{}", line),
            RelayLevel::Warn => tracing::warn!(tool = %self.tool, "{}", line),
        }
        Ok(())
    }
}

/// Collects lines in memory.
#[derive(Debug, Clone, Default)]
pub struct CaptureConsumer {
    lines: Vec<String>,
}

impl CaptureConsumer {
    pub fn new() -> Self {
        CaptureConsumer::default()
    }

    /// The lines captured so far.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// All captured lines joined with `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

impl LineConsumer for CaptureConsumer {
    fn consume(&mut self, line: &str) -> io::Result<()> {
        self.lines.push(line.to_string());
        Ok(())
    }
}

/// Writes each line, newline terminated, into any [`Write`] sink.
#[derive(Debug)]
pub struct WriterConsumer<W: Write> {
    writer: W,
}

impl<W: Write> WriterConsumer<W> {
    pub fn new(writer: W) -> Self {
        WriterConsumer { writer }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> LineConsumer for WriterConsumer<W> {
    fn consume(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.writer, "{}", line)
    }
}

/// A report file scoped to one project's processing.
///
/// Created (with parent directories) before the tool runs, filled through
/// [`LineConsumer`], and closed with [`ReportWriter::finish`], which flushes
/// and syncs so that close failures surface as errors.
#[derive(Debug)]
pub struct ReportWriter {
    path: PathBuf,
    inner: WriterConsumer<BufWriter<File>>,
}

impl ReportWriter {
    /// Create (or truncate) the report file at `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(ReportWriter {
            path: path.to_path_buf(),
            inner: WriterConsumer::new(BufWriter::new(file)),
        })
    }

    /// Path of the report being written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a block of text verbatim.
    pub fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.inner.writer.write_all(text.as_bytes())
    }

    /// Flush buffered output and close the file.
    pub fn finish(self) -> io::Result<()> {
        let file = self
            .inner
            .into_inner()
            .into_inner()
            .map_err(|e| e.into_error())?;
        file.sync_all()
    }
}

impl LineConsumer for ReportWriter {
    fn consume(&mut self, line: &str) -> io::Result<()> {
        self.inner.consume(line)
    }
}
