//! Diagnostics sinks: where rejected-row messages are persisted.
//!
//! A sink receives the run's diagnostic lines exactly once, in row-major order,
//! and only when at least one row was rejected; clean runs leave no trace. Sink
//! failures are fatal to the run: the rejection log is part of the conversion
//! contract, not best-effort observability (observers cover that).

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Ordered, line-oriented destination for rejected-row diagnostics.
pub trait DiagnosticsSink: Send + Sync {
    /// Persist `lines` in order.
    fn write_lines(&self, lines: &[String]) -> io::Result<()>;
}

/// Writes diagnostics to a file.
///
/// The file is created (truncating any previous content) when the sink is
/// actually invoked, so it exists only for runs that rejected rows.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    /// Create a sink targeting `path`. Nothing is written until the pipeline
    /// hands over diagnostics.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Target path of this sink.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DiagnosticsSink for FileSink {
    fn write_lines(&self, lines: &[String]) -> io::Result<()> {
        let mut file = File::create(&self.path)?;
        for line in lines {
            writeln!(file, "{line}")?;
        }
        file.flush()
    }
}

/// Writes diagnostics to stderr.
#[derive(Debug, Default)]
pub struct StdErrSink;

impl DiagnosticsSink for StdErrSink {
    fn write_lines(&self, lines: &[String]) -> io::Result<()> {
        let stderr = io::stderr();
        let mut out = stderr.lock();
        for line in lines {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }
}

/// Collects diagnostics in memory.
///
/// Useful in tests and in embeddings that return diagnostics to a caller (for
/// example an HTTP layer echoing them in its response body).
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines collected so far, in write order.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

impl DiagnosticsSink for MemorySink {
    fn write_lines(&self, lines: &[String]) -> io::Result<()> {
        if let Ok(mut guard) = self.lines.lock() {
            guard.extend_from_slice(lines);
        }
        Ok(())
    }
}
