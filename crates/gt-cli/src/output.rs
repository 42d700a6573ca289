//! Status lines and delivery of generated files.
//!
//! Generated code goes to stdout (or to disk with `--write`); status lines
//! go to stderr. Outcomes arrive in completion order and are emitted in
//! input order through a small reorder buffer.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::fs;
use std::io::{self, Write};

use camino::Utf8Path;
use crossterm::style::Stylize;
use gt_core::OutputConfig;
use gt_gen::{PathOutcome, PathResult};
use tracing::debug;

/// Status line severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    const fn label(self) -> &'static str {
        match self {
            Self::Info => "[INFO]",
            Self::Warn => "[WARN]",
            Self::Error => "[ERROR]",
        }
    }
}

/// Writes `[LEVEL]\t-> message` lines.
#[derive(Debug)]
pub struct StatusWriter<W> {
    out: W,
    color: bool,
}

impl<W: Write> StatusWriter<W> {
    /// Creates a writer; `color` styles the label.
    pub const fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    fn line(&mut self, level: Level, message: impl Display) {
        let label = level.label();
        // Status output is best effort
        let _ = if self.color {
            let styled = match level {
                Level::Info => label.green(),
                Level::Warn => label.yellow(),
                Level::Error => label.red(),
            };
            writeln!(self.out, "{styled}\t-> {message}")
        } else {
            writeln!(self.out, "{label}\t-> {message}")
        };
    }

    /// Writes an `[INFO]` line.
    pub fn info(&mut self, message: impl Display) {
        self.line(Level::Info, message);
    }

    /// Writes a `[WARN]` line.
    pub fn warn(&mut self, message: impl Display) {
        self.line(Level::Warn, message);
    }

    /// Writes an `[ERROR]` line.
    pub fn error(&mut self, message: impl Display) {
        self.line(Level::Error, message);
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

/// Writes a test file with mode `0644`.
pub fn write_test_file(path: &Utf8Path, content: &[u8]) -> io::Result<()> {
    fs::write(path, content)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o644))?;
    }
    Ok(())
}

/// Emits outcomes in input order.
///
/// Without `allow_error`, the first failed path (in input order) stops
/// emission; later outcomes are discarded.
#[derive(Debug)]
pub struct Emitter<O, E> {
    code: O,
    status: StatusWriter<E>,
    write: bool,
    allow_error: bool,
    next: usize,
    pending: BTreeMap<usize, PathOutcome>,
    stopped: bool,
    failed: bool,
}

impl<O: Write, E: Write> Emitter<O, E> {
    /// Creates an emitter writing code to `code` and status lines to `status`.
    pub const fn new(code: O, status: StatusWriter<E>, output: &OutputConfig) -> Self {
        Self {
            code,
            status,
            write: output.write,
            allow_error: output.allow_error,
            next: 0,
            pending: BTreeMap::new(),
            stopped: false,
            failed: false,
        }
    }

    /// Accepts the outcome of input path `index`.
    ///
    /// Returns `true` when this outcome stopped emission; the caller should
    /// cancel the remaining work.
    pub fn accept(&mut self, index: usize, outcome: PathOutcome) -> bool {
        if self.stopped {
            debug!(path = %outcome.path, "discarding outcome after failure");
            return false;
        }

        self.pending.insert(index, outcome);
        while let Some(outcome) = self.pending.remove(&self.next) {
            self.next += 1;
            if self.emit(outcome) && !self.allow_error {
                self.stopped = true;
                self.pending.clear();
                return true;
            }
        }
        false
    }

    /// Emits outcomes still waiting behind paths that never finished.
    ///
    /// Call once the update channel is closed. A cancelled run leaves gaps;
    /// the outcomes after a gap are emitted in input order after one warning.
    pub fn finish(&mut self) {
        if self.stopped {
            return;
        }
        let Some(&last) = self.pending.keys().next_back() else {
            return;
        };

        let missing = last + 1 - self.next - self.pending.len();
        self.status
            .warn(format!("{missing} earlier path(s) were not processed"));

        let pending = std::mem::take(&mut self.pending);
        for (index, outcome) in pending {
            self.next = index + 1;
            if self.emit(outcome) && !self.allow_error {
                self.stopped = true;
                return;
            }
        }
    }

    /// Returns `true` if any emitted path failed.
    #[inline]
    pub const fn failed(&self) -> bool {
        self.failed
    }

    /// Reports an error that is not tied to a path.
    pub fn error(&mut self, message: impl Display) {
        self.status.error(message);
    }

    /// Emits one outcome. Returns `true` if the path failed.
    fn emit(&mut self, outcome: PathOutcome) -> bool {
        for warning in &outcome.warnings {
            self.status.warn(warning);
        }

        let failed = match outcome.result {
            PathResult::Generated(files) => {
                let mut failed = false;
                for file in &files {
                    if let Err(e) = self.deliver(&file.path, &file.content) {
                        self.status
                            .error(format!("failed to write {}: {e}", file.path));
                        failed = true;
                        continue;
                    }
                    for name in file.test_names() {
                        self.status.info(format!("generated: {name}"));
                    }
                }
                failed
            }
            PathResult::NoEligible => {
                self.status
                    .warn(format!("no tests generated for: {}", outcome.path));
                false
            }
            PathResult::Failed(e) => {
                self.status.error(e);
                true
            }
        };

        self.failed |= failed;
        failed
    }

    fn deliver(&mut self, path: &Utf8Path, content: &[u8]) -> io::Result<()> {
        if self.write {
            write_test_file(path, content)
        } else {
            self.code.write_all(content)
        }
    }

    #[cfg(test)]
    fn into_parts(self) -> (O, E) {
        (self.code, self.status.into_inner())
    }
}
