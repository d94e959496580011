use std::io::Write;

use anyhow::{Context, Result};

use crate::models::{Diagnostic, Importance, Severity};

use super::DiagnosticSink;

/// Origin printed for warnings and errors that carry no file of their own.
const DEFAULT_ORIGIN: &str = "tally";

/// Writes diagnostics in MSBuild canonical error format, one per line:
///
/// ```text
/// a.cs(10): error : T1: boom
/// Skipping test: warning : T2: not ready
///   Tests: 10, Failures: 2, Skipped: 1, Time: 3.456 seconds
/// ```
///
/// Informational messages below `min_importance` are dropped; warnings and
/// errors always pass.
pub struct ConsoleSink<W: Write> {
    out: W,
    min_importance: Importance,
}

impl ConsoleSink<std::io::Stdout> {
    pub fn stdout(min_importance: Importance) -> Self {
        Self::new(std::io::stdout(), min_importance)
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W, min_importance: Importance) -> Self {
        Self {
            out,
            min_importance,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Render one diagnostic as a single MSBuild-style line (no trailing newline).
pub fn render_line(diagnostic: &Diagnostic) -> String {
    let label = match diagnostic.severity {
        Severity::Message(_) => return diagnostic.message.clone(),
        Severity::Warning => "warning",
        Severity::Error => "error",
    };

    let origin = diagnostic.origin.as_deref().unwrap_or(DEFAULT_ORIGIN);
    let position = match (diagnostic.line, diagnostic.column) {
        (0, _) => String::new(),
        (line, 0) => format!("({line})"),
        (line, column) => format!("({line},{column})"),
    };

    format!("{origin}{position}: {label} : {}", diagnostic.message)
}

impl<W: Write> DiagnosticSink for ConsoleSink<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) -> Result<()> {
        if diagnostic.importance() < self.min_importance {
            return Ok(());
        }
        writeln!(self.out, "{}", render_line(diagnostic)).context("failed to write diagnostic")
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush().context("failed to flush diagnostics")
    }
}
