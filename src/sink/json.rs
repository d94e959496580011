use std::io::Write;

use anyhow::{Context, Result};

use crate::models::Diagnostic;

use super::DiagnosticSink;

/// Writes every diagnostic as one JSON object per line.
pub struct JsonSink<W: Write> {
    out: W,
}

impl JsonSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DiagnosticSink for JsonSink<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) -> Result<()> {
        serde_json::to_writer(&mut self.out, diagnostic).context("failed to serialize diagnostic")?;
        self.out.write_all(b"\n").context("failed to write diagnostic")
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush().context("failed to flush diagnostics")
    }
}
