use anyhow::Result;

use crate::models::{Diagnostic, DiagnosticKind, Severity};

use super::DiagnosticSink;

/// Keeps every diagnostic in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemorySink {
    diagnostics: Vec<Diagnostic>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Text of the informational messages only.
    pub fn lines(&self) -> Vec<&str> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Message(_)))
            .map(|d| d.message.as_str())
            .collect()
    }

    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error()).collect()
    }

    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning()).collect()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.kind == kind).collect()
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&mut self, diagnostic: &Diagnostic) -> Result<()> {
        self.diagnostics.push(diagnostic.clone());
        Ok(())
    }
}
