pub mod console;
pub mod json;
pub mod memory;

pub use console::ConsoleSink;
pub use json::JsonSink;
pub use memory::MemorySink;

use anyhow::Result;

use crate::models::Diagnostic;

/// Receives finished diagnostics, one at a time, in emission order.
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: &Diagnostic) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Box<S> {
    fn emit(&mut self, diagnostic: &Diagnostic) -> Result<()> {
        (**self).emit(diagnostic)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}
