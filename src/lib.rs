pub mod app;
pub mod config;
pub mod listener;
pub mod models;
pub mod reporter;
pub mod runner;
pub mod sink;

pub use listener::{FanOut, Quiet, RunnerListener, SequenceCheck, Verbose};
pub use models::{
    AssemblyTotals, Diagnostic, SourceLocation, TestRunSummary, parse_stack_trace_location,
};
pub use reporter::{Finish, Report, RunOutcome, StandardReporter};
pub use sink::DiagnosticSink;
