pub mod diagnostic;
pub mod location;
pub mod result;
pub mod status;
pub mod summary;

pub use diagnostic::{Diagnostic, DiagnosticKind, Importance, Severity};
pub use location::{SourceLocation, parse_stack_trace_location};
pub use result::{EngineException, Failure, StackFrame, TestCase};
pub use status::TestStatus;
pub use summary::{AssemblyTotals, TestRunSummary};
