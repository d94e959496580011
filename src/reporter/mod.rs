pub mod format;

pub use format::{captured_output_lines, escape};

use crate::listener::verbosity::Narrate;
use crate::listener::{Quiet, RunnerListener, Verbose};
use crate::models::{
    AssemblyTotals, Diagnostic, DiagnosticKind, EngineException, Failure, Importance,
    SourceLocation, StackFrame, TestCase, TestRunSummary, parse_stack_trace_location,
};
use crate::sink::DiagnosticSink;

/// Origin tag shown on skipped-test warnings.
const SKIP_ORIGIN: &str = "Skipping test";

/// How a run ended, as far as the reporter saw it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunOutcome {
    pub summary: TestRunSummary,
    pub unhandled_exceptions: usize,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        !self.summary.has_failures() && self.unhandled_exceptions == 0
    }
}

/// Listeners that can close out a run once the event stream ends.
pub trait Finish {
    fn finish(&mut self) -> RunOutcome;
}

impl<L: Finish + ?Sized> Finish for Box<L> {
    fn finish(&mut self) -> RunOutcome {
        (**self).finish()
    }
}

impl<L: Finish> Finish for Quiet<L> {
    fn finish(&mut self) -> RunOutcome {
        self.inner_mut().finish()
    }
}

impl<L: Finish> Finish for Verbose<L> {
    fn finish(&mut self) -> RunOutcome {
        self.inner_mut().finish()
    }
}

/// A listener that also closes out the run; what the CLI drives.
pub trait Report: RunnerListener + Finish {}

impl<T: RunnerListener + Finish + ?Sized> Report for T {}

/// Turns runner events into diagnostics on a [`DiagnosticSink`] and folds
/// each assembly's totals into a [`TestRunSummary`].
///
/// One reporter per event stream; it is not meant to be shared between
/// concurrently running engines.
pub struct StandardReporter<S: DiagnosticSink> {
    sink: S,
    summary: TestRunSummary,
    unhandled_exceptions: usize,
}

impl<S: DiagnosticSink> StandardReporter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            summary: TestRunSummary::new(),
            unhandled_exceptions: 0,
        }
    }

    pub fn summary(&self) -> TestRunSummary {
        self.summary
    }

    /// Number of `exception_thrown` notifications seen so far.
    pub fn unhandled_exceptions(&self) -> usize {
        self.unhandled_exceptions
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn emit(&mut self, diagnostic: Diagnostic) {
        if let Err(e) = self.sink.emit(&diagnostic) {
            tracing::warn!(error = %e, kind = ?diagnostic.kind, "dropping diagnostic");
        }
    }

    fn write_output(&mut self, output: Option<&str>) {
        for line in captured_output_lines(output) {
            self.emit(Diagnostic::message(
                DiagnosticKind::CapturedOutput,
                Importance::Normal,
                line,
            ));
        }
    }
}

fn totals_line(label: &str, totals: AssemblyTotals) -> String {
    format!(
        "{label}: {}, Failures: {}, Skipped: {}, Time: {:.3} seconds",
        totals.total, totals.failed, totals.skipped, totals.elapsed_seconds
    )
}

impl<S: DiagnosticSink> Finish for StandardReporter<S> {
    /// Print grand totals when more than one assembly ran, then flush the sink.
    fn finish(&mut self) -> RunOutcome {
        if self.summary.assemblies > 1 {
            let totals = totals_line("TOTAL Tests", self.summary.totals());
            self.emit(Diagnostic::message(DiagnosticKind::RunTotals, Importance::High, totals));
        }
        if let Err(e) = self.sink.flush() {
            tracing::warn!(error = %e, "failed to flush diagnostic sink");
        }
        RunOutcome {
            summary: self.summary,
            unhandled_exceptions: self.unhandled_exceptions,
        }
    }
}

impl<S: DiagnosticSink> Narrate for StandardReporter<S> {
    fn narrate(&mut self, diagnostic: Diagnostic) {
        self.emit(diagnostic);
    }
}

impl<S: DiagnosticSink> RunnerListener for StandardReporter<S> {
    fn assembly_start(&mut self, assembly: &str, config: Option<&str>, framework_version: &str) {
        tracing::debug!(assembly, config, framework_version, "assembly started");
    }

    fn test_passed(&mut self, test: &TestCase, _duration_seconds: f64, output: Option<&str>) {
        self.emit(Diagnostic::message(
            DiagnosticKind::TestPassed,
            Importance::Normal,
            format!("    {}", escape(&test.name)),
        ));
        self.write_output(output);
    }

    fn test_failed(
        &mut self,
        test: &TestCase,
        _duration_seconds: f64,
        output: Option<&str>,
        failure: &Failure,
    ) {
        let location = parse_stack_trace_location(&failure.stack_trace);
        self.emit(
            Diagnostic::error(
                DiagnosticKind::TestFailure,
                format!("{}: {}", escape(&test.name), escape(&failure.message)),
            )
            .at(location),
        );
        self.write_output(output);
    }

    fn test_skipped(&mut self, test: &TestCase, reason: &str) {
        self.emit(
            Diagnostic::warning(
                DiagnosticKind::TestSkipped,
                format!("{}: {}", escape(&test.name), escape(reason)),
            )
            .with_origin(SKIP_ORIGIN),
        );
    }

    fn class_failed(&mut self, class_name: &str, failure: &Failure) -> bool {
        let location = parse_stack_trace_location(&failure.stack_trace);
        self.emit(
            Diagnostic::error(
                DiagnosticKind::ClassFailure,
                format!("[CLASS] {}: {}", escape(class_name), escape(&failure.message)),
            )
            .at(location),
        );
        true
    }

    fn exception_thrown(&mut self, assembly: &str, exception: &EngineException) {
        self.unhandled_exceptions = self.unhandled_exceptions.saturating_add(1);

        // a position without a file is not navigable
        let (location, column) = match exception.origin() {
            Some(StackFrame {
                file: Some(file),
                line,
                column,
                ..
            }) if !file.is_empty() => (SourceLocation::new(file, *line), *column),
            _ => (SourceLocation::unknown(), 0),
        };
        let message = format!("{}\nWhile running: {}", exception.message, assembly);

        self.emit(
            Diagnostic::error(DiagnosticKind::UnhandledException, escape(&message))
                .at(location)
                .with_column(column),
        );
    }

    fn assembly_finished(&mut self, assembly: &str, totals: AssemblyTotals) {
        tracing::debug!(assembly, ?totals, "assembly finished");
        self.summary = self.summary.accumulate(totals);

        let progress = totals_line("  Tests", totals);
        self.emit(Diagnostic::message(DiagnosticKind::Progress, Importance::High, progress));
    }
}

#[cfg(test)]
mod tests {
    use anyhow::bail;

    use super::*;
    use crate::models::Severity;
    use crate::sink::{ConsoleSink, MemorySink};

    fn reporter() -> StandardReporter<MemorySink> {
        StandardReporter::new(MemorySink::new())
    }

    #[test]
    fn failed_test_becomes_one_located_error() {
        let mut r = reporter();
        r.test_failed(
            &TestCase::new("T1", "C", "M"),
            0.5,
            Some(""),
            &Failure::new("Ex", "boom", "at M in a.cs:line 10"),
        );

        let sink = r.sink();
        assert_eq!(sink.len(), 1);
        let diag = &sink.diagnostics()[0];
        assert!(diag.is_error());
        assert_eq!(diag.kind, DiagnosticKind::TestFailure);
        assert_eq!(diag.origin.as_deref(), Some("a.cs"));
        assert_eq!(diag.line, 10);
        assert_eq!(diag.message, "T1: boom");
    }

    #[test]
    fn failed_test_escapes_message_and_writes_output() {
        let mut r = reporter();
        r.test_failed(
            &TestCase::new("T1", "C", "M"),
            0.5,
            Some("line one\nline two"),
            &Failure::new("Ex", "Expected: 1\r\nActual: 2", "not a trace"),
        );

        let sink = r.sink();
        assert_eq!(sink.errors()[0].message, "T1: Expected: 1\\nActual: 2");
        assert_eq!(sink.errors()[0].origin, None);
        assert_eq!(
            sink.lines(),
            vec!["    Captured output:", "      line one", "      line two"]
        );
    }

    #[test]
    fn skipped_test_is_one_warning() {
        let mut r = reporter();
        r.test_skipped(&TestCase::new("T2", "C", "M"), "not ready");

        let warnings = r.sink().warnings();
        assert_eq!(r.sink().len(), 1);
        assert_eq!(warnings[0].message, "T2: not ready");
        assert_eq!(warnings[0].origin.as_deref(), Some("Skipping test"));
    }

    #[test]
    fn passed_test_is_one_info_line_plus_output() {
        let mut r = reporter();
        r.test_passed(&TestCase::new("T3", "C", "M"), 0.01, None);
        r.test_passed(&TestCase::new("T4", "C", "M"), 0.01, Some("hello\n"));

        assert_eq!(
            r.sink().lines(),
            vec!["    T3", "    T4", "    Captured output:", "      hello"]
        );
        assert_eq!(
            r.sink().diagnostics()[0].severity,
            Severity::Message(Importance::Normal)
        );
    }

    #[test]
    fn class_failure_is_handled_and_tagged() {
        let mut r = reporter();
        let handled = r.class_failed(
            "Db.Fixture",
            &Failure::new("SetupException", "no db", "at Db.Fixture..ctor() in /src/Db.cs:line 5\nat x"),
        );

        assert!(handled);
        let diag = &r.sink().errors()[0];
        assert_eq!(diag.kind, DiagnosticKind::ClassFailure);
        assert_eq!(diag.message, "[CLASS] Db.Fixture: no db");
        assert_eq!(diag.origin.as_deref(), Some("/src/Db.cs"));
        assert_eq!(diag.line, 5);
    }

    #[test]
    fn unhandled_exception_uses_first_frame() {
        let mut r = reporter();
        let exception = EngineException {
            exception_type: "System.InvalidOperationException".into(),
            message: "runner crashed".into(),
            frames: vec![
                StackFrame {
                    method: Some("Runner.Execute".into()),
                    file: Some("Runner.cs".into()),
                    line: 77,
                    column: 9,
                },
                StackFrame {
                    method: Some("Program.Main".into()),
                    file: Some("Program.cs".into()),
                    line: 3,
                    column: 1,
                },
            ],
        };
        r.exception_thrown("a.dll", &exception);

        let diag = &r.sink().errors()[0];
        assert_eq!(diag.kind, DiagnosticKind::UnhandledException);
        assert_eq!(diag.origin.as_deref(), Some("Runner.cs"));
        assert_eq!((diag.line, diag.column), (77, 9));
        assert_eq!(diag.message, "runner crashed\\nWhile running: a.dll");
        assert_eq!(r.unhandled_exceptions(), 1);
    }

    #[test]
    fn unhandled_exception_without_frames_is_unanchored() {
        let mut r = reporter();
        r.exception_thrown(
            "a.dll",
            &EngineException {
                message: "lost".into(),
                ..Default::default()
            },
        );

        let diag = &r.sink().errors()[0];
        assert_eq!(diag.origin, None);
        assert_eq!((diag.line, diag.column), (0, 0));
    }

    #[test]
    fn frame_without_file_drops_its_position() {
        let mut r = reporter();
        r.exception_thrown(
            "a.dll",
            &EngineException {
                message: "m".into(),
                frames: vec![StackFrame {
                    method: Some("Engine.Run".into()),
                    file: None,
                    line: 40,
                    column: 12,
                }],
                ..Default::default()
            },
        );

        let diag = &r.sink().errors()[0];
        assert_eq!(diag.origin, None);
        assert_eq!((diag.line, diag.column), (0, 0));
        assert_eq!(diag.message, "m\\nWhile running: a.dll");
    }

    #[test]
    fn names_with_line_breaks_stay_on_one_console_line() {
        let mut r = StandardReporter::new(ConsoleSink::new(Vec::new(), Importance::Normal));
        r.test_passed(&TestCase::new("Pass\nes", "C", "M"), 0.1, None);
        r.test_failed(
            &TestCase::new("Theory(x: \"a\nb.cs(1): error : fake\")", "C", "M"),
            0.5,
            None,
            &Failure::new("Ex", "boom", "at M in a.cs:line 10"),
        );
        r.test_skipped(&TestCase::new("Skip\rped", "C", "M"), "later");
        r.class_failed("Fix\r\nture", &Failure::new("Ex", "no db", ""));

        let out = String::from_utf8(r.into_sink().into_inner()).unwrap();
        assert_eq!(
            out.lines().collect::<Vec<_>>(),
            [
                "    Pass\\nes",
                "a.cs(10): error : Theory(x: \"a\\nb.cs(1): error : fake\"): boom",
                "Skipping test: warning : Skip\\nped: later",
                "tally: error : [CLASS] Fix\\nture: no db",
            ]
        );
    }

    #[test]
    fn assembly_totals_accumulate_across_assemblies() {
        let mut r = reporter();
        r.assembly_finished("a.dll", AssemblyTotals::new(10, 2, 1, 3.456));
        r.assembly_finished("b.dll", AssemblyTotals::new(5, 0, 0, 1.0));

        let summary = r.summary();
        assert_eq!((summary.total, summary.failed, summary.skipped), (15, 2, 1));
        assert!((summary.elapsed_seconds - 4.456).abs() < 1e-9);
        assert_eq!(
            r.sink().lines(),
            vec![
                "  Tests: 10, Failures: 2, Skipped: 1, Time: 3.456 seconds",
                "  Tests: 5, Failures: 0, Skipped: 0, Time: 1.000 seconds",
            ]
        );
    }

    #[test]
    fn per_test_events_do_not_touch_the_summary() {
        let mut r = reporter();
        r.test_failed(&TestCase::new("T1", "C", "M"), 0.5, None, &Failure::default());
        r.test_skipped(&TestCase::new("T2", "C", "M"), "later");
        r.test_passed(&TestCase::new("T3", "C", "M"), 0.5, None);

        assert_eq!(r.summary(), TestRunSummary::new());
    }

    #[test]
    fn start_and_finish_only_answer_continue() {
        let mut r = reporter();
        let test = TestCase::new("T1", "C", "M");
        assert!(r.test_start(&test));
        assert!(r.test_finished(&test));
        assert!(r.sink().is_empty());
    }

    #[test]
    fn finish_prints_grand_total_only_for_multiple_assemblies() {
        let mut single = reporter();
        single.assembly_finished("a.dll", AssemblyTotals::new(1, 0, 0, 0.25));
        assert!(single.finish().is_success());
        assert!(single.sink().of_kind(DiagnosticKind::RunTotals).is_empty());

        let mut multi = reporter();
        multi.assembly_finished("a.dll", AssemblyTotals::new(10, 2, 1, 3.456));
        multi.assembly_finished("b.dll", AssemblyTotals::new(5, 0, 0, 1.0));
        let outcome = multi.finish();
        assert_eq!(outcome.summary.total, 15);
        assert!(!outcome.is_success());
        assert_eq!(
            multi.sink().of_kind(DiagnosticKind::RunTotals)[0].message,
            "TOTAL Tests: 15, Failures: 2, Skipped: 1, Time: 4.456 seconds"
        );
    }

    struct BrokenSink;

    impl DiagnosticSink for BrokenSink {
        fn emit(&mut self, _diagnostic: &Diagnostic) -> anyhow::Result<()> {
            bail!("disk full")
        }
    }

    #[test]
    fn sink_failures_never_escape_handlers() {
        let mut r = StandardReporter::new(BrokenSink);
        r.test_failed(&TestCase::new("T1", "C", "M"), 0.5, Some("out"), &Failure::default());
        r.assembly_finished("a.dll", AssemblyTotals::new(1, 1, 0, 0.5));
        assert!(r.class_failed("C", &Failure::default()));
        assert_eq!(r.summary().failed, 1);
    }
}
