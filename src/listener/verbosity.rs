use crate::models::{
    AssemblyTotals, Diagnostic, DiagnosticKind, EngineException, Failure, Importance, TestCase,
};
use crate::reporter::escape;

use super::RunnerListener;

/// Listeners that can print a free-form line on behalf of a decorator.
pub trait Narrate {
    fn narrate(&mut self, diagnostic: Diagnostic);
}

/// Drops `test_passed` so passing tests (and their captured output) stay silent.
pub struct Quiet<L> {
    inner: L,
}

impl<L> Quiet<L> {
    pub fn new(inner: L) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> L {
        self.inner
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut L {
        &mut self.inner
    }
}

/// Announces every test as it starts, then forwards everything.
pub struct Verbose<L> {
    inner: L,
}

impl<L> Verbose<L> {
    pub fn new(inner: L) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> L {
        self.inner
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut L {
        &mut self.inner
    }
}

impl<L: Narrate> Narrate for Quiet<L> {
    fn narrate(&mut self, diagnostic: Diagnostic) {
        self.inner.narrate(diagnostic);
    }
}

impl<L: Narrate> Narrate for Verbose<L> {
    fn narrate(&mut self, diagnostic: Diagnostic) {
        self.inner.narrate(diagnostic);
    }
}

impl<L: RunnerListener> RunnerListener for Quiet<L> {
    fn assembly_start(&mut self, assembly: &str, config: Option<&str>, framework_version: &str) {
        self.inner.assembly_start(assembly, config, framework_version);
    }

    fn test_start(&mut self, test: &TestCase) -> bool {
        self.inner.test_start(test)
    }

    fn test_passed(&mut self, _test: &TestCase, _duration_seconds: f64, _output: Option<&str>) {}

    fn test_failed(
        &mut self,
        test: &TestCase,
        duration_seconds: f64,
        output: Option<&str>,
        failure: &Failure,
    ) {
        self.inner.test_failed(test, duration_seconds, output, failure);
    }

    fn test_skipped(&mut self, test: &TestCase, reason: &str) {
        self.inner.test_skipped(test, reason);
    }

    fn test_finished(&mut self, test: &TestCase) -> bool {
        self.inner.test_finished(test)
    }

    fn class_failed(&mut self, class_name: &str, failure: &Failure) -> bool {
        self.inner.class_failed(class_name, failure)
    }

    fn exception_thrown(&mut self, assembly: &str, exception: &EngineException) {
        self.inner.exception_thrown(assembly, exception);
    }

    fn assembly_finished(&mut self, assembly: &str, totals: AssemblyTotals) {
        self.inner.assembly_finished(assembly, totals);
    }
}

impl<L: RunnerListener + Narrate> RunnerListener for Verbose<L> {
    fn assembly_start(&mut self, assembly: &str, config: Option<&str>, framework_version: &str) {
        self.inner.assembly_start(assembly, config, framework_version);
    }

    fn test_start(&mut self, test: &TestCase) -> bool {
        self.inner.narrate(Diagnostic::message(
            DiagnosticKind::TestStarted,
            Importance::Normal,
            format!("    Running {}", escape(&test.name)),
        ));
        self.inner.test_start(test)
    }

    fn test_passed(&mut self, test: &TestCase, duration_seconds: f64, output: Option<&str>) {
        self.inner.test_passed(test, duration_seconds, output);
    }

    fn test_failed(
        &mut self,
        test: &TestCase,
        duration_seconds: f64,
        output: Option<&str>,
        failure: &Failure,
    ) {
        self.inner.test_failed(test, duration_seconds, output, failure);
    }

    fn test_skipped(&mut self, test: &TestCase, reason: &str) {
        self.inner.test_skipped(test, reason);
    }

    fn test_finished(&mut self, test: &TestCase) -> bool {
        self.inner.test_finished(test)
    }

    fn class_failed(&mut self, class_name: &str, failure: &Failure) -> bool {
        self.inner.class_failed(class_name, failure)
    }

    fn exception_thrown(&mut self, assembly: &str, exception: &EngineException) {
        self.inner.exception_thrown(assembly, exception);
    }

    fn assembly_finished(&mut self, assembly: &str, totals: AssemblyTotals) {
        self.inner.assembly_finished(assembly, totals);
    }
}
