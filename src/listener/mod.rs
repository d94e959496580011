pub mod fanout;
pub mod sequence;
pub mod verbosity;

pub use fanout::FanOut;
pub use sequence::SequenceCheck;
pub use verbosity::{Quiet, Verbose};

use crate::models::{AssemblyTotals, EngineException, Failure, TestCase};

/// Capability set of a test-run listener.
///
/// Per assembly the engine calls, in order:
///
/// 1. [`assembly_start`](RunnerListener::assembly_start), once
/// 2. for every test: `test_start`, exactly one of `test_passed` /
///    `test_failed` / `test_skipped`, then `test_finished`
/// 3. any number of `class_failed` (fixture setup/teardown failures)
/// 4. any number of `exception_thrown` (faults outside test or class scope)
/// 5. [`assembly_finished`](RunnerListener::assembly_finished), once
///
/// Every method has a base implementation, so a listener only overrides the
/// notifications it cares about. One instance sees one event stream, and
/// handlers never fail back into the engine.
pub trait RunnerListener {
    fn assembly_start(&mut self, _assembly: &str, _config: Option<&str>, _framework_version: &str) {}

    /// Returns `false` to ask the engine to skip the rest of the class. Advisory.
    fn test_start(&mut self, _test: &TestCase) -> bool {
        true
    }

    fn test_passed(&mut self, _test: &TestCase, _duration_seconds: f64, _output: Option<&str>) {}

    fn test_failed(
        &mut self,
        _test: &TestCase,
        _duration_seconds: f64,
        _output: Option<&str>,
        _failure: &Failure,
    ) {
    }

    fn test_skipped(&mut self, _test: &TestCase, _reason: &str) {}

    /// Returns `false` to ask the engine to stop running the class. Advisory.
    fn test_finished(&mut self, _test: &TestCase) -> bool {
        true
    }

    /// Returns `true` when the failure was reported and the engine should not
    /// report it through any other channel.
    fn class_failed(&mut self, _class_name: &str, _failure: &Failure) -> bool {
        false
    }

    fn exception_thrown(&mut self, _assembly: &str, _exception: &EngineException) {}

    fn assembly_finished(&mut self, _assembly: &str, _totals: AssemblyTotals) {}
}

impl<L: RunnerListener + ?Sized> RunnerListener for Box<L> {
    fn assembly_start(&mut self, assembly: &str, config: Option<&str>, framework_version: &str) {
        (**self).assembly_start(assembly, config, framework_version)
    }

    fn test_start(&mut self, test: &TestCase) -> bool {
        (**self).test_start(test)
    }

    fn test_passed(&mut self, test: &TestCase, duration_seconds: f64, output: Option<&str>) {
        (**self).test_passed(test, duration_seconds, output)
    }

    fn test_failed(
        &mut self,
        test: &TestCase,
        duration_seconds: f64,
        output: Option<&str>,
        failure: &Failure,
    ) {
        (**self).test_failed(test, duration_seconds, output, failure)
    }

    fn test_skipped(&mut self, test: &TestCase, reason: &str) {
        (**self).test_skipped(test, reason)
    }

    fn test_finished(&mut self, test: &TestCase) -> bool {
        (**self).test_finished(test)
    }

    fn class_failed(&mut self, class_name: &str, failure: &Failure) -> bool {
        (**self).class_failed(class_name, failure)
    }

    fn exception_thrown(&mut self, assembly: &str, exception: &EngineException) {
        (**self).exception_thrown(assembly, exception)
    }

    fn assembly_finished(&mut self, assembly: &str, totals: AssemblyTotals) {
        (**self).assembly_finished(assembly, totals)
    }
}

impl<L: RunnerListener + ?Sized> RunnerListener for &mut L {
    fn assembly_start(&mut self, assembly: &str, config: Option<&str>, framework_version: &str) {
        (**self).assembly_start(assembly, config, framework_version)
    }

    fn test_start(&mut self, test: &TestCase) -> bool {
        (**self).test_start(test)
    }

    fn test_passed(&mut self, test: &TestCase, duration_seconds: f64, output: Option<&str>) {
        (**self).test_passed(test, duration_seconds, output)
    }

    fn test_failed(
        &mut self,
        test: &TestCase,
        duration_seconds: f64,
        output: Option<&str>,
        failure: &Failure,
    ) {
        (**self).test_failed(test, duration_seconds, output, failure)
    }

    fn test_skipped(&mut self, test: &TestCase, reason: &str) {
        (**self).test_skipped(test, reason)
    }

    fn test_finished(&mut self, test: &TestCase) -> bool {
        (**self).test_finished(test)
    }

    fn class_failed(&mut self, class_name: &str, failure: &Failure) -> bool {
        (**self).class_failed(class_name, failure)
    }

    fn exception_thrown(&mut self, assembly: &str, exception: &EngineException) {
        (**self).exception_thrown(assembly, exception)
    }

    fn assembly_finished(&mut self, assembly: &str, totals: AssemblyTotals) {
        (**self).assembly_finished(assembly, totals)
    }
}
