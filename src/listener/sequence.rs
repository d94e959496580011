use crate::models::{AssemblyTotals, Failure, TestCase, TestStatus};

use super::RunnerListener;

/// Violation messages kept in memory; later ones are only counted and logged.
pub const MAX_RECORDED_VIOLATIONS: usize = 100;

/// Watches the event stream for protocol-order violations.
///
/// It never reorders or blocks anything; a violation is logged and recorded
/// so the caller can decide what to do with a misbehaving engine.
#[derive(Debug, Default)]
pub struct SequenceCheck {
    assembly: Option<String>,
    current: Option<(String, TestStatus)>,
    violations: Vec<String>,
    violation_count: usize,
}

impl SequenceCheck {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first [`MAX_RECORDED_VIOLATIONS`] violation messages.
    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    /// Every violation seen, including those past the recording cap.
    pub fn violation_count(&self) -> usize {
        self.violation_count
    }

    pub fn is_clean(&self) -> bool {
        self.violation_count == 0
    }

    fn violation(&mut self, message: String) {
        tracing::warn!(violation = %message, "out-of-order runner event");
        self.violation_count = self.violation_count.saturating_add(1);
        if self.violations.len() < MAX_RECORDED_VIOLATIONS {
            self.violations.push(message);
        }
    }

    fn require_assembly(&mut self, event: &str) {
        if self.assembly.is_none() {
            self.violation(format!("{event} outside of an assembly"));
        }
    }

    fn record_outcome(&mut self, test: &TestCase, outcome: TestStatus) {
        self.require_assembly(outcome.label());
        let problem = match self.current.as_mut() {
            Some((name, status)) if *name == test.name => {
                if status.is_terminal() {
                    Some(format!(
                        "test '{}' reported {} after already being {}",
                        test.name,
                        outcome.label(),
                        status.label()
                    ))
                } else {
                    *status = outcome;
                    None
                }
            }
            Some((name, _)) => Some(format!(
                "test '{}' reported {} while '{}' is running",
                test.name,
                outcome.label(),
                name
            )),
            None => Some(format!(
                "test '{}' reported {} without being started",
                test.name,
                outcome.label()
            )),
        };
        if let Some(message) = problem {
            self.violation(message);
        }
    }
}

impl RunnerListener for SequenceCheck {
    fn assembly_start(&mut self, assembly: &str, _config: Option<&str>, _framework_version: &str) {
        if let Some(open) = self.assembly.take() {
            self.violation(format!(
                "assembly '{assembly}' started before '{open}' finished"
            ));
        }
        self.current = None;
        self.assembly = Some(assembly.to_string());
    }

    fn test_start(&mut self, test: &TestCase) -> bool {
        self.require_assembly("test start");
        if let Some((open, _)) = self.current.take() {
            self.violation(format!(
                "test '{}' started before '{}' finished",
                test.name, open
            ));
        }
        self.current = Some((test.name.clone(), TestStatus::Running));
        true
    }

    fn test_passed(&mut self, test: &TestCase, _duration_seconds: f64, _output: Option<&str>) {
        self.record_outcome(test, TestStatus::Passed);
    }

    fn test_failed(
        &mut self,
        test: &TestCase,
        _duration_seconds: f64,
        _output: Option<&str>,
        _failure: &Failure,
    ) {
        self.record_outcome(test, TestStatus::Failed);
    }

    fn test_skipped(&mut self, test: &TestCase, _reason: &str) {
        // engines may report a skip without a preceding start
        if self.current.is_none() {
            self.current = Some((test.name.clone(), TestStatus::Running));
        }
        self.record_outcome(test, TestStatus::Skipped);
    }

    fn test_finished(&mut self, test: &TestCase) -> bool {
        match self.current.take() {
            Some((name, status)) if name == test.name && status.is_terminal() => {}
            Some((name, status)) if name == test.name => {
                self.violation(format!(
                    "test '{}' finished while still {}",
                    name,
                    status.label()
                ));
            }
            Some((name, _)) => {
                self.violation(format!(
                    "test '{}' finished while '{}' is running",
                    test.name, name
                ));
            }
            None => {
                self.violation(format!("test '{}' finished without being started", test.name));
            }
        }
        true
    }

    fn class_failed(&mut self, _class_name: &str, _failure: &Failure) -> bool {
        self.require_assembly("class failure");
        false
    }

    fn assembly_finished(&mut self, assembly: &str, _totals: AssemblyTotals) {
        match self.assembly.take() {
            Some(open) if open == assembly => {}
            Some(open) => self.violation(format!(
                "assembly '{assembly}' finished while '{open}' is open"
            )),
            None => self.violation(format!("assembly '{assembly}' finished without starting")),
        }
        if let Some((name, _)) = self.current.take() {
            self.violation(format!("assembly '{assembly}' finished with test '{name}' open"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test(name: &str) -> TestCase {
        TestCase::new(name, "Suite", name)
    }

    #[test]
    fn well_ordered_stream_is_clean() {
        let mut check = SequenceCheck::new();
        check.assembly_start("a.dll", None, "1.9");
        check.test_start(&test("T1"));
        check.test_passed(&test("T1"), 0.1, None);
        check.test_finished(&test("T1"));
        check.test_skipped(&test("T2"), "later");
        check.test_finished(&test("T2"));
        check.class_failed("Fixture", &Failure::default());
        check.assembly_finished("a.dll", AssemblyTotals::new(2, 0, 1, 0.1));

        assert!(check.is_clean(), "{:?}", check.violations());
    }

    #[test]
    fn duplicate_outcome_is_flagged() {
        let mut check = SequenceCheck::new();
        check.assembly_start("a.dll", None, "1.9");
        check.test_start(&test("T1"));
        check.test_passed(&test("T1"), 0.1, None);
        check.test_failed(&test("T1"), 0.1, None, &Failure::default());

        assert_eq!(check.violations().len(), 1);
        assert!(check.violations()[0].contains("after already being passed"));
    }

    #[test]
    fn events_before_assembly_start_are_flagged() {
        let mut check = SequenceCheck::new();
        check.test_start(&test("T1"));
        assert_eq!(check.violations(), ["test start outside of an assembly"]);
    }

    #[test]
    fn finishing_assembly_with_open_test_is_flagged() {
        let mut check = SequenceCheck::new();
        check.assembly_start("a.dll", None, "1.9");
        check.test_start(&test("T1"));
        check.assembly_finished("a.dll", AssemblyTotals::default());

        assert_eq!(
            check.violations(),
            ["assembly 'a.dll' finished with test 'T1' open"]
        );
    }

    #[test]
    fn long_misbehaving_stream_keeps_only_the_first_messages() {
        let mut check = SequenceCheck::new();
        for i in 0..MAX_RECORDED_VIOLATIONS + 50 {
            check.test_finished(&test(&format!("T{i}")));
        }

        assert_eq!(check.violation_count(), MAX_RECORDED_VIOLATIONS + 50);
        assert_eq!(check.violations().len(), MAX_RECORDED_VIOLATIONS);
        assert_eq!(check.violations()[0], "test 'T0' finished without being started");
        assert!(!check.is_clean());
    }

    #[test]
    fn finish_without_outcome_is_flagged() {
        let mut check = SequenceCheck::new();
        check.assembly_start("a.dll", None, "1.9");
        check.test_start(&test("T1"));
        check.test_finished(&test("T1"));

        assert_eq!(check.violations(), ["test 'T1' finished while still running"]);
    }
}
