use std::panic::{self, AssertUnwindSafe};

use crate::models::{AssemblyTotals, EngineException, Failure, TestCase};

use super::RunnerListener;

/// Delivers every notification to each child listener, in registration order.
///
/// A child that panics is logged and skipped for that one event; the
/// remaining children still receive it.
#[derive(Default)]
pub struct FanOut {
    listeners: Vec<Box<dyn RunnerListener>>,
}

impl FanOut {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, listener: impl RunnerListener + 'static) -> Self {
        self.push(listener);
        self
    }

    pub fn push(&mut self, listener: impl RunnerListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    fn each<T>(
        &mut self,
        event: &'static str,
        mut deliver: impl FnMut(&mut dyn RunnerListener) -> T,
    ) -> Vec<T> {
        let mut answers = Vec::with_capacity(self.listeners.len());
        for (index, listener) in self.listeners.iter_mut().enumerate() {
            match panic::catch_unwind(AssertUnwindSafe(|| deliver(listener.as_mut()))) {
                Ok(answer) => answers.push(answer),
                Err(_) => {
                    tracing::error!(listener = index, event, "listener panicked, continuing delivery");
                }
            }
        }
        answers
    }
}

impl RunnerListener for FanOut {
    fn assembly_start(&mut self, assembly: &str, config: Option<&str>, framework_version: &str) {
        self.each("assembly-start", |l| {
            l.assembly_start(assembly, config, framework_version)
        });
    }

    /// Continue only if every child wants to.
    fn test_start(&mut self, test: &TestCase) -> bool {
        self.each("test-start", |l| l.test_start(test))
            .into_iter()
            .all(|keep_going| keep_going)
    }

    fn test_passed(&mut self, test: &TestCase, duration_seconds: f64, output: Option<&str>) {
        self.each("test-passed", |l| l.test_passed(test, duration_seconds, output));
    }

    fn test_failed(
        &mut self,
        test: &TestCase,
        duration_seconds: f64,
        output: Option<&str>,
        failure: &Failure,
    ) {
        self.each("test-failed", |l| {
            l.test_failed(test, duration_seconds, output, failure)
        });
    }

    fn test_skipped(&mut self, test: &TestCase, reason: &str) {
        self.each("test-skipped", |l| l.test_skipped(test, reason));
    }

    fn test_finished(&mut self, test: &TestCase) -> bool {
        self.each("test-finished", |l| l.test_finished(test))
            .into_iter()
            .all(|keep_going| keep_going)
    }

    /// Handled if any child handled it.
    fn class_failed(&mut self, class_name: &str, failure: &Failure) -> bool {
        self.each("class-failed", |l| l.class_failed(class_name, failure))
            .into_iter()
            .any(|handled| handled)
    }

    fn exception_thrown(&mut self, assembly: &str, exception: &EngineException) {
        self.each("exception-thrown", |l| l.exception_thrown(assembly, exception));
    }

    fn assembly_finished(&mut self, assembly: &str, totals: AssemblyTotals) {
        self.each("assembly-finished", |l| l.assembly_finished(assembly, totals));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Clone, Default)]
    struct Recorder {
        seen: Rc<RefCell<Vec<String>>>,
        continue_tests: bool,
        handles_class: bool,
    }

    impl RunnerListener for Recorder {
        fn test_start(&mut self, test: &TestCase) -> bool {
            self.seen.borrow_mut().push(format!("start {}", test.name));
            self.continue_tests
        }

        fn test_skipped(&mut self, test: &TestCase, reason: &str) {
            self.seen.borrow_mut().push(format!("skip {}: {reason}", test.name));
        }

        fn class_failed(&mut self, class_name: &str, _failure: &Failure) -> bool {
            self.seen.borrow_mut().push(format!("class {class_name}"));
            self.handles_class
        }
    }

    struct Panicky;

    impl RunnerListener for Panicky {
        fn test_skipped(&mut self, _test: &TestCase, _reason: &str) {
            panic!("formatting blew up");
        }
    }

    #[test]
    fn delivers_to_every_child_in_order() {
        let first = Recorder {
            continue_tests: true,
            ..Default::default()
        };
        let second = Recorder {
            continue_tests: true,
            ..Default::default()
        };
        let mut fan = FanOut::new().with(first.clone()).with(second.clone());
        assert_eq!(fan.len(), 2);

        assert!(fan.test_start(&TestCase::new("T1", "C", "M")));
        assert_eq!(*first.seen.borrow(), vec!["start T1"]);
        assert_eq!(*second.seen.borrow(), vec!["start T1"]);
    }

    #[test]
    fn test_start_continues_only_if_all_children_agree() {
        let yes = Recorder {
            continue_tests: true,
            ..Default::default()
        };
        let no = Recorder::default();
        let mut fan = FanOut::new().with(no.clone()).with(yes.clone());

        assert!(!fan.test_start(&TestCase::new("T1", "C", "M")));
        // the refusing child must not short-circuit delivery
        assert_eq!(yes.seen.borrow().len(), 1);
    }

    #[test]
    fn class_failure_is_handled_if_any_child_handles_it() {
        let handler = Recorder {
            handles_class: true,
            ..Default::default()
        };
        let mut fan = FanOut::new().with(Recorder::default()).with(handler);
        assert!(fan.class_failed("Fixture", &Failure::default()));
        assert!(!FanOut::new().class_failed("Fixture", &Failure::default()));
    }

    #[test]
    fn panicking_child_does_not_stop_delivery() {
        let after = Recorder::default();
        let mut fan = FanOut::new().with(Panicky).with(after.clone());

        fan.test_skipped(&TestCase::new("T2", "C", "M"), "not ready");

        assert_eq!(*after.seen.borrow(), vec!["skip T2: not ready"]);
    }
}
