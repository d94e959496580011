use serde::{Deserialize, Serialize};

use crate::{
    app::App,
    listener::RunnerListener,
    models::{AssemblyTotals, EngineException, Failure, TestCase},
};

/// One protocol notification from the execution engine, as it travels on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RunnerEvent {
    AssemblyStart {
        assembly: String,
        #[serde(default)]
        config: Option<String>,
        #[serde(default)]
        framework_version: String,
    },
    TestStart {
        test: TestCase,
    },
    TestPassed {
        test: TestCase,
        #[serde(default)]
        duration_seconds: f64,
        #[serde(default)]
        output: Option<String>,
    },
    TestFailed {
        test: TestCase,
        #[serde(default)]
        duration_seconds: f64,
        #[serde(default)]
        output: Option<String>,
        failure: Failure,
    },
    TestSkipped {
        test: TestCase,
        #[serde(default)]
        reason: String,
    },
    TestFinished {
        test: TestCase,
    },
    ClassFailed {
        class_name: String,
        failure: Failure,
    },
    ExceptionThrown {
        assembly: String,
        exception: EngineException,
    },
    AssemblyFinished {
        assembly: String,
        total: usize,
        failed: usize,
        skipped: usize,
        elapsed_seconds: f64,
    },
}

/// Events streamed from an event source into the app.
#[derive(Debug)]
pub enum TestEvent {
    Runner(RunnerEvent),
    /// A line the engine printed that is not part of the protocol.
    Output { line: String },
    Error { message: String },
}

/// What the listener answered, for the notifications that return something.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    None,
    Continue(bool),
    Handled(bool),
}

/// Deliver one protocol event to a listener.
pub fn dispatch(listener: &mut impl RunnerListener, event: &RunnerEvent) -> Reply {
    match event {
        RunnerEvent::AssemblyStart {
            assembly,
            config,
            framework_version,
        } => {
            listener.assembly_start(assembly, config.as_deref(), framework_version);
            Reply::None
        }

        RunnerEvent::TestStart { test } => Reply::Continue(listener.test_start(test)),

        RunnerEvent::TestPassed {
            test,
            duration_seconds,
            output,
        } => {
            listener.test_passed(test, *duration_seconds, output.as_deref());
            Reply::None
        }

        RunnerEvent::TestFailed {
            test,
            duration_seconds,
            output,
            failure,
        } => {
            listener.test_failed(test, *duration_seconds, output.as_deref(), failure);
            Reply::None
        }

        RunnerEvent::TestSkipped { test, reason } => {
            listener.test_skipped(test, reason);
            Reply::None
        }

        RunnerEvent::TestFinished { test } => Reply::Continue(listener.test_finished(test)),

        RunnerEvent::ClassFailed {
            class_name,
            failure,
        } => Reply::Handled(listener.class_failed(class_name, failure)),

        RunnerEvent::ExceptionThrown {
            assembly,
            exception,
        } => {
            listener.exception_thrown(assembly, exception);
            Reply::None
        }

        RunnerEvent::AssemblyFinished {
            assembly,
            total,
            failed,
            skipped,
            elapsed_seconds,
        } => {
            listener.assembly_finished(
                assembly,
                AssemblyTotals::new(*total, *failed, *skipped, *elapsed_seconds),
            );
            Reply::None
        }
    }
}

/// Process a test event from a source.
pub fn handle_test_event<L: RunnerListener>(app: &mut App<L>, event: TestEvent) {
    match event {
        TestEvent::Runner(event) => {
            app.events += 1;
            if matches!(event, RunnerEvent::AssemblyFinished { .. }) {
                app.assemblies_finished += 1;
            }

            dispatch(&mut app.observers, &event);
            let reply = dispatch(&mut app.listener, &event);

            // the stdout protocol has no back-channel, so advisory answers are only logged
            if reply == Reply::Continue(false) {
                tracing::debug!(?event, "listener asked the engine to stop the class");
            }
        }

        TestEvent::Output { line } => {
            app.output_lines += 1;
            tracing::info!(target: "engine", "{}", line);
        }

        TestEvent::Error { message } => {
            tracing::error!("{}", message);
            app.errors.push(message);
        }
    }
}
