use serde::{Deserialize, Serialize};

/// Identity of a single test as reported by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Display name (usually `Type.Method`, possibly with arguments).
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub method: String,
}

impl TestCase {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            method: method.into(),
        }
    }
}

/// Exception details attached to a failed test or class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub exception_type: String,
    pub message: String,
    /// Raw, engine-formatted stack trace. Only the first line is inspected.
    #[serde(default)]
    pub stack_trace: String,
}

impl Failure {
    pub fn new(
        exception_type: impl Into<String>,
        message: impl Into<String>,
        stack_trace: impl Into<String>,
    ) -> Self {
        Self {
            exception_type: exception_type.into(),
            message: message.into(),
            stack_trace: stack_trace.into(),
        }
    }
}

/// One captured frame of an unhandled exception.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

/// An exception raised outside any test or class, with its frames already resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineException {
    #[serde(default)]
    pub exception_type: String,
    pub message: String,
    /// Innermost frame first.
    #[serde(default)]
    pub frames: Vec<StackFrame>,
}

impl EngineException {
    /// The frame the exception originated from, if the engine captured any.
    pub fn origin(&self) -> Option<&StackFrame> {
        self.frames.first()
    }
}
