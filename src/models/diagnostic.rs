use serde::{Deserialize, Serialize};

use super::location::SourceLocation;

/// How prominent an informational message is; sinks filter on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Importance {
    Low,
    Normal,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "severity", content = "importance")]
pub enum Severity {
    Message(Importance),
    Warning,
    Error,
}

/// What produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    Progress,
    RunTotals,
    TestStarted,
    TestPassed,
    CapturedOutput,
    ClassFailure,
    TestFailure,
    UnhandledException,
    TestSkipped,
}

/// One entry handed to a [`DiagnosticSink`](crate::sink::DiagnosticSink).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    #[serde(flatten)]
    pub severity: Severity,
    pub kind: DiagnosticKind,
    /// File (or free-form origin tag) shown before the severity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl Diagnostic {
    pub fn message(kind: DiagnosticKind, importance: Importance, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Message(importance),
            kind,
            origin: None,
            line: 0,
            column: 0,
            message: message.into(),
        }
    }

    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::message(kind, Importance::High, message)
        }
    }

    pub fn error(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            ..Self::message(kind, Importance::High, message)
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        let origin = origin.into();
        self.origin = (!origin.is_empty()).then_some(origin);
        self
    }

    /// Attach a parsed location. An unknown location leaves the diagnostic unanchored.
    pub fn at(self, location: SourceLocation) -> Self {
        let line = location.line;
        Self {
            line,
            ..self.with_origin(location.file)
        }
    }

    pub fn with_column(mut self, column: u32) -> Self {
        self.column = column;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    /// Importance of informational messages; warnings and errors are always high.
    pub fn importance(&self) -> Importance {
        match self.severity {
            Severity::Message(importance) => importance,
            Severity::Warning | Severity::Error => Importance::High,
        }
    }
}
