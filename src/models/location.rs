use serde::{Deserialize, Serialize};

/// A `(file, line)` pair an IDE or build log can navigate to.
///
/// An empty `file` with `line == 0` means the location could not be
/// determined; that is a normal outcome, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_known(&self) -> bool {
        !self.file.is_empty()
    }
}

const FILE_MARKER: &str = "in ";

/// Best-effort location of the failure site from an engine-formatted stack trace.
///
/// Only the first line is inspected, and it is expected to look like
/// `at <frame> in <file>:line <N>`:
///
/// - no `"in "` marker: unknown location
/// - no `:` after the marker: the whole suffix is the file, line `0`
/// - otherwise the file is everything before the last `:`, and the line is
///   the token after the last space of the line
/// - a line token that is not a number: unknown location
///
/// Never panics, whatever the input looks like.
pub fn parse_stack_trace_location(stack_trace: &str) -> SourceLocation {
    let first_line = stack_trace
        .split('\n')
        .next()
        .unwrap_or_default()
        .trim_end_matches('\r');

    let Some(marker) = first_line.find(FILE_MARKER) else {
        return SourceLocation::unknown();
    };
    let suffix = &first_line[marker + FILE_MARKER.len()..];

    match suffix.rfind(':') {
        Some(colon) if colon > 0 => {
            let line_token = first_line.rsplit(' ').next().unwrap_or_default();
            match line_token.trim().parse::<u32>() {
                Ok(line) => SourceLocation::new(&suffix[..colon], line),
                Err(_) => SourceLocation::unknown(),
            }
        }
        _ => SourceLocation::new(suffix, 0),
    }
}
