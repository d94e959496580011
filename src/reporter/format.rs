/// Header emitted before a test's captured output.
pub const CAPTURED_OUTPUT_HEADER: &str = "    Captured output:";

const CAPTURED_OUTPUT_INDENT: &str = "      ";

/// Fold every line break (`\r\n`, `\r` or `\n`) into a literal `\n` so the
/// text fits on one diagnostic line. Idempotent.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                chars.next_if_eq(&'\n');
                out.push_str("\\n");
            }
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// Lines to log for a test's captured console output.
///
/// Nothing for absent or blank output; otherwise the header followed by each
/// line of the trimmed output, indented. Unlike diagnostics, the output
/// keeps its line structure.
pub fn captured_output_lines(output: Option<&str>) -> Vec<String> {
    let Some(output) = output.map(str::trim).filter(|o| !o.is_empty()) else {
        return Vec::new();
    };

    std::iter::once(CAPTURED_OUTPUT_HEADER.to_string())
        .chain(
            output
                .lines()
                .map(|line| format!("{CAPTURED_OUTPUT_INDENT}{line}")),
        )
        .collect()
}
