use anyhow::{Context, Result};
use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;

use crate::app::{RunnerEvent, TestEvent};

/// Decode one line of engine output.
///
/// Protocol objects become runner events, anything that is not JSON is
/// passed through as raw output, and JSON of an unknown shape is dropped
/// with a warning. Blank lines yield nothing.
pub fn decode_line(line: &str) -> Option<TestEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let Ok(value) = serde_json::from_str::<serde_json::Value>(line) else {
        return Some(TestEvent::Output {
            line: line.to_string(),
        });
    };
    if !value.is_object() {
        return Some(TestEvent::Output {
            line: line.to_string(),
        });
    }

    match serde_json::from_value::<RunnerEvent>(value) {
        Ok(event) => Some(TestEvent::Runner(event)),
        Err(e) => {
            tracing::warn!(error = %e, line, "skipping unrecognized engine event");
            None
        }
    }
}

/// Read NDJSON lines until EOF, forwarding decoded events. Returns the
/// number of protocol events seen.
pub async fn pump_lines<R>(reader: R, tx: &mpsc::UnboundedSender<TestEvent>) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut forwarded = 0;

    while let Some(line) = lines
        .next_line()
        .await
        .context("failed to read engine output")?
    {
        tracing::debug!(target: "engine::stdout", "{}", line);

        if let Some(event) = decode_line(&line) {
            if matches!(event, TestEvent::Runner(_)) {
                forwarded += 1;
            }
            let _ = tx.send(event);
        }
    }

    Ok(forwarded)
}
