use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::BufReader;
use tokio::sync::mpsc;

use crate::app::TestEvent;

use super::EventSource;
use super::ndjson::pump_lines;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl Input {
    /// `-` means stdin, anything else is a path.
    pub fn from_arg(arg: &Path) -> Self {
        if arg == Path::new("-") {
            Input::Stdin
        } else {
            Input::File(arg.to_path_buf())
        }
    }
}

/// Replays an already-recorded event stream from a file or stdin.
pub struct ReaderSource {
    input: Input,
    name: String,
}

impl ReaderSource {
    pub fn new(input: Input) -> Self {
        let name = match &input {
            Input::Stdin => "stdin".to_string(),
            Input::File(path) => path.to_string_lossy().to_string(),
        };
        Self { input, name }
    }
}

#[async_trait]
impl EventSource for ReaderSource {
    async fn stream(&self, tx: mpsc::UnboundedSender<TestEvent>) -> Result<()> {
        let forwarded = match &self.input {
            Input::Stdin => pump_lines(BufReader::new(tokio::io::stdin()), &tx).await?,
            Input::File(path) => {
                let file = tokio::fs::File::open(path)
                    .await
                    .with_context(|| format!("failed to open event stream {}", path.display()))?;
                pump_lines(BufReader::new(file), &tx).await?
            }
        };
        tracing::debug!(source = %self.name, forwarded, "event stream exhausted");
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
