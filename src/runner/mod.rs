pub mod command;
pub mod ndjson;
pub mod stream;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::app::TestEvent;

pub use command::CommandSource;
pub use stream::{Input, ReaderSource};

/// Something that produces the engine's ordered event stream.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Stream every event over the channel, returning once the input is exhausted.
    async fn stream(&self, tx: mpsc::UnboundedSender<TestEvent>) -> Result<()>;

    /// Display name for this source (e.g., "stdin").
    fn name(&self) -> &str;
}

/// Pick the event source: an explicit input file wins, then an engine
/// command from the command line, then one from config, then stdin.
pub fn detect(
    workdir: PathBuf,
    input: Option<&Path>,
    command: Vec<String>,
    configured_command: Option<&str>,
) -> Result<Arc<dyn EventSource>> {
    if let Some(path) = input {
        return Ok(Arc::new(ReaderSource::new(Input::from_arg(path))));
    }
    if !command.is_empty() {
        return Ok(Arc::new(CommandSource::new(command, workdir)?));
    }
    if let Some(line) = configured_command {
        return Ok(Arc::new(CommandSource::parse(line, workdir)?));
    }
    Ok(Arc::new(ReaderSource::new(Input::Stdin)))
}
