use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crate::listener::{FanOut, RunnerListener};
use crate::runner::EventSource;

pub mod events;

pub use events::{Reply, RunnerEvent, TestEvent, dispatch, handle_test_event};

/// Consumer-side state of one run: the primary listener, any side
/// observers, and bookkeeping about what came through the stream.
pub struct App<L: RunnerListener> {
    /// Its replies are the ones that count.
    pub listener: L,
    /// Extra listeners that see every event before the primary one.
    pub observers: FanOut,
    pub events: usize,
    pub assemblies_finished: usize,
    pub output_lines: usize,
    pub errors: Vec<String>,
}

impl<L: RunnerListener> App<L> {
    pub fn new(listener: L, observers: FanOut) -> Self {
        Self {
            listener,
            observers,
            events: 0,
            assemblies_finished: 0,
            output_lines: 0,
            errors: Vec::new(),
        }
    }

    /// The engine reported an error before finishing any assembly.
    pub fn source_failed(&self) -> bool {
        !self.errors.is_empty() && self.assemblies_finished == 0
    }
}

/// Run `source` to completion, delivering its events to `app` in order.
///
/// The source reads on its own task; every listener call happens here, on
/// the caller's task, one event at a time.
pub async fn drive<L: RunnerListener>(app: &mut App<L>, source: Arc<dyn EventSource>) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    tracing::debug!(source = source.name(), "reading events");

    let handle = tokio::spawn(async move { source.stream(tx).await });

    while let Some(event) = rx.recv().await {
        handle_test_event(app, event);
    }

    handle.await.context("event source task failed")?
}
