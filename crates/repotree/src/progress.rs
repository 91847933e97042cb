//! One-way status channel from the pipeline to whoever renders it.
//!
//! The channel holds a single event, so a slow consumer throttles the
//! pipeline. It closes when the owning [`Reporter`] is dropped, which the
//! pipeline does once it reaches a terminal phase.

use tokio::sync::mpsc::{self, Receiver, Sender};
use tracing::debug;

use crate::error::{Error, FailureKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Human-readable status line. Not a machine contract.
    pub description: String,
    pub error: Option<FailureKind>,
}

impl ProgressEvent {
    pub fn status(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            error: None,
        }
    }

    pub fn failure(kind: FailureKind, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            error: Some(kind),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Producer half of the progress channel.
#[derive(Debug)]
pub struct Reporter {
    tx: Option<Sender<ProgressEvent>>,
}

/// Create a connected reporter and receiver.
pub fn channel() -> (Reporter, Receiver<ProgressEvent>) {
    let (tx, rx) = mpsc::channel(1);
    (Reporter { tx: Some(tx) }, rx)
}

impl Reporter {
    /// A reporter with no consumer; events are only logged.
    pub fn silent() -> Self {
        Self { tx: None }
    }

    pub fn update(&self, description: impl Into<String>) {
        self.send(ProgressEvent::status(description));
    }

    pub fn fail(&self, err: &Error) {
        self.send(ProgressEvent::failure(err.kind(), err.to_string()));
    }

    /// Blocks while the channel is full. Must not be called from inside an
    /// async task.
    fn send(&self, event: ProgressEvent) {
        debug!(error = ?event.error, "{}", event.description);

        let Some(tx) = &self.tx else {
            return;
        };
        if tx.blocking_send(event).is_err() {
            debug!("progress consumer is gone; dropping event");
        }
    }
}
