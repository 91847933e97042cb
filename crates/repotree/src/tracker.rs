use std::cell::Cell;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;
use tokio::sync::mpsc::Receiver;

use crate::progress::ProgressEvent;

pub trait TrackerBuilder<T: Tracker<U>, U> {
    fn build(self) -> T;
}

pub trait Tracker<Inc> {
    fn step(&self, step: Inc) -> &Self;
    fn finish(self);
}

const SPINNER_STYLE: &str = "{spinner:.blue} {prefix:>8.cyan.bold} [{elapsed_precise}] {wide_msg}";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const COMPLETE: &str = "Mapping complete!";

const FAILED: &str = "Mapping failed";

static SPINNER_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    ProgressStyle::with_template(SPINNER_STYLE)
        .ok()
        .map(|style| style.tick_chars(TICK))
});

/// Terminal spinner that prints one line per finished step.
pub struct SpinnerTracker {
    pb: ProgressBar,
    failed: Cell<bool>,
}

impl Tracker<ProgressEvent> for SpinnerTracker {
    fn step(&self, event: ProgressEvent) -> &Self {
        let line = status_line(&event);
        if event.is_error() {
            self.failed.set(true);
        }
        self.pb.println(line);
        self.pb.set_message(event.description);
        self
    }

    fn finish(self) {
        let msg = if self.failed.get() { FAILED } else { COMPLETE };
        self.pb.finish_with_message(msg);
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpinnerTrackerBuilder {
    prefix: Option<String>,
    hidden: bool,
}

impl SpinnerTrackerBuilder {
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    /// Draw nothing; used when stderr is not a terminal.
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }
}

impl TrackerBuilder<SpinnerTracker, ProgressEvent> for SpinnerTrackerBuilder {
    fn build(self) -> SpinnerTracker {
        let pb = if self.hidden {
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner()
        };
        let pb = match SPINNER_TEMPLATE.as_ref() {
            Some(style) => pb.with_style(style.clone()),
            None => pb,
        };

        if let Some(prefix) = self.prefix {
            pb.set_prefix(prefix);
        }
        pb.enable_steady_tick(Duration::from_millis(100));

        SpinnerTracker {
            pb,
            failed: Cell::new(false),
        }
    }
}

pub fn status_line(event: &ProgressEvent) -> String {
    let mark = if event.is_error() { "✗" } else { "✓" };
    format!("{mark} {}", event.description)
}

/// Feed every event into `tracker` until the producer closes the channel.
///
/// Blocks the calling thread. Returns `false` if an error event was seen.
pub fn follow<T: Tracker<ProgressEvent>>(mut rx: Receiver<ProgressEvent>, tracker: T) -> bool {
    let mut ok = true;
    while let Some(event) = rx.blocking_recv() {
        ok &= !event.is_error();
        tracker.step(event);
    }
    tracker.finish();
    ok
}
