//! Extraction pipeline: download, decode, filter, assemble, finalize.
//!
//! One [`Pipeline`] value covers one run. It owns the transport, the tree
//! under construction and the progress reporter; running it consumes it, so
//! the reporter (and with it the progress channel) is closed exactly once.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use repotree_archive::{EntryKind, TarGzArchive, Tree};
use repotree_fetch::{BoxRead, Transport};
use tracing::{debug, trace, warn};

use crate::config::{Config, OutputMode};
use crate::error::Result;
use crate::output;
use crate::progress::Reporter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Downloading,
    Decoding,
    Finalizing,
    Done,
    Failed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::Failed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "Idle"),
            Phase::Downloading => write!(f, "Downloading"),
            Phase::Decoding => write!(f, "Decoding"),
            Phase::Finalizing => write!(f, "Finalizing"),
            Phase::Done => write!(f, "Done"),
            Phase::Failed => write!(f, "Failed"),
        }
    }
}

/// Counters for a single pass over the archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounts {
    /// Directory entries anywhere in the archive.
    pub directories: usize,
    /// Regular files anywhere in the archive.
    pub files: usize,
    /// Files that passed the scope and filter and were mapped.
    pub kept: usize,
}

/// Result of a successful run.
#[derive(Debug)]
pub struct Extraction {
    pub tree: Tree,
    pub counts: RunCounts,
    /// Report location in file mode; `None` in stdout mode.
    pub report: Option<PathBuf>,
}

pub struct Pipeline<T> {
    config: Config,
    transport: T,
    reporter: Reporter,
    stagger: Duration,
    phase: Phase,
    counts: RunCounts,
    tree: Tree,
}

impl<T: Transport> Pipeline<T> {
    pub fn new(config: Config, transport: T) -> Self {
        Self {
            config,
            transport,
            reporter: Reporter::silent(),
            stagger: Duration::ZERO,
            phase: Phase::Idle,
            counts: RunCounts::default(),
            tree: Tree::new(),
        }
    }

    pub fn reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Pause after each mapped file so a live display can keep up.
    pub fn stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Run to completion on the current thread.
    ///
    /// Must not be called from inside an async task when a channel reporter
    /// is attached, since progress writes block.
    pub fn run(mut self) -> Result<Extraction> {
        match self.execute() {
            Ok(report) => {
                self.enter(Phase::Done);
                Ok(Extraction {
                    tree: self.tree,
                    counts: self.counts,
                    report,
                })
            }
            Err(err) => {
                self.enter(Phase::Failed);
                warn!(kind = %err.kind(), "extraction failed: {err}");
                self.reporter.fail(&err);
                Err(err)
            }
        }
    }

    /// Run on a dedicated worker thread.
    pub fn spawn(self) -> io::Result<JoinHandle<Result<Extraction>>>
    where
        T: 'static,
        Self: Send,
    {
        thread::Builder::new()
            .name("repotree-extract".to_string())
            .spawn(move || self.run())
    }

    fn enter(&mut self, phase: Phase) {
        debug!(from = %self.phase, to = %phase, "phase transition");
        self.phase = phase;
    }

    fn execute(&mut self) -> Result<Option<PathBuf>> {
        let reader = self.download()?;
        self.decode(reader)?;
        self.finalize()
    }

    fn download(&mut self) -> Result<BoxRead> {
        self.enter(Phase::Downloading);
        self.reporter
            .update(format!("downloading: {}", self.config.url));

        Ok(self.transport.open(&self.config.url)?)
    }

    fn decode(&mut self, reader: BoxRead) -> Result<()> {
        self.enter(Phase::Decoding);

        let mut archive = TarGzArchive::new(reader);
        let mut entries = archive.entries()?;

        while let Some(header) = entries.next_header()? {
            match header.kind {
                EntryKind::Directory => {
                    self.counts.directories += 1;
                    continue;
                }
                EntryKind::Other => {
                    trace!(path = %header.path, "skipping non-regular entry");
                    continue;
                }
                EntryKind::File => self.counts.files += 1,
            }

            let Some(relative) = scoped(&header.path, &self.config.scope) else {
                continue;
            };
            if !self.config.filter.keeps(relative) {
                trace!(path = relative, "filtered out");
                continue;
            }

            let content = entries.read_content()?;
            self.tree.insert_path(relative, content)?;
            self.counts.kept += 1;

            self.reporter.update(format!("mapped: {relative}"));
            if !self.stagger.is_zero() {
                thread::sleep(self.stagger);
            }
        }

        Ok(())
    }

    fn finalize(&mut self) -> Result<Option<PathBuf>> {
        self.enter(Phase::Finalizing);

        let RunCounts {
            directories,
            files,
            kept,
        } = self.counts;
        self.reporter
            .update(format!("found: {directories} directories and {files} files"));
        self.reporter
            .update(format!("prepared: {kept} out of {files} files for report"));

        match &self.config.output {
            OutputMode::Stdout => Ok(None),
            OutputMode::File(dir) => {
                let path = output::save_report(dir, &self.config.repo, &self.tree)?;
                self.reporter
                    .update(format!("generated report: {}", path.display()));
                Ok(Some(path))
            }
        }
    }
}

/// Path relative to `scope`, or `None` when the entry lies outside it.
///
/// An empty scope keeps every path unchanged.
pub(crate) fn scoped<'p>(path: &'p str, scope: &str) -> Option<&'p str> {
    let scope = scope.trim_end_matches('/');
    let relative = if scope.is_empty() {
        path
    } else {
        path.strip_prefix(scope)?.strip_prefix('/')?
    };
    (!relative.is_empty()).then_some(relative)
}
