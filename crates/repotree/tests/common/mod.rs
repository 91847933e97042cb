#![allow(dead_code)]

use std::io::{self, Cursor, Read};

use flate2::Compression;
use flate2::write::GzEncoder;
use repotree::progress::{self, ProgressEvent};
use repotree::{Config, FilterSpec, OutputMode, Reporter};
use repotree_fetch::{BoxRead, FetchError, Result as FetchResult, Transport};
use tokio::sync::mpsc::Receiver;

pub enum Fixture<'a> {
    Dir(&'a str),
    File(&'a str, &'a str),
    Symlink(&'a str, &'a str),
}

pub fn tarball(fixtures: &[Fixture<'_>]) -> Vec<u8> {
    tarball_with(fixtures, Compression::default())
}

pub fn tarball_with(fixtures: &[Fixture<'_>], level: Compression) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), level));
    for fixture in fixtures {
        let mut header = tar::Header::new_gnu();
        match fixture {
            Fixture::Dir(path) => {
                header.set_entry_type(tar::EntryType::Directory);
                header.set_mode(0o755);
                header.set_size(0);
                builder.append_data(&mut header, path, io::empty()).unwrap();
            }
            Fixture::File(path, content) => {
                header.set_mode(0o644);
                header.set_size(content.len() as u64);
                builder
                    .append_data(&mut header, path, content.as_bytes())
                    .unwrap();
            }
            Fixture::Symlink(path, target) => {
                header.set_entry_type(tar::EntryType::Symlink);
                header.set_mode(0o777);
                header.set_size(0);
                builder.append_link(&mut header, path, target).unwrap();
            }
        }
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// Serves a fixed body, or refuses with a status code.
pub enum Stub {
    Body(Vec<u8>),
    Status(u16),
    /// Serves the bytes, then fails as if the connection dropped.
    Interrupted(Vec<u8>),
}

impl Transport for Stub {
    fn open(&self, _url: &str) -> FetchResult<BoxRead> {
        match self {
            Stub::Body(bytes) => Ok(Box::new(Cursor::new(bytes.clone()))),
            Stub::Status(code) => Err(FetchError::Status(*code)),
            Stub::Interrupted(bytes) => Ok(Box::new(Interrupted {
                head: Cursor::new(bytes.clone()),
            })),
        }
    }
}

struct Interrupted {
    head: Cursor<Vec<u8>>,
}

impl Read for Interrupted {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.head.read(buf)? {
            0 => Err(io::Error::other(FetchError::Runtime(
                "connection reset by peer".into(),
            ))),
            n => Ok(n),
        }
    }
}

pub fn config(scope: &str, filter: FilterSpec) -> Config {
    Config {
        repo: "repo".into(),
        url: "https://github.com/user/repo/archive/refs/heads/main.tar.gz".into(),
        scope: scope.into(),
        output: OutputMode::Stdout,
        filter,
    }
}

pub fn channel() -> (Reporter, Receiver<ProgressEvent>) {
    progress::channel()
}

/// Drain every event until the producer closes the channel.
pub fn collect(mut rx: Receiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.blocking_recv() {
        events.push(event);
    }
    events
}

pub fn mapped(events: &[ProgressEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| e.description.strip_prefix("mapped: "))
        .collect()
}

pub fn errors(events: &[ProgressEvent]) -> Vec<&ProgressEvent> {
    events.iter().filter(|e| e.is_error()).collect()
}
