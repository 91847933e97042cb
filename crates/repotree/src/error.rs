use std::fmt;
use std::io;
use std::path::PathBuf;

use repotree_archive::Error as ArchiveError;
use repotree_fetch::FetchError;

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] FetchError),

    #[error(transparent)]
    Archive(ArchiveError),

    #[error("output file error: {}: {source}", path.display())]
    Output { path: PathBuf, source: io::Error },

    #[error("encoding file error: {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Coarse classification of a terminal failure, carried by progress events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Transport,
    Decode,
    ArchiveFormat,
    StructureConflict,
    Output,
    Config,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Transport => write!(f, "transport"),
            FailureKind::Decode => write!(f, "decode"),
            FailureKind::ArchiveFormat => write!(f, "archive format"),
            FailureKind::StructureConflict => write!(f, "structure conflict"),
            FailureKind::Output => write!(f, "output"),
            FailureKind::Config => write!(f, "config"),
        }
    }
}

impl Error {
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Transport(_) => FailureKind::Transport,
            Error::Archive(ArchiveError::Decode { .. }) => FailureKind::Decode,
            Error::Archive(ArchiveError::ArchiveFormat { .. } | ArchiveError::NoCurrentEntry) => {
                FailureKind::ArchiveFormat
            }
            Error::Archive(
                ArchiveError::StructureConflict { .. }
                | ArchiveError::DirectoryOccupied { .. }
                | ArchiveError::EmptyPath,
            ) => FailureKind::StructureConflict,
            Error::Output { .. } | Error::Encode { .. } => FailureKind::Output,
            Error::Config(_) => FailureKind::Config,
        }
    }

    /// Rebuild a stream error, promoting it to a transport failure when the
    /// decoder was only relaying an interrupted download.
    fn from_stream(source: io::Error, rewrap: fn(io::Error) -> ArchiveError) -> Self {
        let interrupted = source
            .get_ref()
            .is_some_and(|inner| inner.is::<FetchError>());
        if !interrupted {
            return Error::Archive(rewrap(source));
        }

        let kind = source.kind();
        match source.into_inner().map(|inner| inner.downcast::<FetchError>()) {
            Some(Ok(fetch)) => Error::Transport(*fetch),
            Some(Err(inner)) => Error::Archive(rewrap(io::Error::new(kind, inner))),
            None => Error::Archive(rewrap(io::Error::from(kind))),
        }
    }
}

impl From<ArchiveError> for Error {
    fn from(err: ArchiveError) -> Self {
        match err {
            ArchiveError::Decode { source } => {
                Self::from_stream(source, |source| ArchiveError::Decode { source })
            }
            ArchiveError::ArchiveFormat { source } => {
                Self::from_stream(source, |source| ArchiveError::ArchiveFormat { source })
            }
            other => Error::Archive(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
