use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to decompress archive: {source}")]
    Decode { source: io::Error },

    #[error("invalid archive framing: {source}")]
    ArchiveFormat { source: io::Error },

    #[error("unexpected structure found on: {path} ('{at}' is already a file)")]
    StructureConflict { path: String, at: String },

    #[error("cannot insert a file at '{path}': a directory already exists there")]
    DirectoryOccupied { path: String },

    #[error("entry path has no segments")]
    EmptyPath,

    #[error("no archive entry is currently positioned")]
    NoCurrentEntry,
}

impl Error {
    /// `true` for both flavors of path collision in the tree.
    pub fn is_structure_conflict(&self) -> bool {
        matches!(
            self,
            Error::StructureConflict { .. } | Error::DirectoryOccupied { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
