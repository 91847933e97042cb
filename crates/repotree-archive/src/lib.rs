//! Streaming tar.gz decoding, suffix filtering and path-tree assembly.
//!
//! # Architecture
//!
//! - `decoder.rs` - Entry-at-a-time gzip + tar decoding
//! - `filter.rs` - Include/exclude suffix filter
//! - `tree.rs` - Nested path tree built from extracted files
//! - `data/` - Shared types

pub use data::entry::{EntryHeader, EntryKind};
pub use decoder::{EntryStream, TarGzArchive};
pub use error::{Error, Result};
pub use filter::{FilterSpec, should_keep};
pub use tree::{Node, Tree};

pub mod data;
pub mod decoder;
pub mod error;
pub mod filter;
pub mod tree;
