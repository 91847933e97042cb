//! Map a GitHub repository branch into a nested JSON tree of file contents.
//!
//! # Architecture
//!
//! - `config.rs` - Raw request validation and derived run settings
//! - `pipeline.rs` - Download, decode, filter and assemble in one pass
//! - `progress.rs` - Bounded status channel from the pipeline
//! - `tracker.rs` - Terminal rendering of progress events
//! - `output.rs` - JSON report writing
//!
//! Decoding and tree assembly live in `repotree-archive`; the HTTP transport
//! lives in `repotree-fetch`.

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod tracker;

pub use config::{Config, ConfigError, OutputMode, Request};
pub use error::{Error, FailureKind, Result};
pub use pipeline::{Extraction, Phase, Pipeline, RunCounts};
pub use progress::{ProgressEvent, Reporter};
pub use repotree_archive::{FilterSpec, Node, Tree};
pub use repotree_fetch::{ClientSetting, ReqwestTransport, Transport};
