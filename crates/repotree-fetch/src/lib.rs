//! HTTP transport handing response bodies out as blocking byte streams.
//!
//! # Architecture
//!
//! - [`Transport`] - the seam the extraction pipeline reads through
//! - [`ReqwestTransport`] - production implementation over `reqwest`
//! - [`ClientSetting`] - client construction (proxies, user agent)
//!
//! Async I/O runs on a small shared runtime owned by this crate; callers
//! stay synchronous and pull the body one chunk at a time.

mod client;
mod error;
mod http;
mod runtime;

pub use client::ClientSetting;
pub use error::{FetchError, Result};
pub use http::{BoxRead, ReqwestTransport, ResponseReader, Transport};
