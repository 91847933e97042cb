use std::io::{self, Read};

use bytes::{Buf, Bytes};
use reqwest::{Client, Response, Url};
use tokio::runtime::Runtime;
use tracing::debug;

use crate::client::ClientSetting;
use crate::error::{FetchError, Result};
use crate::runtime::pool;

/// A readable byte stream. Dropping it closes the underlying connection.
pub type BoxRead = Box<dyn Read + Send>;

/// Source of archive byte streams.
///
/// Implementations map every failure to establish the stream, including a
/// non-success status, to a [`FetchError`]. Failures after the stream is
/// handed out surface as `io::Error`s from `read`, wrapping a `FetchError`.
pub trait Transport: Send {
    fn open(&self, url: &str) -> Result<BoxRead>;
}

/// Production transport using `reqwest`.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        Self::with_setting(ClientSetting::default())
    }

    pub fn with_setting(setting: ClientSetting) -> Result<Self> {
        Ok(Self {
            client: setting.build()?,
        })
    }
}

impl Transport for ReqwestTransport {
    fn open(&self, url: &str) -> Result<BoxRead> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
        let runtime = pool()?;

        let response = runtime
            .block_on(self.client.get(parsed).send())
            .map_err(FetchError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        debug!(url, content_length = ?response.content_length(), "response stream established");
        Ok(Box::new(ResponseReader::new(response, runtime)))
    }
}

/// Blocking [`Read`] over an async response body, one chunk at a time.
pub struct ResponseReader {
    response: Response,
    runtime: &'static Runtime,
    chunk: Bytes,
    done: bool,
}

impl ResponseReader {
    fn new(response: Response, runtime: &'static Runtime) -> Self {
        Self {
            response,
            runtime,
            chunk: Bytes::new(),
            done: false,
        }
    }
}

impl Read for ResponseReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while self.chunk.is_empty() {
            if self.done {
                return Ok(0);
            }
            match self.runtime.block_on(self.response.chunk()) {
                Ok(Some(chunk)) => self.chunk = chunk,
                Ok(None) => self.done = true,
                Err(e) => return Err(io::Error::other(FetchError::Body(e))),
            }
        }

        let n = buf.len().min(self.chunk.len());
        buf[..n].copy_from_slice(&self.chunk[..n]);
        self.chunk.advance(n);
        Ok(n)
    }
}
