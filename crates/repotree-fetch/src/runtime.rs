use std::io;

use once_cell::sync::Lazy;
use tokio::runtime::Runtime;

use crate::error::{FetchError, Result};

static POOL: Lazy<io::Result<Runtime>> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("repotree-io")
        .enable_all()
        .build()
});

/// Shared runtime driving HTTP I/O. Blocking on it from inside another
/// runtime's worker thread panics; call from plain or blocking threads.
pub(crate) fn pool() -> Result<&'static Runtime> {
    POOL.as_ref()
        .map_err(|e| FetchError::Runtime(e.to_string()))
}
