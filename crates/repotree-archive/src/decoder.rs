use std::cell::{Cell, RefCell};
use std::io::{self, Read};
use std::rc::Rc;

use flate2::read::GzDecoder;
use tracing::trace;

use crate::data::entry::{EntryHeader, EntryKind};
use crate::error::{Error, Result};

/// Gzip layer that remembers whether decompression itself failed, so tar
/// errors can be told apart from a broken gzip envelope.
struct GzipLayer<R> {
    inner: GzDecoder<R>,
    failed: Rc<Cell<bool>>,
}

impl<R: Read> Read for GzipLayer<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf).inspect_err(|_| self.failed.set(true))
    }
}

/// Handle on the gzip layer shared between the tar reader and the stream,
/// which drains what tar leaves behind.
struct SharedLayer<R>(Rc<RefCell<GzipLayer<R>>>);

impl<R> Clone for SharedLayer<R> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<R: Read> Read for SharedLayer<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.borrow_mut().read(buf)
    }
}

fn classify(failed: &Cell<bool>, source: io::Error) -> Error {
    if failed.get() {
        Error::Decode { source }
    } else {
        Error::ArchiveFormat { source }
    }
}

/// A gzip-compressed tar stream, decoded lazily.
pub struct TarGzArchive<R: Read> {
    archive: tar::Archive<SharedLayer<R>>,
    layer: SharedLayer<R>,
    failed: Rc<Cell<bool>>,
}

impl<R: Read> TarGzArchive<R> {
    pub fn new(reader: R) -> Self {
        let failed = Rc::new(Cell::new(false));
        let layer = SharedLayer(Rc::new(RefCell::new(GzipLayer {
            inner: GzDecoder::new(reader),
            failed: Rc::clone(&failed),
        })));
        Self {
            archive: tar::Archive::new(layer.clone()),
            layer,
            failed,
        }
    }

    pub fn entries(&mut self) -> Result<EntryStream<'_, R>> {
        let entries = self
            .archive
            .entries()
            .map_err(|e| classify(&self.failed, e))?;
        Ok(EntryStream {
            entries,
            current: None,
            layer: self.layer.clone(),
            exhausted: false,
            failed: Rc::clone(&self.failed),
        })
    }
}

/// Cursor over the entries of a [`TarGzArchive`].
///
/// Only the entry returned by the last [`next_header`](Self::next_header)
/// call can be read. Advancing discards whatever was left unread.
pub struct EntryStream<'a, R: Read> {
    entries: tar::Entries<'a, SharedLayer<R>>,
    current: Option<tar::Entry<'a, SharedLayer<R>>>,
    layer: SharedLayer<R>,
    exhausted: bool,
    failed: Rc<Cell<bool>>,
}

impl<'a, R: Read> EntryStream<'a, R> {
    /// Advance to the next entry. `Ok(None)` means the archive is exhausted
    /// and the gzip trailer checked out.
    pub fn next_header(&mut self) -> Result<Option<EntryHeader>> {
        self.current = None;
        if self.exhausted {
            return Ok(None);
        }

        let entry = match self.entries.next() {
            None => {
                self.finish()?;
                return Ok(None);
            }
            Some(entry) => entry.map_err(|e| classify(&self.failed, e))?,
        };

        let header = EntryHeader {
            path: String::from_utf8_lossy(&entry.path_bytes()).into_owned(),
            kind: EntryKind::from(entry.header().entry_type()),
            size: entry.size(),
        };
        trace!(path = %header.path, kind = ?header.kind, size = header.size, "entry");
        self.current = Some(entry);

        Ok(Some(header))
    }

    /// Tar stops at the end-of-archive marker; read the rest of the gzip
    /// member so its checksum and length trailer are verified.
    fn finish(&mut self) -> Result<()> {
        let drained = io::copy(&mut self.layer, &mut io::sink())
            .map_err(|e| classify(&self.failed, e))?;
        trace!(drained, "gzip member verified");
        self.exhausted = true;
        Ok(())
    }

    /// Read the current entry to completion as text.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn read_content(&mut self) -> Result<String> {
        let entry = self.current.as_mut().ok_or(Error::NoCurrentEntry)?;
        let expected = entry.size();

        let mut buf = Vec::new();
        entry
            .read_to_end(&mut buf)
            .map_err(|e| classify(&self.failed, e))?;

        if (buf.len() as u64) < expected {
            return Err(classify(
                &self.failed,
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("entry truncated: read {} of {expected} bytes", buf.len()),
                ),
            ));
        }

        Ok(match String::from_utf8(buf) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })
    }
}
