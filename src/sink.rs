use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use crate::util::lock_unpoisoned;

/// Shared writer handle used when callers supply their own sink stream.
pub type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Configured destination for a response body.
#[derive(Clone)]
pub enum SinkTarget {
    /// Write the body to a file at this path; the file opens lazily on the
    /// first delivered chunk.
    Path(PathBuf),
    /// Forward every chunk to a caller-supplied writer.
    Writer(SharedWriter),
}

impl SinkTarget {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn writer<W>(writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self::Writer(Arc::new(Mutex::new(Box::new(writer))))
    }
}

impl fmt::Debug for SinkTarget {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => formatter.debug_tuple("Path").field(path).finish(),
            Self::Writer(_) => formatter.write_str("Writer"),
        }
    }
}

/// Resolved response-body destination.
///
/// Cloning yields another handle onto the same destination, so the engine's
/// write callback and the returned `Response` observe one buffer.
#[derive(Clone)]
pub struct ResponseSink {
    inner: SinkInner,
}

#[derive(Clone)]
enum SinkInner {
    Memory(Arc<Mutex<Vec<u8>>>),
    File {
        path: PathBuf,
        file: Arc<Mutex<Option<File>>>,
    },
    Writer(SharedWriter),
}

impl ResponseSink {
    pub(crate) fn memory() -> Self {
        Self {
            inner: SinkInner::Memory(Arc::new(Mutex::new(Vec::new()))),
        }
    }

    pub(crate) fn file(path: PathBuf) -> Self {
        Self {
            inner: SinkInner::File {
                path,
                file: Arc::new(Mutex::new(None)),
            },
        }
    }

    pub(crate) fn writer(writer: SharedWriter) -> Self {
        Self {
            inner: SinkInner::Writer(writer),
        }
    }

    /// Accepts one engine-delivered chunk, returning the number of bytes
    /// consumed; a short count tells the engine to abort the transfer.
    pub fn write_chunk(&self, chunk: &[u8]) -> usize {
        match &self.inner {
            SinkInner::Memory(buffer) => {
                lock_unpoisoned(buffer).extend_from_slice(chunk);
                chunk.len()
            }
            SinkInner::File { path, file } => {
                let mut guard = lock_unpoisoned(file);
                if guard.is_none() {
                    match File::create(path) {
                        Ok(created) => *guard = Some(created),
                        Err(_) => return 0,
                    }
                }
                match guard.as_mut() {
                    Some(open) => {
                        if open.write_all(chunk).is_ok() {
                            chunk.len()
                        } else {
                            0
                        }
                    }
                    None => 0,
                }
            }
            SinkInner::Writer(writer) => {
                if lock_unpoisoned(writer).write_all(chunk).is_ok() {
                    chunk.len()
                } else {
                    0
                }
            }
        }
    }

    /// Bytes captured so far; `None` for caller-supplied writers, whose
    /// contents this crate cannot read back.
    pub fn captured(&self) -> Option<Bytes> {
        match &self.inner {
            SinkInner::Memory(buffer) => Some(Bytes::from(lock_unpoisoned(buffer).clone())),
            SinkInner::File { path, .. } => fs::read(path).ok().map(Bytes::from),
            SinkInner::Writer(_) => None,
        }
    }

    /// Target path for file sinks.
    pub fn path(&self) -> Option<&Path> {
        match &self.inner {
            SinkInner::File { path, .. } => Some(path.as_path()),
            _ => None,
        }
    }
}

impl fmt::Debug for ResponseSink {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            SinkInner::Memory(buffer) => formatter
                .debug_struct("ResponseSink")
                .field("memory_len", &lock_unpoisoned(buffer).len())
                .finish(),
            SinkInner::File { path, .. } => formatter
                .debug_struct("ResponseSink")
                .field("path", path)
                .finish(),
            SinkInner::Writer(_) => formatter.write_str("ResponseSink(writer)"),
        }
    }
}
