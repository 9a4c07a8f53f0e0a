//! Streaming types for dataset fetching
//!
//! Provides an AsyncRead over either a live HTTP body or a dataset that was
//! assembled in memory.

use std::io::Cursor;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::TryStreamExt;
use tokio::io::{AsyncRead, ReadBuf};

/// A unified stream over fetched data
pub enum DownloadStream {
    /// HTTP body streamed through reqwest
    Http(Box<dyn AsyncRead + Send + Unpin>),
    /// CSV assembled locally (built-in tables, converted API responses)
    Memory(Cursor<Vec<u8>>),
}

impl AsyncRead for DownloadStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        match &mut *self {
            DownloadStream::Http(stream) => Pin::new(stream).poll_read(cx, buf),
            DownloadStream::Memory(cursor) => Pin::new(cursor).poll_read(cx, buf),
        }
    }
}

/// Progress callback: `(bytes_written, total_bytes)`
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// What to do when the output CSV already exists
#[derive(Debug, Clone, Default, PartialEq)]
pub enum OverwriteBehavior {
    /// Ask on the terminal; any answer but yes keeps the file
    #[default]
    Prompt,
    /// Replace the file
    Force,
    /// Refuse with an error
    NeverOverwrite,
}

/// Options for fetch operations
#[derive(Clone)]
pub struct FetchOptions {
    pub progress: Option<ProgressCallback>,
    /// Read buffer for raw HTTP downloads
    pub buffer_size: usize,
    pub overwrite: OverwriteBehavior,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            progress: None,
            buffer_size: 64 * 1024,
            overwrite: OverwriteBehavior::default(),
        }
    }
}

impl std::fmt::Debug for FetchOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchOptions")
            .field("progress", &self.progress.is_some())
            .field("buffer_size", &self.buffer_size)
            .field("overwrite", &self.overwrite)
            .finish()
    }
}

/// Creates a DownloadStream from an HTTP response
pub fn create_http_stream(response: reqwest::Response) -> DownloadStream {
    let stream = Box::new(tokio_util::io::StreamReader::new(
        response.bytes_stream().map_err(std::io::Error::other),
    ));
    DownloadStream::Http(stream)
}

/// Creates a DownloadStream over bytes already in memory
pub fn create_memory_stream(data: Vec<u8>) -> DownloadStream {
    DownloadStream::Memory(Cursor::new(data))
}
