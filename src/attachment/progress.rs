//! `AsyncRead` adapter that reports cumulative bytes read.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

use crate::content::ContentStream;
use crate::events::ProgressListener;

/// Reports `(bytes_read, total)` to a listener after every non-empty read.
pub struct ProgressReader {
    inner: ContentStream,
    total: u64,
    read: u64,
    listener: ProgressListener,
}

impl ProgressReader {
    /// Wrap `inner`, reporting against a declared `total`.
    pub fn new(inner: ContentStream, total: u64, listener: ProgressListener) -> Self {
        Self {
            inner,
            total,
            read: 0,
            listener,
        }
    }

    /// Bytes read so far.
    pub fn bytes_read(&self) -> u64 {
        self.read
    }
}

impl AsyncRead for ProgressReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        let poll = Pin::new(&mut this.inner).poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = poll {
            let n = buf.filled().len().saturating_sub(before);
            if n > 0 {
                let n = u64::try_from(n).unwrap_or(u64::MAX);
                this.read = this.read.saturating_add(n);
                (this.listener)(this.read, this.total);
            }
        }
        poll
    }
}
