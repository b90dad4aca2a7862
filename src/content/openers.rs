//! Openers for external resources: local files and HTTP(S) URLs.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, ReadBuf};
use tokio_stream::{Stream, StreamExt};
use tracing::debug;

use super::{ContentError, ContentReference, ContentStream, ResourceOpener};

/// Timeout for fetching a remote resource.
const HTTP_TIMEOUT_SECS: u64 = 30;

/// Opens `file://` references from the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FileOpener;

#[async_trait]
impl ResourceOpener for FileOpener {
    async fn open(&self, reference: &ContentReference) -> Result<ContentStream, ContentError> {
        let path = reference
            .as_url()
            .to_file_path()
            .map_err(|()| ContentError::MalformedReference(reference.to_string()))?;
        match tokio::fs::File::open(&path).await {
            Ok(file) => {
                debug!(path = %path.display(), "opened external file");
                Ok(Box::new(file))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ContentError::NotFound(reference.to_string()))
            }
            Err(e) => Err(ContentError::Io(e)),
        }
    }
}

/// Streams `http://` and `https://` response bodies.
#[derive(Debug, Clone)]
pub struct HttpOpener {
    client: reqwest::Client,
}

impl HttpOpener {
    /// Create an opener with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Request`] if the client cannot be built.
    pub fn new() -> Result<Self, ContentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ResourceOpener for HttpOpener {
    async fn open(&self, reference: &ContentReference) -> Result<ContentStream, ContentError> {
        let response = self.client.get(reference.as_url().clone()).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ContentError::NotFound(reference.to_string()));
        }
        if !status.is_success() {
            return Err(ContentError::HttpStatus {
                reference: reference.to_string(),
                status: status.as_u16(),
            });
        }
        debug!(
            length = ?response.content_length(),
            "streaming external resource"
        );
        let chunks = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(io::Error::other));
        Ok(Box::new(BodyReader::new(chunks)))
    }
}

/// `AsyncRead` over a stream of body chunks; holds at most one chunk.
struct BodyReader {
    chunks: Pin<Box<dyn Stream<Item = io::Result<Vec<u8>>> + Send>>,
    pending: Vec<u8>,
    offset: usize,
}

impl BodyReader {
    fn new(chunks: impl Stream<Item = io::Result<Vec<u8>>> + Send + 'static) -> Self {
        Self {
            chunks: Box::pin(chunks),
            pending: Vec::new(),
            offset: 0,
        }
    }
}

impl AsyncRead for BodyReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        loop {
            let rest = this.pending.get(this.offset..).unwrap_or_default();
            if !rest.is_empty() {
                let n = rest.len().min(buf.remaining());
                buf.put_slice(rest.get(..n).unwrap_or_default());
                this.offset = this.offset.saturating_add(n);
                return Poll::Ready(Ok(()));
            }
            match this.chunks.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    this.pending = chunk;
                    this.offset = 0;
                }
                Poll::Ready(Some(Err(e))) => return Poll::Ready(Err(e)),
                Poll::Ready(None) => return Poll::Ready(Ok(())),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Dispatches by URL scheme to the file or HTTP opener.
#[derive(Debug, Clone)]
pub struct SchemeOpener {
    file: FileOpener,
    http: Option<HttpOpener>,
}

impl SchemeOpener {
    /// Open local files only.
    pub fn files_only() -> Self {
        Self {
            file: FileOpener,
            http: None,
        }
    }

    /// Open local files and HTTP(S) URLs.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Request`] if the HTTP client cannot be built.
    pub fn with_http() -> Result<Self, ContentError> {
        Ok(Self {
            file: FileOpener,
            http: Some(HttpOpener::new()?),
        })
    }
}

#[async_trait]
impl ResourceOpener for SchemeOpener {
    async fn open(&self, reference: &ContentReference) -> Result<ContentStream, ContentError> {
        match (reference.as_url().scheme(), self.http.as_ref()) {
            ("file", _) => self.file.open(reference).await,
            ("http" | "https", Some(http)) => http.open(reference).await,
            (scheme, _) => Err(ContentError::UnsupportedScheme(scheme.to_owned())),
        }
    }
}
