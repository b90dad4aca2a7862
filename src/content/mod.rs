//! Content references and their resolution to byte streams.
//!
//! A [`ContentReference`] is an opaque URL embedded in a message part. Local
//! references (`part` and `thumb` under the app authority) live in encrypted
//! storage and are decrypted with the caller's [`KeyMaterial`]; anything else
//! is an external resource opened as-is.

pub mod locator;
pub mod openers;
pub mod resolver;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncRead;
use url::Url;

pub use self::locator::{is_local, LocatorKind};
pub use self::resolver::ContentResolver;

/// A live, readable byte stream. The holder is responsible for draining or
/// dropping it.
pub type ContentStream = Box<dyn AsyncRead + Send + Unpin>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from content resolution.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// No backing resource exists for the reference.
    #[error("content not found: {0}")]
    NotFound(String),

    /// The reference is not a URL.
    #[error("malformed content reference: {0}")]
    MalformedReference(String),

    /// Only local `part` references can be exported.
    #[error("reference cannot be exported: {0}")]
    NotExportable(String),

    /// No opener handles this URL scheme.
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    /// Local read failure.
    #[error("content read failed: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport failure.
    #[error("content request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Remote server answered with a non-success status.
    #[error("content request for {reference} returned status {status}")]
    HttpStatus {
        /// The reference that was fetched.
        reference: String,
        /// HTTP status code.
        status: u16,
    },
}

// ---------------------------------------------------------------------------
// Domain types
// ---------------------------------------------------------------------------

/// Opaque locator for a piece of message content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentReference(Url);

impl ContentReference {
    /// Parse a reference from its string form.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::MalformedReference`] if `raw` is not a URL.
    pub fn parse(raw: &str) -> Result<Self, ContentError> {
        Url::parse(raw)
            .map(Self)
            .map_err(|e| ContentError::MalformedReference(format!("{raw}: {e}")))
    }

    /// Borrow the underlying URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// The reference as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Url> for ContentReference {
    fn from(url: Url) -> Self {
        Self(url)
    }
}

impl fmt::Display for ContentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Secret used by encrypted storage to decrypt parts.
#[derive(Clone)]
pub struct KeyMaterial {
    secret: Arc<[u8]>,
}

impl KeyMaterial {
    /// Wrap raw key bytes.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: Arc::from(secret.into()),
        }
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.secret
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyMaterial([REDACTED])")
    }
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Encrypted part storage. Only its read-stream contract lives here.
#[async_trait]
pub trait EncryptedStorage: Send + Sync {
    /// Open the full content of a stored part.
    async fn open_part(&self, key: &KeyMaterial, id: i64) -> Result<ContentStream, ContentError>;

    /// Open the thumbnail of a stored part.
    async fn open_thumbnail(
        &self,
        key: &KeyMaterial,
        id: i64,
    ) -> Result<ContentStream, ContentError>;
}

/// Opens external resources without decryption.
#[async_trait]
pub trait ResourceOpener: Send + Sync {
    /// Open the resource behind `reference`.
    async fn open(&self, reference: &ContentReference) -> Result<ContentStream, ContentError>;
}
