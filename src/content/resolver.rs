//! Routes content references to encrypted storage or the external opener.

use std::sync::Arc;

use tracing::trace;

use super::locator::{self, LocatorKind};
use super::{
    ContentError, ContentReference, ContentStream, EncryptedStorage, KeyMaterial, ResourceOpener,
};

/// Resolves [`ContentReference`]s to readable streams.
#[derive(Clone)]
pub struct ContentResolver {
    storage: Arc<dyn EncryptedStorage>,
    opener: Arc<dyn ResourceOpener>,
}

impl ContentResolver {
    /// Create a resolver over encrypted storage and an external opener.
    pub fn new(storage: Arc<dyn EncryptedStorage>, opener: Arc<dyn ResourceOpener>) -> Self {
        Self { storage, opener }
    }

    /// Open the stream behind `reference`.
    ///
    /// Local references are decrypted with `key`; external ones are opened
    /// as-is and `key` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::NotFound`] when nothing backs the reference,
    /// [`ContentError::MalformedReference`] for a local reference whose id
    /// is unusable, or whatever the backing collaborator reports.
    pub async fn resolve_stream(
        &self,
        key: &KeyMaterial,
        reference: &ContentReference,
    ) -> Result<ContentStream, ContentError> {
        let kind = locator::classify(reference)?;
        trace!(reference = %reference, kind = ?kind, "resolving content");
        match kind {
            LocatorKind::Part(id) => self.storage.open_part(key, id).await,
            LocatorKind::Thumbnail(id) => self.storage.open_thumbnail(key, id).await,
            LocatorKind::External => self.opener.open(reference).await,
        }
    }
}
