//! Destination canonicalization and push address resolution.
//!
//! A raw destination string is turned into a [`CanonicalAddress`] by a
//! [`Canonicalizer`], then looked up in the [`Directory`] to discover the
//! relay hint and whether the fallback channel is available.

pub mod canonical;
pub mod directory;

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

pub use self::canonical::{CanonicalAddress, Canonicalizer, E164Canonicalizer};
pub use self::directory::{Directory, DirectoryEntry, InMemoryDirectory};

/// Device selector used for every push address produced by this crate.
pub const DEFAULT_DEVICE_ID: u32 = 1;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from address canonicalization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// The destination could not be canonicalized.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

// ---------------------------------------------------------------------------
// Domain types
// ---------------------------------------------------------------------------

/// A message recipient as known to the thread store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    /// Local recipient row id.
    pub id: i64,
    /// Number or group id exactly as the user entered it.
    pub number: String,
}

/// A destination resolved for push delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAddress {
    /// Local recipient row id.
    pub recipient_id: i64,
    /// Canonical number (or encoded group id).
    pub number: String,
    /// Target device selector, always [`DEFAULT_DEVICE_ID`].
    pub device_id: u32,
    /// Federated relay that serves this number, if any.
    pub relay: Option<String>,
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Resolves recipients into [`ResolvedAddress`] values.
#[derive(Clone)]
pub struct AddressResolver {
    canonicalizer: Arc<dyn Canonicalizer>,
    directory: Arc<dyn Directory>,
}

impl AddressResolver {
    /// Create a resolver over the given collaborators.
    pub fn new(canonicalizer: Arc<dyn Canonicalizer>, directory: Arc<dyn Directory>) -> Self {
        Self {
            canonicalizer,
            directory,
        }
    }

    /// Resolve a recipient into a push address.
    ///
    /// No caching is done here; the directory performs its own.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::InvalidAddress`] when the recipient's number
    /// cannot be canonicalized.
    pub async fn resolve(&self, recipient: &Recipient) -> Result<ResolvedAddress, AddressError> {
        let canonical = self.canonicalizer.canonicalize(&recipient.number)?;
        let relay = self.directory.relay_for(canonical.as_str()).await;
        debug!(
            recipient_id = recipient.id,
            number = %canonical,
            relay = ?relay,
            "resolved push address"
        );
        Ok(ResolvedAddress {
            recipient_id: recipient.id,
            number: canonical.into_string(),
            device_id: DEFAULT_DEVICE_ID,
            relay,
        })
    }
}
