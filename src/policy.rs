//! Fallback policy: whether a destination may be reached over the non-push
//! (carrier) channel.
//!
//! The policy is a pure decision over collaborator state. It never fails:
//! a destination that cannot be canonicalized is simply treated as having
//! no fallback.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::address::{CanonicalAddress, Canonicalizer, Directory};

/// User preference source for the fallback channel.
pub trait Preferences: Send + Sync {
    /// Whether the user permits fallback sends.
    fn fallback_allowed(&self) -> bool;

    /// Whether each fallback send needs explicit user approval.
    fn fallback_approval_required(&self) -> bool;
}

/// Snapshot of a single fallback evaluation.
///
/// Computing this once per send attempt and deriving both the job
/// descriptor and the approval prompt from it keeps the two consistent even
/// if the directory changes mid-flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackVerdict {
    /// Canonical form of the destination, if canonicalization succeeded.
    pub canonical: Option<CanonicalAddress>,
    /// Whether the fallback channel may be used.
    pub supported: bool,
    /// Whether using it needs explicit user approval.
    pub approval_required: bool,
}

impl FallbackVerdict {
    fn unsupported(canonical: Option<CanonicalAddress>) -> Self {
        Self {
            canonical,
            supported: false,
            approval_required: false,
        }
    }
}

/// Decides fallback availability from canonicalizer, directory and preferences.
#[derive(Clone)]
pub struct FallbackPolicy {
    canonicalizer: Arc<dyn Canonicalizer>,
    directory: Arc<dyn Directory>,
    preferences: Arc<dyn Preferences>,
}

impl FallbackPolicy {
    /// Create a policy over the given collaborators.
    pub fn new(
        canonicalizer: Arc<dyn Canonicalizer>,
        directory: Arc<dyn Directory>,
        preferences: Arc<dyn Preferences>,
    ) -> Self {
        Self {
            canonicalizer,
            directory,
            preferences,
        }
    }

    /// Evaluate the destination once and return the full verdict.
    pub async fn evaluate(&self, destination: &str) -> FallbackVerdict {
        let canonical = match self.canonicalizer.canonicalize(destination) {
            Ok(canonical) => canonical,
            Err(e) => {
                warn!(error = %e, "destination not canonicalizable, no fallback");
                return FallbackVerdict::unsupported(None);
            }
        };

        if canonical.is_group() {
            return FallbackVerdict::unsupported(Some(canonical));
        }

        if !self.preferences.fallback_allowed() {
            return FallbackVerdict::unsupported(Some(canonical));
        }

        let supported = self.directory.supports_fallback(canonical.as_str()).await;
        let approval_required = supported && self.preferences.fallback_approval_required();
        debug!(
            number = %canonical,
            supported,
            approval_required,
            "fallback evaluated"
        );

        FallbackVerdict {
            canonical: Some(canonical),
            supported,
            approval_required,
        }
    }

    /// Whether the fallback channel is available and permitted.
    pub async fn is_fallback_supported(&self, destination: &str) -> bool {
        self.evaluate(destination).await.supported
    }

    /// Whether fallback is available and the user must approve it first.
    pub async fn is_fallback_approval_required(&self, destination: &str) -> bool {
        self.evaluate(destination).await.approval_required
    }
}
