//! Fallback-aware job descriptor construction for push sends.
//!
//! Every push send is persistent, grouped by destination and gated on key
//! material. When the destination has no fallback channel the job must also
//! wait for the network and gets a bounded retry budget, since there is no
//! alternate path to hand it to once the network keeps failing.

pub mod descriptor;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::policy::{FallbackPolicy, FallbackVerdict};

pub use self::descriptor::{JobDescriptor, JobDescriptorBuilder, Precondition, RetryBudget};

/// Attempt budget for sends that can only go over push.
pub const PUSH_ONLY_RETRY_COUNT: u32 = 5;

/// Builds [`JobDescriptor`]s from the fallback policy's verdict.
#[derive(Clone)]
pub struct DescriptorBuilder {
    policy: FallbackPolicy,
}

impl DescriptorBuilder {
    /// Create a builder consulting the given policy.
    pub fn new(policy: FallbackPolicy) -> Self {
        Self { policy }
    }

    /// The policy this builder consults.
    pub fn policy(&self) -> &FallbackPolicy {
        &self.policy
    }

    /// Evaluate the destination and build its descriptor.
    pub async fn build(&self, destination: &str) -> JobDescriptor {
        let verdict = self.policy.evaluate(destination).await;
        Self::from_verdict(destination, &verdict)
    }

    /// Build a descriptor from an already computed verdict.
    pub fn from_verdict(destination: &str, verdict: &FallbackVerdict) -> JobDescriptor {
        let mut builder = JobDescriptor::builder()
            .with_persistence()
            .with_group_key(destination)
            .with_precondition(Precondition::KeyMaterial);

        if !verdict.supported {
            builder = builder
                .with_precondition(Precondition::Network)
                .with_retry_count(PUSH_ONLY_RETRY_COUNT);
        }

        let descriptor = builder.build();
        debug!(
            fallback = verdict.supported,
            preconditions = %descriptor.precondition_names().join(","),
            "job descriptor built"
        );
        descriptor
    }
}

// ---------------------------------------------------------------------------
// Job kinds
// ---------------------------------------------------------------------------

/// The kinds of push send job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendJobKind {
    /// Plain text to an individual.
    PushText,
    /// Media message to an individual.
    PushMedia,
    /// Message to a group.
    PushGroup,
}

impl SendJobKind {
    /// Whether jobs of this kind carry attachments to extract.
    pub fn carries_media(&self) -> bool {
        matches!(self, Self::PushMedia | Self::PushGroup)
    }
}

/// A send request awaiting its descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendJob {
    /// What is being sent.
    pub kind: SendJobKind,
    /// Local message id.
    pub message_id: i64,
    /// Raw destination as the message store holds it.
    pub destination: String,
}

impl SendJob {
    /// Build this job's descriptor; identical for every kind.
    pub async fn descriptor(&self, builder: &DescriptorBuilder) -> JobDescriptor {
        debug!(kind = ?self.kind, message_id = self.message_id, "building send job");
        builder.build(&self.destination).await
    }
}
