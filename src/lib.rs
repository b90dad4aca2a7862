//! Courier: the outbound media dispatch core of a secure messenger.
//!
//! Decides how a send job is queued (persistence, grouping, preconditions,
//! retry budget) depending on whether the destination can fall back to the
//! carrier channel, and turns a message's content references into attachment
//! streams that report upload progress.
//!
//! Storage, directory, preferences and notification are injected
//! collaborators; the crate ships small reference implementations of each.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod logging;

pub mod address;
pub mod content;
pub mod events;
pub mod policy;

pub mod attachment;
pub mod job;

pub mod notify;
pub mod store;
