//! Attachment extraction for outgoing media messages.
//!
//! Walks a message's parts in authoring order, keeps image, audio and video
//! parts, and opens each one through the [`ContentResolver`]. A part whose
//! content cannot be opened is logged and skipped so the rest of the message
//! still goes out.

pub mod progress;

use std::fmt;

use tracing::{debug, trace, warn};

use crate::content::{ContentReference, ContentResolver, ContentStream, KeyMaterial};
use crate::events::{ProgressBus, ProgressListener};

pub use self::progress::ProgressReader;

// ---------------------------------------------------------------------------
// Domain types
// ---------------------------------------------------------------------------

/// Media families that travel as attachments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaClass {
    /// `image/*`
    Image,
    /// `audio/*`
    Audio,
    /// `video/*`
    Video,
}

impl MediaClass {
    /// Classify a MIME content type. Parameters after `;` are ignored and
    /// the major type is matched case-insensitively.
    pub fn of(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        let (major, minor) = essence.split_once('/')?;
        if minor.is_empty() {
            return None;
        }
        match major.to_ascii_lowercase().as_str() {
            "image" => Some(Self::Image),
            "audio" => Some(Self::Audio),
            "video" => Some(Self::Video),
            _ => None,
        }
    }
}

/// One part of an outgoing message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePart {
    /// Declared MIME content type.
    pub content_type: String,
    /// Where the part's bytes live.
    pub reference: ContentReference,
    /// Declared size in bytes.
    pub size: u64,
}

/// An outgoing multimedia message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMediaMessage {
    /// Local message id; progress events are keyed by it.
    pub message_id: i64,
    /// Body parts in authoring order.
    pub parts: Vec<MessagePart>,
}

/// An attachment ready for upload.
///
/// The stream is live; whoever holds this value must drain or drop it.
pub struct AttachmentStream {
    /// MIME content type.
    pub content_type: String,
    /// Declared size in bytes.
    pub size: u64,
    /// Readable content.
    pub stream: ContentStream,
    /// Reports `(current, total)` upload progress for the owning message.
    pub progress: ProgressListener,
}

impl AttachmentStream {
    /// Report that `current` of [`Self::size`] bytes have been transferred.
    pub fn report(&self, current: u64) {
        (self.progress)(current, self.size);
    }

    /// Wrap the stream so reading it reports progress automatically.
    pub fn into_reader(self) -> ProgressReader {
        ProgressReader::new(self.stream, self.size, self.progress)
    }
}

impl fmt::Debug for AttachmentStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachmentStream")
            .field("content_type", &self.content_type)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

/// Turns message parts into [`AttachmentStream`]s.
#[derive(Clone)]
pub struct AttachmentExtractor {
    resolver: ContentResolver,
    events: ProgressBus,
}

impl AttachmentExtractor {
    /// Create an extractor resolving through `resolver` and publishing
    /// progress on `events`.
    pub fn new(resolver: ContentResolver, events: ProgressBus) -> Self {
        Self { resolver, events }
    }

    /// Open every media part of `message`, in order.
    ///
    /// All resolution happens during this call. Parts that are not media
    /// are skipped silently; media parts that fail to open are logged and
    /// skipped, so the result may be partial.
    pub async fn extract_attachments(
        &self,
        key: &KeyMaterial,
        message: &OutgoingMediaMessage,
    ) -> Vec<AttachmentStream> {
        let mut attachments = Vec::new();

        for (index, part) in message.parts.iter().enumerate() {
            let Some(class) = MediaClass::of(&part.content_type) else {
                trace!(index, content_type = %part.content_type, "not an attachment");
                continue;
            };

            debug!(
                message_id = message.message_id,
                index,
                class = ?class,
                reference = %part.reference,
                size = part.size,
                "adding attachment"
            );

            match self.resolver.resolve_stream(key, &part.reference).await {
                Ok(stream) => attachments.push(AttachmentStream {
                    content_type: part.content_type.clone(),
                    size: part.size,
                    stream,
                    progress: self.events.listener_for(message.message_id),
                }),
                Err(e) => warn!(
                    message_id = message.message_id,
                    index,
                    error = %e,
                    "couldn't open attachment, sending without it"
                ),
            }
        }

        attachments
    }
}
