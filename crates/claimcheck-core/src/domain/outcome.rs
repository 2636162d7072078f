//! Outcome model for the gate.
//!
//! 例外ではなく enum で「inline のまま」「offload した / 解決した」を区別する。
//! 失敗は `Result` の `Err(OffloadError)` 側で表し、`ErrorKind` で分類する。

use super::{Envelope, Message, ReferenceRecord};

/// Result of `on_send`.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Message left untouched.
    Inline(Message),

    /// Payload moved to the blob store; message now carries the reference.
    Offloaded {
        message: Message,
        reference: ReferenceRecord,
    },
}

impl SendOutcome {
    pub fn message(&self) -> &Message {
        match self {
            SendOutcome::Inline(message) => message,
            SendOutcome::Offloaded { message, .. } => message,
        }
    }

    pub fn into_message(self) -> Message {
        match self {
            SendOutcome::Inline(message) => message,
            SendOutcome::Offloaded { message, .. } => message,
        }
    }

    pub fn reference(&self) -> Option<&ReferenceRecord> {
        match self {
            SendOutcome::Inline(_) => None,
            SendOutcome::Offloaded { reference, .. } => Some(reference),
        }
    }

    pub fn is_offloaded(&self) -> bool {
        matches!(self, SendOutcome::Offloaded { .. })
    }
}

/// Result of `on_receive`. Both variants carry delivery metadata in `properties`.
#[derive(Debug, Clone, PartialEq)]
pub enum ReceiveOutcome {
    Inline(Envelope),

    /// Reference resolved; the backing blob has already been deleted.
    Resolved {
        envelope: Envelope,
        reference: ReferenceRecord,
    },
}

impl ReceiveOutcome {
    pub fn envelope(&self) -> &Envelope {
        match self {
            ReceiveOutcome::Inline(envelope) => envelope,
            ReceiveOutcome::Resolved { envelope, .. } => envelope,
        }
    }

    pub fn into_envelope(self) -> Envelope {
        match self {
            ReceiveOutcome::Inline(envelope) => envelope,
            ReceiveOutcome::Resolved { envelope, .. } => envelope,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ReceiveOutcome::Resolved { .. })
    }
}
