//! Outbound / inbound message shapes exchanged with the queue transport.

use super::{Attributes, Envelope};

/// 送信側のメッセージ（envelope + attributes）
///
/// payload の位置は envelope の `body` フィールド内（`codec::BodyCodec` 参照）。
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub envelope: Envelope,
    pub attributes: Attributes,
}

impl Message {
    pub fn new(envelope: Envelope) -> Self {
        Self {
            envelope,
            attributes: Attributes::new(),
        }
    }

    pub fn with_attributes(envelope: Envelope, attributes: Attributes) -> Self {
        Self {
            envelope,
            attributes,
        }
    }
}

/// Transport delivery metadata needed to acknowledge a received message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub queue: String,
    /// Opaque receipt handle issued by the queue.
    pub receipt_handle: String,
}

/// 受信側で transport から渡されるもの：デコード済み envelope bytes + delivery 情報
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub envelope_bytes: Vec<u8>,
    pub delivery: Delivery,
    pub attributes: Attributes,
}
