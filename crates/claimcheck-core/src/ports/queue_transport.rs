//! QueueTransport port - メッセージキュー（SQS / InMemory）
//!
//! wire protocol, long-poll, FIFO の group/dedup などは実装側の責務。

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Attributes;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("unknown receipt handle: {0}")]
    UnknownReceipt(String),

    #[error("queue operation failed: {0}")]
    OperationFailed(String),
}

/// A message as handed out by the queue.
#[derive(Debug, Clone)]
pub struct QueuedMessage {
    /// Wire body (base64 text of the envelope).
    pub body: String,
    pub receipt_handle: String,
    pub attributes: Attributes,
}

/// QueueTransport はキューへの送受信と削除（ack）を行う
///
/// # 設計原則
/// - `receive` は今受け取れるものがなければ `None`
/// - 受け取ったメッセージは `delete` されるまで in-flight のまま
#[async_trait]
pub trait QueueTransport: Send + Sync {
    async fn send(&self, queue: &str, body: String, attributes: Attributes)
    -> Result<(), QueueError>;

    async fn receive(&self, queue: &str) -> Result<Option<QueuedMessage>, QueueError>;

    async fn delete(&self, queue: &str, receipt_handle: &str) -> Result<(), QueueError>;
}
