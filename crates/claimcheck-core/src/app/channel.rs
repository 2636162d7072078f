//! Channel - QueueTransport と PayloadOffloadMiddleware をつなぐ接着剤
//!
//! # フロー
//! - put: on_send → envelope を JSON にして base64（キューの wire body）→ send
//! - get: receive → base64 decode → on_receive → 配送情報付きの envelope
//! - ack: delivery tag（receipt handle）でキューから削除
//!
//! no-ack の queue は get の直後に削除する。on_receive が失敗したメッセージは
//! 削除せずに in-flight のまま残す（再配送は transport 側の判断）。
//!
//! no-ack の queue で on_receive が参照を解決した（Blob はもう削除済み）あとに
//! キューからの削除が失敗すると、解決済みの payload はエラーとともに捨てられ、
//! 再配送されても `NotFound` にしかならない。

use std::collections::HashSet;
use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{Delivery, InboundMessage, Message, OffloadError, ReceiveOutcome, SendOutcome};
use crate::ports::{PayloadOffloadMiddleware, QueueError, QueueTransport};

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error(transparent)]
    Offload(#[from] OffloadError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("queue message body is not base64: {0}")]
    WireDecode(String),
}

pub struct Channel {
    transport: Arc<dyn QueueTransport>,
    middleware: Arc<dyn PayloadOffloadMiddleware>,
    no_ack_queues: HashSet<String>,
}

impl Channel {
    pub fn new(
        transport: Arc<dyn QueueTransport>,
        middleware: Arc<dyn PayloadOffloadMiddleware>,
    ) -> Self {
        Self {
            transport,
            middleware,
            no_ack_queues: HashSet::new(),
        }
    }

    /// Messages from this queue are deleted right after they are received.
    pub fn with_no_ack_queue(mut self, queue: impl Into<String>) -> Self {
        self.no_ack_queues.insert(queue.into());
        self
    }

    pub async fn put(&self, queue: &str, message: Message) -> Result<SendOutcome, ChannelError> {
        let outcome = self.middleware.on_send(message).await?;
        let sent = outcome.message();
        let wire = BASE64.encode(sent.envelope.to_vec()?);
        self.transport
            .send(queue, wire, sent.attributes.clone())
            .await?;
        debug!(queue, offloaded = outcome.is_offloaded(), "message sent");
        Ok(outcome)
    }

    pub async fn get(&self, queue: &str) -> Result<Option<ReceiveOutcome>, ChannelError> {
        let Some(raw) = self.transport.receive(queue).await? else {
            return Ok(None);
        };

        let envelope_bytes = BASE64
            .decode(raw.body.as_bytes())
            .map_err(|e| ChannelError::WireDecode(e.to_string()))?;
        let inbound = InboundMessage {
            envelope_bytes,
            delivery: Delivery {
                queue: queue.to_string(),
                receipt_handle: raw.receipt_handle.clone(),
            },
            attributes: raw.attributes,
        };

        let outcome = match self.middleware.on_receive(inbound).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(queue, error = %e, "failed to resolve received message");
                return Err(e.into());
            }
        };

        if self.no_ack_queues.contains(queue) {
            self.transport.delete(queue, &raw.receipt_handle).await?;
        }
        Ok(Some(outcome))
    }

    /// Delete an acknowledged message from the queue.
    pub async fn ack(&self, queue: &str, delivery_tag: &str) -> Result<(), ChannelError> {
        self.transport.delete(queue, delivery_tag).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::OffloadGateBuilder;
    use crate::codec::{BodyCodec, TaskBody};
    use crate::domain::Envelope;
    use crate::impls::{InMemoryBlobStore, InMemoryQueue};
    use serde_json::{Value, json};

    const QUEUE: &str = "bulk-message-extend";

    fn setup() -> (Channel, Arc<InMemoryQueue>, Arc<InMemoryBlobStore>) {
        let blob = Arc::new(InMemoryBlobStore::new());
        let queue = Arc::new(InMemoryQueue::new());
        let gate = OffloadGateBuilder::new(blob.clone())
            .container("bucket")
            .build()
            .unwrap();
        (Channel::new(queue.clone(), Arc::new(gate)), queue, blob)
    }

    fn message(payload: Value) -> Message {
        let body = TaskBody::new(vec![payload, json!({}), json!({})]).unwrap();
        let envelope = json!({
            "body": BodyCodec::encode(&body).unwrap(),
            "properties": { "delivery_info": {} }
        });
        Message::new(Envelope::from_map(envelope.as_object().cloned().unwrap()))
    }

    fn payload_of(outcome: &ReceiveOutcome) -> Value {
        let body = outcome.envelope().body().unwrap();
        BodyCodec::decode(body).unwrap().payload().clone()
    }

    #[tokio::test]
    async fn put_get_ack_roundtrip_for_large_message() {
        let (channel, queue, blob) = setup();
        let big = json!(["x".repeat(300_000), 1]);

        let sent = channel.put(QUEUE, message(big.clone())).await.unwrap();
        assert!(sent.is_offloaded());
        assert_eq!(blob.len().await, 1);

        let received = channel.get(QUEUE).await.unwrap().unwrap();
        assert!(received.is_resolved());
        assert_eq!(payload_of(&received), big);
        assert!(blob.is_empty().await);

        let tag = received.envelope().delivery_tag().unwrap().to_string();
        channel.ack(QUEUE, &tag).await.unwrap();
        assert_eq!(queue.in_flight_len(QUEUE).await, 0);
    }

    #[tokio::test]
    async fn redelivered_offloaded_message_cannot_be_resolved() {
        let (channel, queue, _blob) = setup();
        channel
            .put(QUEUE, message(json!("x".repeat(300_000))))
            .await
            .unwrap();

        let first = channel.get(QUEUE).await.unwrap().unwrap();
        let tag = first.envelope().delivery_tag().unwrap().to_string();

        // consumer が ack 前に落ちて再配送された
        queue.redeliver(QUEUE, &tag).await.unwrap();
        let err = channel.get(QUEUE).await.unwrap_err();
        assert!(matches!(
            err,
            ChannelError::Offload(OffloadError::NotFound { .. })
        ));
        assert_eq!(queue.in_flight_len(QUEUE).await, 1);
    }

    #[tokio::test]
    async fn no_ack_queue_deletes_on_receive() {
        let (channel, queue, _blob) = setup();
        let channel = channel.with_no_ack_queue(QUEUE);
        channel.put(QUEUE, message(json!("hello"))).await.unwrap();

        let received = channel.get(QUEUE).await.unwrap().unwrap();
        assert_eq!(payload_of(&received), json!("hello"));
        assert_eq!(queue.in_flight_len(QUEUE).await, 0);
    }

    /// delete だけが失敗する QueueTransport
    struct UndeletableQueue {
        inner: InMemoryQueue,
    }

    #[async_trait::async_trait]
    impl QueueTransport for UndeletableQueue {
        async fn send(
            &self,
            queue: &str,
            body: String,
            attributes: crate::domain::Attributes,
        ) -> Result<(), QueueError> {
            self.inner.send(queue, body, attributes).await
        }

        async fn receive(
            &self,
            queue: &str,
        ) -> Result<Option<crate::ports::QueuedMessage>, QueueError> {
            self.inner.receive(queue).await
        }

        async fn delete(&self, _queue: &str, _receipt_handle: &str) -> Result<(), QueueError> {
            Err(QueueError::OperationFailed("throttled".to_string()))
        }
    }

    #[tokio::test]
    async fn no_ack_delete_failure_drops_resolved_payload() {
        let blob = Arc::new(InMemoryBlobStore::new());
        let queue = Arc::new(UndeletableQueue {
            inner: InMemoryQueue::new(),
        });
        let gate = OffloadGateBuilder::new(blob.clone())
            .container("bucket")
            .build()
            .unwrap();
        let channel = Channel::new(queue.clone(), Arc::new(gate)).with_no_ack_queue(QUEUE);

        channel
            .put(QUEUE, message(json!("x".repeat(300_000))))
            .await
            .unwrap();
        let err = channel.get(QUEUE).await.unwrap_err();
        assert!(matches!(err, ChannelError::Queue(QueueError::OperationFailed(_))));

        // Blob は解決時に削除済み、メッセージは in-flight のまま
        assert!(blob.is_empty().await);
        assert_eq!(queue.inner.in_flight_len(QUEUE).await, 1);
    }

    #[tokio::test]
    async fn empty_queue_returns_none() {
        let (channel, _queue, _blob) = setup();
        assert!(channel.get(QUEUE).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn non_base64_wire_body_is_rejected() {
        let (channel, queue, _blob) = setup();
        queue
            .send(QUEUE, "%%%".to_string(), Default::default())
            .await
            .unwrap();
        let err = channel.get(QUEUE).await.unwrap_err();
        assert!(matches!(err, ChannelError::WireDecode(_)));
    }
}
