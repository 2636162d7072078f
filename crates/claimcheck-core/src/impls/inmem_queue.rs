//! InMemoryQueue - 開発用のメッセージキュー
//!
//! # 実装詳細
//! - queue 名ごとに ready (VecDeque) と in-flight (receipt handle -> message) を持つ
//! - `receive` で ready から in-flight へ移し、`delete` で in-flight から消す
//! - receipt handle は receive のたびに新しく発行する（UUID v4）

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::Attributes;
use crate::ports::{QueueError, QueueTransport, QueuedMessage};

#[derive(Debug, Clone)]
struct Stored {
    body: String,
    attributes: Attributes,
}

#[derive(Debug, Default)]
struct QueueState {
    ready: VecDeque<Stored>,
    in_flight: HashMap<String, Stored>,
}

#[derive(Debug, Default)]
pub struct InMemoryQueue {
    queues: Mutex<HashMap<String, QueueState>>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages waiting to be received.
    pub async fn ready_len(&self, queue: &str) -> usize {
        self.queues
            .lock()
            .await
            .get(queue)
            .map_or(0, |q| q.ready.len())
    }

    /// Messages received but not yet deleted.
    pub async fn in_flight_len(&self, queue: &str) -> usize {
        self.queues
            .lock()
            .await
            .get(queue)
            .map_or(0, |q| q.in_flight.len())
    }

    /// in-flight のメッセージを ready の先頭に戻す（visibility timeout 切れ相当）
    pub async fn redeliver(&self, queue: &str, receipt_handle: &str) -> Result<(), QueueError> {
        let mut queues = self.queues.lock().await;
        let state = queues
            .get_mut(queue)
            .ok_or_else(|| QueueError::UnknownReceipt(receipt_handle.to_string()))?;
        let stored = state
            .in_flight
            .remove(receipt_handle)
            .ok_or_else(|| QueueError::UnknownReceipt(receipt_handle.to_string()))?;
        state.ready.push_front(stored);
        Ok(())
    }
}

#[async_trait]
impl QueueTransport for InMemoryQueue {
    async fn send(
        &self,
        queue: &str,
        body: String,
        attributes: Attributes,
    ) -> Result<(), QueueError> {
        let mut queues = self.queues.lock().await;
        queues
            .entry(queue.to_string())
            .or_default()
            .ready
            .push_back(Stored { body, attributes });
        Ok(())
    }

    async fn receive(&self, queue: &str) -> Result<Option<QueuedMessage>, QueueError> {
        let mut queues = self.queues.lock().await;
        let Some(state) = queues.get_mut(queue) else {
            return Ok(None);
        };
        let Some(stored) = state.ready.pop_front() else {
            return Ok(None);
        };

        let receipt_handle = Uuid::new_v4().to_string();
        state.in_flight.insert(receipt_handle.clone(), stored.clone());
        Ok(Some(QueuedMessage {
            body: stored.body,
            receipt_handle,
            attributes: stored.attributes,
        }))
    }

    async fn delete(&self, queue: &str, receipt_handle: &str) -> Result<(), QueueError> {
        let mut queues = self.queues.lock().await;
        queues
            .get_mut(queue)
            .and_then(|state| state.in_flight.remove(receipt_handle))
            .map(|_| ())
            .ok_or_else(|| QueueError::UnknownReceipt(receipt_handle.to_string()))
    }
}
