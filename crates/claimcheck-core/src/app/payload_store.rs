//! PayloadStore - 巨大 payload の保存と取得（取得後に削除）
//!
//! # 既知の挙動
//! - 期限（`expires_at`）はインスタンス構築時に一度だけ「now + TTL」で計算し、
//!   以後のすべての store で使い回す。長生きするインスタンスでは、後のメッセージほど
//!   実効 TTL が短くなる。
//! - `retrieve` は読み取りに成功した直後に object を削除する。削除に失敗すると
//!   読み取った payload は捨てて全体を失敗にする。メッセージが再配送されても
//!   object はもう無いので、再配送時の解決は `NotFound` になる（参照ごとに
//!   at-most-once 消費を前提とした設計）。

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::domain::{OffloadError, ReferenceRecord};
use crate::ports::{BlobError, BlobStore, Clock, KeyGenerator, UuidKeyGenerator};

pub struct PayloadStore {
    blob: Arc<dyn BlobStore>,
    keys: Arc<dyn KeyGenerator>,
    expires_at: DateTime<Utc>,
}

impl PayloadStore {
    pub fn new(blob: Arc<dyn BlobStore>, clock: &dyn Clock, ttl: Duration) -> Self {
        Self::with_key_generator(blob, Arc::new(UuidKeyGenerator), clock, ttl)
    }

    pub fn with_key_generator(
        blob: Arc<dyn BlobStore>,
        keys: Arc<dyn KeyGenerator>,
        clock: &dyn Clock,
        ttl: Duration,
    ) -> Self {
        Self {
            blob,
            keys,
            expires_at: clock.now() + ttl,
        }
    }

    /// Expiry hint attached to every stored object.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Write `payload` under a fresh key in `container`.
    pub async fn store(
        &self,
        payload: &[u8],
        container: &str,
    ) -> Result<ReferenceRecord, OffloadError> {
        if container.trim().is_empty() {
            return Err(OffloadError::Config(
                "blob container name cannot be blank".to_string(),
            ));
        }

        let key = self.keys.generate_key();
        if let Err(source) = self
            .blob
            .put(container, key.as_str(), payload.to_vec(), self.expires_at)
            .await
        {
            warn!(%container, %key, error = %source, "failed to store payload; message was not sent");
            return Err(OffloadError::StoreFailed {
                container: container.to_string(),
                key,
                source,
            });
        }

        debug!(%container, %key, bytes = payload.len(), "stored payload");
        Ok(ReferenceRecord::new(container, key))
    }

    /// Read the referenced payload, then delete its object.
    pub async fn retrieve(&self, record: &ReferenceRecord) -> Result<Vec<u8>, OffloadError> {
        let container = record.container.as_str();
        let key = record.key.as_str();

        let payload = match self.blob.get(container, key).await {
            Ok(bytes) => bytes,
            Err(BlobError::NotFound { .. }) => {
                return Err(OffloadError::NotFound {
                    container: record.container.clone(),
                    key: record.key.clone(),
                });
            }
            Err(source) => {
                warn!(%container, %key, error = %source, "failed to read payload");
                return Err(OffloadError::FetchFailed {
                    container: record.container.clone(),
                    key: record.key.clone(),
                    source,
                });
            }
        };

        if let Err(source) = self.blob.delete(container, key).await {
            warn!(%container, %key, error = %source, "failed to delete payload after read");
            return Err(OffloadError::DeleteFailed {
                container: record.container.clone(),
                key: record.key.clone(),
                source,
            });
        }

        debug!(%container, %key, "deleted object");
        Ok(payload)
    }
}
