//! OffloadGateBuilder - OffloadGate の構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）

use std::sync::Arc;

use chrono::Duration;

use crate::app::{OffloadGate, PayloadStore};
use crate::domain::OffloadConfig;
use crate::ports::{BlobStore, Clock, KeyGenerator, SystemClock, UuidKeyGenerator};

/// OffloadGateBuilder は OffloadGate を構築
///
/// # 使用例
/// ```ignore
/// let gate = OffloadGateBuilder::new(blob)
///     .container("my-bucket")
///     .message_size_threshold(128 * 1024)
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - build() 時に設定の矛盾をチェックする
/// - container の空チェックは実際に offload するときに行う（小さいメッセージだけなら不要）
pub struct OffloadGateBuilder {
    blob: Arc<dyn BlobStore>,
    config: OffloadConfig,
    clock: Arc<dyn Clock>,
    keys: Arc<dyn KeyGenerator>,
}

/// BuildError は OffloadGate 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("blob TTL must be at least one day, got {0}")]
    InvalidTtl(i64),

    #[error("reserved attribute name cannot be empty")]
    EmptyReservedName,
}

impl OffloadGateBuilder {
    pub fn new(blob: Arc<dyn BlobStore>) -> Self {
        Self {
            blob,
            config: OffloadConfig::default(),
            clock: Arc::new(SystemClock),
            keys: Arc::new(UuidKeyGenerator),
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: OffloadConfig) -> Self {
        self.config = config;
        self
    }

    pub fn container(mut self, container: impl Into<String>) -> Self {
        self.config.container = container.into();
        self
    }

    /// Offload every message regardless of its size.
    pub fn always_offload(mut self, always: bool) -> Self {
        self.config.always_offload = always;
        self
    }

    /// Size threshold for offloading. Default: 256 KiB.
    pub fn message_size_threshold(mut self, threshold_bytes: usize) -> Self {
        self.config.threshold_bytes = threshold_bytes;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn key_generator(mut self, keys: Arc<dyn KeyGenerator>) -> Self {
        self.keys = keys;
        self
    }

    /// Validate the configuration and wire the gate.
    ///
    /// Blob の期限はここで一度だけ計算される（`PayloadStore` 参照）。
    pub fn build(self) -> Result<OffloadGate, BuildError> {
        if self.config.blob_ttl_days < 1 {
            return Err(BuildError::InvalidTtl(self.config.blob_ttl_days));
        }
        if self.config.reserved_attribute_name.is_empty() {
            return Err(BuildError::EmptyReservedName);
        }

        let store = PayloadStore::with_key_generator(
            self.blob,
            self.keys,
            self.clock.as_ref(),
            Duration::days(self.config.blob_ttl_days),
        );
        Ok(OffloadGate::new(self.config, store))
    }
}
