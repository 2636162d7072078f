//! BlobStore port - offload された payload の保存先（S3 / MinIO / InMemory）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("object {container}/{key} not found")]
    NotFound { container: String, key: String },

    #[error("blob store operation failed: {0}")]
    Backend(String),
}

/// BlobStore は `(container, key)` 単位で bytes を保存する
///
/// # 設計原則
/// - `expires_at` は期限のヒント（ライフサイクルルールなどで消える前提）
/// - 存在しない object の `get` は `BlobError::NotFound`
/// - クライアントは並行利用可能であること
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(
        &self,
        container: &str,
        key: &str,
        bytes: Vec<u8>,
        expires_at: DateTime<Utc>,
    ) -> Result<(), BlobError>;

    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>, BlobError>;

    async fn delete(&self, container: &str, key: &str) -> Result<(), BlobError>;
}
