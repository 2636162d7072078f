//! InMemoryBlobStore - 開発用の Blob ストア

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::ports::{BlobError, BlobStore};

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    expires_at: DateTime<Utc>,
}

/// InMemoryBlobStore は `(container, key)` ごとに bytes と期限を保持する
///
/// 期限切れの掃除はしない（期限は記録するだけ）。
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    objects: Mutex<HashMap<(String, String), StoredObject>>,
    puts: AtomicUsize,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `put` calls so far.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.objects.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.lock().await.is_empty()
    }

    pub async fn contains(&self, container: &str, key: &str) -> bool {
        self.objects
            .lock()
            .await
            .contains_key(&(container.to_string(), key.to_string()))
    }

    pub async fn expires_at(&self, container: &str, key: &str) -> Option<DateTime<Utc>> {
        self.objects
            .lock()
            .await
            .get(&(container.to_string(), key.to_string()))
            .map(|o| o.expires_at)
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(
        &self,
        container: &str,
        key: &str,
        bytes: Vec<u8>,
        expires_at: DateTime<Utc>,
    ) -> Result<(), BlobError> {
        let mut objects = self.objects.lock().await;
        objects.insert(
            (container.to_string(), key.to_string()),
            StoredObject { bytes, expires_at },
        );
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>, BlobError> {
        let objects = self.objects.lock().await;
        objects
            .get(&(container.to_string(), key.to_string()))
            .map(|o| o.bytes.clone())
            .ok_or_else(|| BlobError::NotFound {
                container: container.to_string(),
                key: key.to_string(),
            })
    }

    /// 存在しない object の削除は成功扱い（S3 と同じ）
    async fn delete(&self, container: &str, key: &str) -> Result<(), BlobError> {
        self.objects
            .lock()
            .await
            .remove(&(container.to_string(), key.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = InMemoryBlobStore::new();
        let expires_at = Utc::now();
        store.put("b", "k", b"v".to_vec(), expires_at).await.unwrap();

        assert_eq!(store.get("b", "k").await.unwrap(), b"v");
        assert_eq!(store.expires_at("b", "k").await, Some(expires_at));
        assert_eq!(store.put_count(), 1);

        store.delete("b", "k").await.unwrap();
        assert!(matches!(
            store.get("b", "k").await,
            Err(BlobError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_containers_are_separate() {
        let store = InMemoryBlobStore::new();
        store.put("b1", "k", b"1".to_vec(), Utc::now()).await.unwrap();
        store.put("b2", "k", b"2".to_vec(), Utc::now()).await.unwrap();

        assert_eq!(store.get("b1", "k").await.unwrap(), b"1");
        assert_eq!(store.get("b2", "k").await.unwrap(), b"2");
        assert_eq!(store.len().await, 2);
    }
}
