//! Errors - エラー型と分類
//!
//! すべてのエラーは現在の `on_send` / `on_receive` を中断し、メッセージは部分的に
//! 書き換えられない。リトライするかどうかは呼び出し側（transport / task runtime）が決める。

use thiserror::Error;

use crate::domain::ObjectKey;
use crate::ports::BlobError;

/// ErrorKind はエラーの運用上の分類
///
/// - Validation: 入力が不正（ネットワーク呼び出しの前に検出、リトライ無意味）
/// - Storage: Blob ストアの I/O 失敗（そのまま呼び出し側へ返す）
/// - Decode: 参照フラグはあるのに必要なフィールドがない、など
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Storage,
    Decode,
}

#[derive(Debug, Error)]
pub enum OffloadError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(
        "number of message attributes [{count}] exceeds the maximum allowed for large-payload messages [{max}]"
    )]
    AttributeCountExceeded { count: usize, max: usize },

    #[error(
        "total size of message attributes is {size} bytes which is larger than the threshold of {threshold} bytes"
    )]
    AttributeSizeExceeded { size: usize, threshold: usize },

    #[error("message attribute name {0} is reserved for use by the offload layer")]
    ReservedAttributeUsed(String),

    #[error("failed to store payload in {container}/{key}")]
    StoreFailed {
        container: String,
        key: ObjectKey,
        #[source]
        source: BlobError,
    },

    #[error("payload object {container}/{key} not found")]
    NotFound { container: String, key: ObjectKey },

    #[error("failed to read payload object {container}/{key}")]
    FetchFailed {
        container: String,
        key: ObjectKey,
        #[source]
        source: BlobError,
    },

    #[error("failed to delete payload object {container}/{key}")]
    DeleteFailed {
        container: String,
        key: ObjectKey,
        #[source]
        source: BlobError,
    },

    #[error("malformed reference record: {0}")]
    MalformedReference(String),

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
}

impl OffloadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OffloadError::Config(_)
            | OffloadError::AttributeCountExceeded { .. }
            | OffloadError::AttributeSizeExceeded { .. }
            | OffloadError::ReservedAttributeUsed(_) => ErrorKind::Validation,
            OffloadError::StoreFailed { .. }
            | OffloadError::NotFound { .. }
            | OffloadError::FetchFailed { .. }
            | OffloadError::DeleteFailed { .. } => ErrorKind::Storage,
            OffloadError::MalformedReference(_) | OffloadError::MalformedEnvelope(_) => {
                ErrorKind::Decode
            }
        }
    }
}
