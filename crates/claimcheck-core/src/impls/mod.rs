//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports の in-memory 実装を含めます。
//!
//! # 含まれる実装
//! - **InMemoryBlobStore**: 開発用の Blob ストア
//! - **InMemoryQueue**: 開発用のメッセージキュー（receipt handle + in-flight 管理）
//!
//! 本番用の実装（S3, SQS など）は別クレートに配置する想定。

pub mod inmem_blob;
pub mod inmem_queue;

pub use self::inmem_blob::InMemoryBlobStore;
pub use self::inmem_queue::InMemoryQueue;
