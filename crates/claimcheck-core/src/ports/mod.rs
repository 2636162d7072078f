//! Ports - 抽象化レイヤー
//!
//! 外部システム（Blob ストア、メッセージキュー）や時刻・ID 生成への
//! インターフェースを trait として定義し、実装の詳細を隠蔽する。
//!
//! # 設計原則
//! - コアはこれらの trait にだけ依存する（継承やグローバル登録はしない）
//! - 実装はすべて `Send + Sync`（複数ワーカーから同時に呼ばれる前提）

pub mod blob_store;
pub mod clock;
pub mod key_generator;
pub mod middleware;
pub mod queue_transport;

pub use self::blob_store::{BlobError, BlobStore};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::key_generator::{KeyGenerator, UuidKeyGenerator};
pub use self::middleware::PayloadOffloadMiddleware;
pub use self::queue_transport::{QueueError, QueueTransport, QueuedMessage};
