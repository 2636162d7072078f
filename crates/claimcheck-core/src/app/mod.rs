//! App - アプリケーション層
//!
//! ports を組み合わせて offload / resolve のロジックを実装します。
//!
//! # 主要コンポーネント
//! - **SizeAccountant**: サイズ計算と offload 判定、attribute の検証
//! - **PayloadStore**: Blob への保存、取得後の削除
//! - **OffloadGate**: 送信/受信メッセージの書き換え（PayloadOffloadMiddleware 実装）
//! - **OffloadGateBuilder**: 構築とワイヤリング
//! - **Channel**: QueueTransport とのつなぎ

pub mod builder;
pub mod channel;
pub mod gate;
pub mod payload_store;
pub mod size;

pub use self::builder::{BuildError, OffloadGateBuilder};
pub use self::channel::{Channel, ChannelError};
pub use self::gate::OffloadGate;
pub use self::payload_store::PayloadStore;
pub use self::size::SizeAccountant;
