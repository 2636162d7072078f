//! PayloadOffloadMiddleware port
//!
//! transport はこの trait を直接呼び出す。transport の channel を継承したり、
//! グローバルな alias テーブルに登録したりはしない（構築時に合成する）。

use async_trait::async_trait;

use crate::domain::{InboundMessage, Message, OffloadError, ReceiveOutcome, SendOutcome};

#[async_trait]
pub trait PayloadOffloadMiddleware: Send + Sync {
    /// Outbound hook: may replace the payload position with a reference record.
    async fn on_send(&self, message: Message) -> Result<SendOutcome, OffloadError>;

    /// Inbound hook: resolves a reference (deleting its blob) and attaches delivery metadata.
    async fn on_receive(&self, message: InboundMessage) -> Result<ReceiveOutcome, OffloadError>;
}
