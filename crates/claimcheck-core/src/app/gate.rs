//! OffloadGate - 送信/受信メッセージの offload と解決
//!
//! # 送信フロー（Created → {Inline | Offloaded}）
//! 1. attribute の検証（失敗したらメッセージは触らずにエラー）
//! 2. body / attribute のサイズを計算して offload するか判定
//! 3. offload しない: メッセージをそのまま返す
//! 4. offload する: payload を PayloadStore に保存し、payload 位置を参照レコードで置き換え、
//!    envelope の `body` だけを再エンコードする
//!
//! # 受信フロー（Received → {Inline | Resolved}）
//! 1. envelope を parse して payload 位置を取り出す
//! 2. 参照でなければそのまま（delivery 情報だけ付ける）
//! 3. 参照なら PayloadStore から取得（Blob は削除される）して payload 位置に戻す
//!
//! gate 自体はメッセージごとの状態を持たない。設定は構築時に固定。

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use crate::app::{PayloadStore, SizeAccountant};
use crate::codec::{BodyCodec, ReferenceCodec};
use crate::domain::envelope::{DELIVERY_INFO_FIELD, DELIVERY_TAG_FIELD};
use crate::domain::{
    Delivery, Envelope, InboundMessage, Message, OffloadConfig, OffloadError, ReceiveOutcome,
    SendOutcome,
};
use crate::ports::PayloadOffloadMiddleware;

pub const RECEIPT_HANDLE_FIELD: &str = "receipt_handle";
pub const QUEUE_FIELD: &str = "queue";

pub struct OffloadGate {
    config: OffloadConfig,
    store: PayloadStore,
}

impl OffloadGate {
    pub fn new(config: OffloadConfig, store: PayloadStore) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &OffloadConfig {
        &self.config
    }

    pub fn payload_store(&self) -> &PayloadStore {
        &self.store
    }

    async fn offload_if_large(&self, mut message: Message) -> Result<SendOutcome, OffloadError> {
        let config = &self.config;
        SizeAccountant::validate(
            &message.attributes,
            config.threshold_bytes,
            config.max_attributes,
            &config.reserved_attribute_name,
        )?;

        let body = message
            .envelope
            .body()
            .ok_or_else(|| OffloadError::MalformedEnvelope("missing body field".to_string()))?;
        let mut task_body = BodyCodec::decode(body)?;
        let payload = serde_json::to_string(task_body.payload())
            .map_err(|e| OffloadError::MalformedEnvelope(format!("payload json encode: {e}")))?;

        let body_size = payload.len();
        let attr_size = SizeAccountant::attributes_size(&message.attributes);
        if !SizeAccountant::should_offload(
            body_size,
            attr_size,
            config.threshold_bytes,
            config.always_offload,
        ) {
            return Ok(SendOutcome::Inline(message));
        }

        let reference = self
            .store
            .store(payload.as_bytes(), &config.container)
            .await?;
        task_body.replace_payload(ReferenceCodec::encode(&reference));
        let new_body = BodyCodec::encode(&task_body)?;
        message.envelope.set_body(new_body);

        debug!(
            container = %reference.container,
            key = %reference.key,
            body_size,
            attr_size,
            "offloaded payload"
        );
        Ok(SendOutcome::Offloaded { message, reference })
    }

    async fn resolve(&self, message: InboundMessage) -> Result<ReceiveOutcome, OffloadError> {
        let mut envelope = Envelope::from_slice(&message.envelope_bytes)?;

        // body が読めない / payload が参照でない場合は通常の payload として扱う
        let task_body = envelope.body().and_then(|b| BodyCodec::decode(b).ok());
        let outcome = match task_body {
            Some(mut task_body) if ReferenceCodec::detect(task_body.payload()) => {
                let reference = ReferenceCodec::decode(task_body.payload())?;
                let bytes = self.store.retrieve(&reference).await?;
                let payload: Value = serde_json::from_slice(&bytes).map_err(|e| {
                    OffloadError::MalformedEnvelope(format!("resolved payload json decode: {e}"))
                })?;
                task_body.replace_payload(payload);
                envelope.set_body(BodyCodec::encode(&task_body)?);

                debug!(
                    container = %reference.container,
                    key = %reference.key,
                    "resolved payload"
                );
                attach_delivery(&mut envelope, &message);
                ReceiveOutcome::Resolved {
                    envelope,
                    reference,
                }
            }
            _ => {
                // properties を持たない envelope はこの producer が送ったものではない。
                // properties はあるが delivery_info がないだけなら body はそのまま残す（空の delivery_info を足すだけ）
                if !envelope.has_properties() {
                    envelope.set_body(
                        String::from_utf8_lossy(&message.envelope_bytes).into_owned(),
                    );
                }
                attach_delivery(&mut envelope, &message);
                ReceiveOutcome::Inline(envelope)
            }
        };
        Ok(outcome)
    }
}

#[async_trait]
impl PayloadOffloadMiddleware for OffloadGate {
    async fn on_send(&self, message: Message) -> Result<SendOutcome, OffloadError> {
        self.offload_if_large(message).await
    }

    async fn on_receive(&self, message: InboundMessage) -> Result<ReceiveOutcome, OffloadError> {
        self.resolve(message).await
    }
}

/// `properties.delivery_info` と `properties.delivery_tag` に receipt handle を入れる。
/// `properties` / `delivery_info` がなければ作る。
fn attach_delivery(envelope: &mut Envelope, message: &InboundMessage) {
    let Delivery {
        queue,
        receipt_handle,
    } = &message.delivery;
    let properties = envelope.properties_mut();

    let info = properties
        .entry(DELIVERY_INFO_FIELD)
        .or_insert_with(|| Value::Object(Map::new()));
    if !info.is_object() {
        *info = Value::Object(Map::new());
    }
    if let Value::Object(info) = info {
        info.insert(
            RECEIPT_HANDLE_FIELD.to_string(),
            Value::String(receipt_handle.clone()),
        );
        info.insert(QUEUE_FIELD.to_string(), Value::String(queue.clone()));
    }

    properties.insert(
        DELIVERY_TAG_FIELD.to_string(),
        Value::String(receipt_handle.clone()),
    );
}
