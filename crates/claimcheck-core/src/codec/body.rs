//! BodyCodec - envelope の `body` フィールド
//!
//! `body` は JSON 配列 `[args, kwargs, embed]` を base64 したテキスト。
//! payload の位置は配列の要素 0。書き換え時は `body` だけを再エンコードする。
//!
//! # 正規化
//! 再エンコードは serde_json の compact 形式（区切りは `,` / `:`、非 ASCII はそのまま）。
//! Python の `json.dumps` が出す `", "` 区切りや `\uXXXX` エスケープは保たれないので、
//! offload / 解決を経た body は値としては同じでも bytes は変わりうる。
//! offload 判定のサイズもこの compact テキストで数えるため、閾値付近では
//! Python 側の producer と数バイトずれることがある。

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde_json::Value;

use crate::domain::OffloadError;

pub struct BodyCodec;

/// Decoded `body` field.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskBody {
    parts: Vec<Value>,
}

impl BodyCodec {
    pub fn decode(body: &str) -> Result<TaskBody, OffloadError> {
        let raw = BASE64
            .decode(body.as_bytes())
            .map_err(|e| OffloadError::MalformedEnvelope(format!("body is not base64: {e}")))?;
        let value: Value = serde_json::from_slice(&raw)
            .map_err(|e| OffloadError::MalformedEnvelope(format!("body json decode: {e}")))?;
        TaskBody::from_value(value)
    }

    pub fn encode(body: &TaskBody) -> Result<String, OffloadError> {
        let raw = serde_json::to_vec(&body.parts)
            .map_err(|e| OffloadError::MalformedEnvelope(format!("body json encode: {e}")))?;
        Ok(BASE64.encode(raw))
    }
}

impl TaskBody {
    /// Build a body from its parts; the first part is the payload position.
    pub fn new(parts: Vec<Value>) -> Result<Self, OffloadError> {
        if parts.is_empty() {
            return Err(OffloadError::MalformedEnvelope(
                "body has no payload position".to_string(),
            ));
        }
        Ok(Self { parts })
    }

    fn from_value(value: Value) -> Result<Self, OffloadError> {
        match value {
            Value::Array(parts) => Self::new(parts),
            _ => Err(OffloadError::MalformedEnvelope(
                "body is not a JSON array".to_string(),
            )),
        }
    }

    pub fn payload(&self) -> &Value {
        &self.parts[0]
    }

    pub fn replace_payload(&mut self, payload: Value) -> Value {
        std::mem::replace(&mut self.parts[0], payload)
    }

    pub fn parts(&self) -> &[Value] {
        &self.parts
    }
}
