//! Envelope - transport が運ぶ構造化メッセージ全体
//!
//! envelope のうち、このレイヤーが書き換えるのは `body` フィールドと
//! 受信時の `properties.delivery_info` / `properties.delivery_tag` だけ。
//! それ以外のキーは順序も値もそのまま残す（serde_json の `preserve_order`）。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::OffloadError;

pub const BODY_FIELD: &str = "body";
pub const PROPERTIES_FIELD: &str = "properties";
pub const DELIVERY_INFO_FIELD: &str = "delivery_info";
pub const DELIVERY_TAG_FIELD: &str = "delivery_tag";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Envelope(Map<String, Value>);

impl Envelope {
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Parse envelope bytes. Anything but a JSON object is rejected.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, OffloadError> {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(other) => Err(OffloadError::MalformedEnvelope(format!(
                "expected a JSON object, got {}",
                json_type_name(&other)
            ))),
            Err(e) => Err(OffloadError::MalformedEnvelope(format!("json decode: {e}"))),
        }
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, OffloadError> {
        serde_json::to_vec(&self.0)
            .map_err(|e| OffloadError::MalformedEnvelope(format!("json encode: {e}")))
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn body(&self) -> Option<&str> {
        self.0.get(BODY_FIELD).and_then(Value::as_str)
    }

    pub fn set_body(&mut self, body: String) {
        self.0.insert(BODY_FIELD.to_string(), Value::String(body));
    }

    pub fn properties(&self) -> Option<&Map<String, Value>> {
        self.0.get(PROPERTIES_FIELD).and_then(Value::as_object)
    }

    pub fn has_properties(&self) -> bool {
        self.properties().is_some()
    }

    /// `properties` を取得する。なければ（あるいは object でなければ）空の object を入れる。
    pub fn properties_mut(&mut self) -> &mut Map<String, Value> {
        let slot = self
            .0
            .entry(PROPERTIES_FIELD)
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        match slot {
            Value::Object(map) => map,
            _ => unreachable!("properties was just replaced with an object"),
        }
    }

    pub fn delivery_tag(&self) -> Option<&str> {
        self.properties()
            .and_then(|p| p.get(DELIVERY_TAG_FIELD))
            .and_then(Value::as_str)
    }

    pub fn delivery_info(&self) -> Option<&Map<String, Value>> {
        self.properties()
            .and_then(|p| p.get(DELIVERY_INFO_FIELD))
            .and_then(Value::as_object)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_non_object_envelopes() {
        let err = Envelope::from_slice(b"[1, 2, 3]").unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn set_body_keeps_key_order() {
        let raw = br#"{"headers":{"task":"t"},"body":"old","properties":{"priority":0}}"#;
        let mut env = Envelope::from_slice(raw).unwrap();
        env.set_body("new".to_string());

        let keys: Vec<&str> = env.as_map().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["headers", "body", "properties"]);
        assert_eq!(env.body(), Some("new"));
    }

    #[test]
    fn properties_mut_replaces_non_object() {
        let mut env = Envelope::from_map(
            json!({ "body": "x", "properties": "bogus" })
                .as_object()
                .cloned()
                .unwrap(),
        );
        env.properties_mut()
            .insert(DELIVERY_TAG_FIELD.to_string(), json!("rh-1"));
        assert_eq!(env.delivery_tag(), Some("rh-1"));
    }
}
