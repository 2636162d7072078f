//! ReferenceCodec - 参照レコードの wire 形式
//!
//! ```text
//! { "s3BucketName": <container>, "s3Key": <key>, "s3_refrance": true }
//! ```
//!
//! フィールド名は既存の producer/consumer との互換性のための wire 定数。
//! フラグ名のスペルミスも含めて変更しないこと。
//!
//! # 既知の制約
//! 判定は「payload object にフラグがあるか」だけを見る。正規の payload が偶然
//! 同じキーを持っていると参照として扱われてしまう。互換性を捨てられるなら
//! `kind: inline|reference` のような明示的なタグを encode 時に付ける設計の方が安全。

use serde_json::{Map, Value};

use crate::domain::{ObjectKey, OffloadError, ReferenceRecord};

pub const CONTAINER_FIELD: &str = "s3BucketName";
pub const KEY_FIELD: &str = "s3Key";
pub const REFERENCE_FLAG_FIELD: &str = "s3_refrance";

pub struct ReferenceCodec;

impl ReferenceCodec {
    pub fn encode(record: &ReferenceRecord) -> Value {
        let mut map = Map::with_capacity(3);
        map.insert(
            CONTAINER_FIELD.to_string(),
            Value::String(record.container.clone()),
        );
        map.insert(
            KEY_FIELD.to_string(),
            Value::String(record.key.as_str().to_string()),
        );
        map.insert(REFERENCE_FLAG_FIELD.to_string(), Value::Bool(true));
        Value::Object(map)
    }

    /// A payload is a reference iff it is an object whose flag field is truthy
    /// (`true`, a non-zero number, a non-empty string/array/object), as legacy
    /// consumers check it. Every other shape is an ordinary payload, never an error.
    pub fn detect(payload: &Value) -> bool {
        payload
            .as_object()
            .and_then(|map| map.get(REFERENCE_FLAG_FIELD))
            .is_some_and(is_truthy)
    }

    /// Call only after `detect` returned true.
    pub fn decode(payload: &Value) -> Result<ReferenceRecord, OffloadError> {
        let map = payload.as_object().ok_or_else(|| {
            OffloadError::MalformedReference("reference is not a JSON object".to_string())
        })?;

        let container = required_str(map, CONTAINER_FIELD)?;
        let key = required_str(map, KEY_FIELD)?;
        Ok(ReferenceRecord::new(container, ObjectKey::new(key)))
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn required_str<'a>(map: &'a Map<String, Value>, field: &str) -> Result<&'a str, OffloadError> {
    map.get(field).and_then(Value::as_str).ok_or_else(|| {
        OffloadError::MalformedReference(format!("missing required field {field}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn encode_produces_exactly_three_wire_fields() {
        let record = ReferenceRecord::new("bucket", ObjectKey::new("k-1"));
        let wire = ReferenceCodec::encode(&record);
        assert_eq!(
            wire,
            json!({ "s3BucketName": "bucket", "s3Key": "k-1", "s3_refrance": true })
        );
        assert_eq!(wire.as_object().unwrap().len(), 3);
    }

    #[test]
    fn decode_reads_back_encoded_record() {
        let record = ReferenceRecord::new("bucket", ObjectKey::new("k-1"));
        let wire = ReferenceCodec::encode(&record);
        assert!(ReferenceCodec::detect(&wire));
        assert_eq!(ReferenceCodec::decode(&wire).unwrap(), record);
    }

    #[rstest]
    #[case::string(json!("s3_refrance"))]
    #[case::list(json!([{ "s3_refrance": true }]))]
    #[case::ordinary_object(json!({ "name": "weaver", "s3Key": "k" }))]
    #[case::flag_false(json!({ "s3BucketName": "b", "s3Key": "k", "s3_refrance": false }))]
    #[case::flag_zero(json!({ "s3BucketName": "b", "s3Key": "k", "s3_refrance": 0 }))]
    #[case::flag_empty_string(json!({ "s3BucketName": "b", "s3Key": "k", "s3_refrance": "" }))]
    #[case::flag_null(json!({ "s3BucketName": "b", "s3Key": "k", "s3_refrance": null }))]
    #[case::null(Value::Null)]
    fn ordinary_payloads_are_not_references(#[case] payload: Value) {
        assert!(!ReferenceCodec::detect(&payload));
    }

    #[rstest]
    #[case::flag_one(json!(1))]
    #[case::flag_string(json!("yes"))]
    #[case::flag_true(json!(true))]
    fn truthy_flags_mark_references(#[case] flag: Value) {
        let payload = json!({ "s3BucketName": "b", "s3Key": "k", "s3_refrance": flag });
        assert!(ReferenceCodec::detect(&payload));
        let record = ReferenceCodec::decode(&payload).unwrap();
        assert_eq!(record, ReferenceRecord::new("b", ObjectKey::new("k")));
    }

    #[rstest]
    #[case::missing_key(json!({ "s3BucketName": "b", "s3_refrance": true }))]
    #[case::missing_container(json!({ "s3Key": "k", "s3_refrance": true }))]
    #[case::key_not_string(json!({ "s3BucketName": "b", "s3Key": 7, "s3_refrance": true }))]
    fn flagged_payload_without_fields_is_malformed(#[case] payload: Value) {
        assert!(ReferenceCodec::detect(&payload));
        let err = ReferenceCodec::decode(&payload).unwrap_err();
        assert!(matches!(err, OffloadError::MalformedReference(_)));
    }
}
