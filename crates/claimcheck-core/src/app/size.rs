//! SizeAccountant - メッセージサイズの計算と offload 判定
//!
//! サイズはすべて UTF-8 のバイト長で数える。attribute の反復順序には依存しない。

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};

use crate::domain::{AttributeValue, Attributes, OffloadError};

pub struct SizeAccountant;

impl SizeAccountant {
    /// Byte size of `body` plus all attributes.
    pub fn compute_size(body: &str, attributes: &Attributes) -> usize {
        body.len() + Self::attributes_size(attributes)
    }

    /// Byte size of the attributes alone: name + data type + value for each entry.
    pub fn attributes_size(attributes: &Attributes) -> usize {
        attributes
            .iter()
            .map(|(name, value)| name.len() + Self::attribute_value_size(value))
            .sum()
    }

    fn attribute_value_size(value: &AttributeValue) -> usize {
        let mut size = value.data_type.len();
        if let Some(s) = &value.string_value {
            size += s.len();
        }
        if let Some(b) = &value.binary_value {
            size += binary_value_size(b);
        }
        size
    }

    /// Reject attribute sets that can never be sent, before any network call.
    ///
    /// 判定順: 合計サイズ → 個数 → 予約名。attribute は Blob ストアへ移せないので、
    /// サイズは body とは独立に閾値と比べる。
    pub fn validate(
        attributes: &Attributes,
        threshold_bytes: usize,
        max_attributes: usize,
        reserved_name: &str,
    ) -> Result<(), OffloadError> {
        let size = Self::attributes_size(attributes);
        if size > threshold_bytes {
            return Err(OffloadError::AttributeSizeExceeded {
                size,
                threshold: threshold_bytes,
            });
        }

        if attributes.len() > max_attributes {
            return Err(OffloadError::AttributeCountExceeded {
                count: attributes.len(),
                max: max_attributes,
            });
        }

        if attributes.contains_key(reserved_name) {
            return Err(OffloadError::ReservedAttributeUsed(reserved_name.to_string()));
        }

        Ok(())
    }

    pub fn should_offload(
        body_size: usize,
        attr_size: usize,
        threshold_bytes: usize,
        always_offload: bool,
    ) -> bool {
        always_offload || body_size + attr_size > threshold_bytes
    }
}

/// Binary values that round-trip as base64 count their encoded length; anything
/// else counts its raw string length. Both are byte lengths of the text as sent.
fn binary_value_size(value: &str) -> usize {
    if is_base64(value) {
        value.as_bytes().len()
    } else {
        value.len()
    }
}

fn is_base64(value: &str) -> bool {
    BASE64
        .decode(value)
        .ok()
        .and_then(|raw| String::from_utf8(raw).ok())
        .is_some_and(|decoded| BASE64.encode(decoded) == value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn attrs(entries: &[(&str, AttributeValue)]) -> Attributes {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    fn numbered(n: usize) -> Attributes {
        (0..n)
            .map(|i| (format!("attr-{i}"), AttributeValue::string("String", "v")))
            .collect()
    }

    #[test]
    fn counts_utf8_bytes_not_chars() {
        // "é" は 2 bytes
        assert_eq!(SizeAccountant::compute_size("é", &Attributes::new()), 2);
    }

    #[test]
    fn sums_name_type_and_values() {
        let a = attrs(&[
            ("name", AttributeValue::string("String", "abc")),
            ("blob", AttributeValue::binary("Binary", "aGVsbG8=")),
        ]);
        // 4 + 6 + 3  +  4 + 6 + 8
        assert_eq!(SizeAccountant::attributes_size(&a), 31);
        assert_eq!(SizeAccountant::compute_size("body", &a), 35);
    }

    #[test]
    fn non_base64_binary_counts_raw_length() {
        let a = attrs(&[("b", AttributeValue::binary("Binary", "not base64!"))]);
        assert_eq!(SizeAccountant::attributes_size(&a), 1 + 6 + 11);
    }

    #[test]
    fn size_is_independent_of_insertion_order() {
        let entries = [
            ("a", AttributeValue::string("String", "1")),
            ("bb", AttributeValue::string("Number", "22")),
            ("ccc", AttributeValue::binary("Binary", "AAEC")),
        ];
        let forward = attrs(&entries);
        let mut reversed_entries = entries.clone();
        reversed_entries.reverse();
        let reversed = attrs(&reversed_entries);

        assert_eq!(
            SizeAccountant::compute_size("x", &forward),
            SizeAccountant::compute_size("x", &reversed)
        );
    }

    #[rstest]
    #[case::at_max(9, true)]
    #[case::over_max(10, false)]
    #[case::empty(0, true)]
    fn attribute_count_boundary(#[case] count: usize, #[case] ok: bool) {
        let result = SizeAccountant::validate(&numbered(count), 262_144, 9, "SQSLargePayloadSize");
        assert_eq!(result.is_ok(), ok);
        if !ok {
            assert!(matches!(
                result,
                Err(OffloadError::AttributeCountExceeded { count: 10, max: 9 })
            ));
        }
    }

    #[test]
    fn reserved_name_is_rejected_regardless_of_size() {
        let a = attrs(&[("SQSLargePayloadSize", AttributeValue::string("Number", "1"))]);
        let err = SizeAccountant::validate(&a, 262_144, 9, "SQSLargePayloadSize").unwrap_err();
        assert!(matches!(err, OffloadError::ReservedAttributeUsed(_)));
    }

    #[test]
    fn reserved_name_is_case_sensitive() {
        let a = attrs(&[("sqslargepayloadsize", AttributeValue::string("Number", "1"))]);
        assert!(SizeAccountant::validate(&a, 262_144, 9, "SQSLargePayloadSize").is_ok());
    }

    #[test]
    fn oversized_attributes_fail_independently_of_body() {
        let a = attrs(&[("big", AttributeValue::string("String", "x".repeat(100)))]);
        let err = SizeAccountant::validate(&a, 50, 9, "SQSLargePayloadSize").unwrap_err();
        assert!(matches!(
            err,
            OffloadError::AttributeSizeExceeded { size: 109, threshold: 50 }
        ));
    }

    #[rstest]
    #[case::below(100, 0, 262_144, false, false)]
    #[case::exactly_at(262_144, 0, 262_144, false, false)]
    #[case::one_over(262_144, 1, 262_144, false, true)]
    #[case::always(2, 0, 262_144, true, true)]
    fn offload_decision(
        #[case] body: usize,
        #[case] attrs: usize,
        #[case] threshold: usize,
        #[case] always: bool,
        #[case] expected: bool,
    ) {
        assert_eq!(
            SizeAccountant::should_offload(body, attrs, threshold, always),
            expected
        );
    }
}
