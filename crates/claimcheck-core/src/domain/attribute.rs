//! Message attributes (name -> typed value).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Attribute set attached to a message. Names are unique by construction.
pub type Attributes = HashMap<String, AttributeValue>;

/// A single message attribute.
///
/// `string_value` と `binary_value` はどちらか一方だけが意味を持つ。
/// `binary_value` は base64 文字列のこともあれば、そうでないこともある
/// （サイズ計算で区別する。`app::size` を参照）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeValue {
    pub data_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary_value: Option<String>,
}

impl AttributeValue {
    pub fn string(data_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
            string_value: Some(value.into()),
            binary_value: None,
        }
    }

    pub fn binary(data_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
            string_value: None,
            binary_value: Some(value.into()),
        }
    }
}
