//! Offload configuration.
//!
//! 設定は各コンポーネントのコンストラクタに明示的に渡す。
//! 環境変数やグローバル状態からは読まない。

use serde::{Deserialize, Serialize};

/// Default size threshold (256 KiB).
pub const DEFAULT_MESSAGE_SIZE_THRESHOLD: usize = 262_144;

/// 10 attributes allowed by the transport, 1 reserved for the offload marker.
pub const MAX_ALLOWED_ATTRIBUTES: usize = 10 - 1;

/// Attribute name reserved for the offload layer (case-sensitive).
pub const RESERVED_ATTRIBUTE_NAME: &str = "SQSLargePayloadSize";

/// Default lifetime of an offloaded blob, counted from PayloadStore construction.
pub const DEFAULT_BLOB_TTL_DAYS: i64 = 14;

/// OffloadConfig は OffloadGate の読み取り専用設定
///
/// TOML などから読み込めるよう `Deserialize` を実装し、欠けた項目はデフォルト値で埋める。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffloadConfig {
    /// Messages whose body + attribute size exceeds this are offloaded.
    pub threshold_bytes: usize,

    /// Offload every message regardless of size.
    pub always_offload: bool,

    pub max_attributes: usize,

    pub reserved_attribute_name: String,

    /// Blob-store container (bucket). May be empty until an offload actually happens.
    pub container: String,

    pub blob_ttl_days: i64,
}

impl OffloadConfig {
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            ..Self::default()
        }
    }
}

impl Default for OffloadConfig {
    fn default() -> Self {
        Self {
            threshold_bytes: DEFAULT_MESSAGE_SIZE_THRESHOLD,
            always_offload: false,
            max_attributes: MAX_ALLOWED_ATTRIBUTES,
            reserved_attribute_name: RESERVED_ATTRIBUTE_NAME.to_string(),
            container: String::new(),
            blob_ttl_days: DEFAULT_BLOB_TTL_DAYS,
        }
    }
}
