//! ReferenceRecord - offload された payload への参照

use super::ObjectKey;

/// Pointer to an offloaded payload: `(container, key)`.
///
/// 参照レコードは常に payload 全体の置き換えとしてのみ使われ、
/// 他の payload フィールドとマージされることはない。wire 形式は
/// `codec::ReferenceCodec` が扱う。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceRecord {
    pub container: String,
    pub key: ObjectKey,
}

impl ReferenceRecord {
    pub fn new(container: impl Into<String>, key: ObjectKey) -> Self {
        Self {
            container: container.into(),
            key,
        }
    }
}
