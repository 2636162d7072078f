//! Codec - wire 形式のエンコード/デコード
//!
//! - **ReferenceCodec**: 参照レコード（3 フィールド固定の JSON object）
//! - **BodyCodec**: envelope の `body` フィールド（base64 された JSON 配列、要素 0 が payload）

pub mod body;
pub mod reference;

pub use self::body::{BodyCodec, TaskBody};
pub use self::reference::ReferenceCodec;
