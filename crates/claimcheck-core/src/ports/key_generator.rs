//! KeyGenerator port - object key 生成の抽象化
//!
//! テストで決定的な key を使えるように trait にしている。

use uuid::Uuid;

use crate::domain::ObjectKey;

/// KeyGenerator は呼び出しごとに新しい一意な key を返す
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数スレッドから使える）
pub trait KeyGenerator: Send + Sync {
    fn generate_key(&self) -> ObjectKey;
}

/// UUID v4 ベースの key 生成器（本番用）
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidKeyGenerator;

impl KeyGenerator for UuidKeyGenerator {
    fn generate_key(&self) -> ObjectKey {
        ObjectKey::from_uuid(Uuid::new_v4())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_generator_generates_unique_keys() {
        let key_gen = UuidKeyGenerator;

        let k1 = key_gen.generate_key();
        let k2 = key_gen.generate_key();
        let k3 = key_gen.generate_key();

        assert_ne!(k1, k2);
        assert_ne!(k2, k3);
        assert_ne!(k1, k3);
        assert!(Uuid::parse_str(k1.as_str()).is_ok());
    }
}
