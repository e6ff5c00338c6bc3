//! ID生成ユーティリティモジュール
//! 
//! カードIDと展示インスタンスIDの生成を担当します。

use std::sync::atomic::{AtomicU32, Ordering};

use uuid::Uuid;

/// シンプルな連番ID生成器
/// 
/// 展示ごとに1つ持ち、カードIDは1から順に払い出されます。
#[derive(Debug)]
pub struct IdGenerator {
    /// 次に生成するID値
    next_id: AtomicU32,
}

impl IdGenerator {
    /// 新しいID生成器を作成
    pub fn new() -> Self {
        Self {
            next_id: AtomicU32::new(1),
        }
    }

    /// 新しいIDを作成
    pub fn next_id(&self) -> u32 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// 展示インスタンスIDを生成（ログの識別用）
pub fn generate_instance_id() -> String {
    format!("exhibit_{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sequential() {
        let generator = IdGenerator::new();
        assert_eq!(generator.next_id(), 1);
        assert_eq!(generator.next_id(), 2);
        assert_eq!(generator.next_id(), 3);
    }

    #[test]
    fn test_instance_ids_are_unique() {
        let a = generate_instance_id();
        let b = generate_instance_id();
        assert!(a.starts_with("exhibit_"));
        assert_ne!(a, b);
    }
}
