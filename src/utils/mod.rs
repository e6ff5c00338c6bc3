//! ユーティリティモジュール
//! 
//! 展示全体で使用される数学・時間・ID・ロギングのユーティリティが含まれています。

pub mod id_generator;
pub mod logger;
pub mod math;
pub mod time;

// サブモジュールの再エクスポート
pub use id_generator::*;
pub use logger::*;
pub use math::*;
pub use time::*;
