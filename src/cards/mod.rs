//! カードモジュール
//! 
//! カードエンティティとその正となる一覧（ストア）を提供します。

pub mod card;
pub mod store;

pub use card::{Card, CardId, CardPayload, CardState, CardView, FixSource};
pub use store::CardStore;
