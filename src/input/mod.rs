//! 入力処理モジュール
//! 
//! ポインタ操作（ドラッグとクリックの判別）とホバー判定を担当します。
//! JS側はポインタムーブを常にドキュメント全体で購読し、ポインタアップは
//! ドラッグセッション中だけ購読します。

use serde::{Deserialize, Serialize};

use crate::cards::CardId;

pub mod controller;
pub mod hover;

pub use controller::{DragOutcome, DragSession, InteractionController};
pub use hover::{hover_at, HoverDetails};

/// ポインタイベント
/// 
/// 座標はコンテナ左上基準のピクセルです。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    Down { card: CardId, x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up,
}
