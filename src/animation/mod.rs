//! アニメーションモジュール
//! 
//! ページ表示時のイントロ演出（グリッド → ヘッダー → カード）の進行を管理します。

pub mod sequence;

pub use sequence::{IntroPhase, IntroSequence};
