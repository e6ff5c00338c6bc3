//! レイアウトモジュール
//! 
//! 物体検出によるカードの自動配置と、定規の目盛り計算を提供します。

pub mod placement;
pub mod ruler;

pub use placement::{PlacementHeuristic, PlacementOutcome, Slot};
pub use ruler::{ruler_ticks, RulerTick};
